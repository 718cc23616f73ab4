//! WRITE KEY, the key-installation protocol of the Internal Secret
//! File.
//!
//! Key installation writes a `C1`-tagged 12-byte key header, then
//! streams the key material in `C2`-tagged segments of at most 124
//! bytes, each carrying the key id and a 16-bit offset.

use bytes::{BufMut, BytesMut};
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*, tags};
use crate::types::KeyHeader;

apdu_pair! {
    /// WRITE KEY command for STARCOS SPK 2.3
    pub struct WriteKey {
        command {
            cla: cla::STARCOS,
            ins: ins::WRITE_KEY,

            builders {
                /// Install a key header in the ISF (mode 0).
                pub fn install_header(header: &KeyHeader) -> Self {
                    let mut data = BytesMut::with_capacity(2 + header.0.len());
                    data.put_u8(tags::KEY_HEADER);
                    data.put_u8(header.0.len() as u8);
                    data.put_slice(&header.0);
                    Self::new(0x00, 0x00).with_data(data.freeze())
                }

                /// Write one segment of key material at `offset`.
                pub fn segment(mode: u8, key_id: u8, offset: u16, chunk: &[u8]) -> Self {
                    let mut data = BytesMut::with_capacity(5 + chunk.len());
                    data.put_u8(tags::KEY_SEGMENT);
                    data.put_u8(3 + chunk.len() as u8);
                    data.put_u8(key_id);
                    data.put_u16(offset);
                    data.put_slice(chunk);
                    Self::new(mode, 0x00).with_data(data.freeze())
                }
            }
        }

        response {
            ok {
                /// Header or segment accepted.
                #[sw(SW_NO_ERROR)]
                Written,
            }

            errors {
                /// Key part not found
                #[sw(SW_KEY_PART_NOT_FOUND)]
                #[error("key part not found")]
                KeyPartNotFound,

                /// Key format does not match key length
                #[sw(0x6F, 0x0A)]
                #[error("key format does not match key length")]
                KeyFormatMismatch,

                /// Length of key component inconsistent with algorithm
                #[sw(0x6F, 0x0B)]
                #[error("length of key component inconsistent with algorithm")]
                KeyComponentLength,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<WriteKeyOk, WriteKeyError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(WriteKeyOk::Written),
                    (0x6F, 0x07) => Err(WriteKeyError::KeyPartNotFound),
                    (0x6F, 0x0A) => Err(WriteKeyError::KeyFormatMismatch),
                    (0x6F, 0x0B) => Err(WriteKeyError::KeyComponentLength),
                    (sw1, sw2) => Err(WriteKeyError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use nexum_apdu_core::ApduCommand;

    #[test]
    fn install_header_wraps_in_c1_tlv() {
        let header = KeyHeader(hex!("0102030405060708090A0B0C"));
        let cmd = WriteKeyCommand::install_header(&header);
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("80F400000E C10C 0102030405060708090A0B0C")
        );
    }

    #[test]
    fn segment_carries_key_id_and_offset() {
        let cmd = WriteKeyCommand::segment(0x00, 0x85, 0x007C, &hex!("AABBCC"));
        assert_eq!(cmd.to_bytes().as_ref(), hex!("80F4000008 C206 85 007C AABBCC"));
    }
}
