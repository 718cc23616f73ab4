//! On-card key-pair generation and public-key retrieval.

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// GENERATE KEY PAIR command for STARCOS SPK 2.3
    pub struct GenerateKeyPair {
        command {
            cla: cla::ISO,
            ins: ins::GENERATE_KEY,

            builders {
                /// Generate an RSA key pair of `modulus_bits` for the
                /// ISF entry `key_id`.
                pub fn with_modulus_bits(key_id: u8, modulus_bits: u16) -> Self {
                    Self::new(0x00, key_id).with_data(modulus_bits.to_be_bytes().to_vec())
                }
            }
        }

        response {
            ok {
                /// Key pair generated.
                #[sw(SW_NO_ERROR)]
                Generated,
            }

            errors {
                /// Command not allowed
                #[sw(SW_COMMAND_NOT_ALLOWED)]
                #[error("command not allowed")]
                NotAllowed,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<GenerateKeyPairOk, GenerateKeyPairError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(GenerateKeyPairOk::Generated),
                    (0x69, 0xF0) => Err(GenerateKeyPairError::NotAllowed),
                    (sw1, sw2) => Err(GenerateKeyPairError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}

apdu_pair! {
    /// READ PUBLIC KEY command for STARCOS SPK 2.3
    pub struct ReadPublicKey {
        command {
            cla: cla::STARCOS,
            ins: ins::READ_PUBLIC_KEY,

            builders {
                /// Read the public part of the key stored under
                /// `key_id`.
                pub fn for_key(key_id: u8) -> Self {
                    Self::new(0x9C, 0x00).with_data(vec![key_id]).with_le(0)
                }
            }
        }

        response {
            ok {
                /// Raw public-key record; the modulus sits at a fixed
                /// offset in little-endian byte order.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "data")]
                KeyData {
                    data: Vec<u8>,
                },
            }

            errors {
                /// Public key not complete
                #[sw(SW_PUBLIC_KEY_INCOMPLETE)]
                #[error("public key not complete")]
                PublicKeyIncomplete,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<ReadPublicKeyOk, ReadPublicKeyError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(ReadPublicKeyOk::KeyData {
                        data: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x6F, 0x01) => Err(ReadPublicKeyError::PublicKeyIncomplete),
                    (sw1, sw2) => Err(ReadPublicKeyError::Unknown { sw1, sw2 }),
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
    fn generation_sends_the_bit_length() {
        let cmd = GenerateKeyPairCommand::with_modulus_bits(0x85, 1024);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("004600 85 02 0400"));
    }

    #[test]
    fn read_public_key_is_case_4() {
        let cmd = ReadPublicKeyCommand::for_key(0x85);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("80F09C00 01 85 00"));
    }
}
