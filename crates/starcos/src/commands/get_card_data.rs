//! GET CARD DATA, which returns the card serial number.

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// GET CARD DATA command for STARCOS SPK 2.3
    pub struct GetCardData {
        command {
            cla: cla::STARCOS,
            ins: ins::GET_CARD_DATA,

            builders {
                /// Request the card serial number.
                pub fn serial_number() -> Self {
                    Self::new(0x00, 0x00).with_le(0)
                }
            }
        }

        response {
            ok {
                /// The card data bytes.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "data")]
                Data {
                    data: Vec<u8>,
                },
            }

            errors {
                /// System error
                #[sw(0x6F, 0x81)]
                #[error("system error")]
                SystemError,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<GetCardDataOk, GetCardDataError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(GetCardDataOk::Data {
                        data: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x6F, 0x81) => Err(GetCardDataError::SystemError),
                    (sw1, sw2) => Err(GetCardDataError::Unknown { sw1, sw2 }),
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
    fn serial_request_is_case_2() {
        let cmd = GetCardDataCommand::serial_number();
        assert_eq!(cmd.to_bytes().as_ref(), hex!("80F6000000"));
    }
}
