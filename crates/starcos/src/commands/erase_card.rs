//! ERASE FILES, used to restore the delivery state of test cards.

use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// ERASE FILES command for STARCOS SPK 2.3
    pub struct EraseCard {
        command {
            cla: cla::STARCOS,
            ins: ins::ERASE_FILES,

            builders {
                /// Delete the MF and everything below it.
                pub fn master_file() -> Self {
                    Self::new(0x00, 0x00).with_data(vec![0x3F, 0x00])
                }
            }
        }

        response {
            ok {
                /// Card erased.
                #[sw(SW_NO_ERROR)]
                Erased,

                /// There is no MF to delete; the card is already in
                /// its delivery state.
                #[sw(SW_CONDITIONS_NOT_SATISFIED)]
                NothingToErase,
            }

            errors {
                /// Command not allowed
                #[sw(SW_COMMAND_NOT_ALLOWED)]
                #[error("command not allowed")]
                NotAllowed,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<EraseCardOk, EraseCardError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(EraseCardOk::Erased),
                    (0x69, 0x85) => Ok(EraseCardOk::NothingToErase),
                    (0x69, 0xF0) => Err(EraseCardError::NotAllowed),
                    (sw1, sw2) => Err(EraseCardError::Unknown { sw1, sw2 }),
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
    fn erase_targets_the_master_file() {
        let cmd = EraseCardCommand::master_file();
        assert_eq!(cmd.to_bytes().as_ref(), hex!("80E40000023F00"));
    }

    #[test]
    fn missing_master_file_counts_as_erased() {
        let result =
            EraseCardCommand::parse_response_raw(bytes::Bytes::from_static(&hex!("6985"))).unwrap();
        assert!(matches!(result, EraseCardOk::NothingToErase));
    }
}
