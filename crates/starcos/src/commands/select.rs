//! SELECT FILE command
//!
//! STARCOS SPK 2.3 does not always return an FCI for DFs: a SELECT
//! that requests one may answer with 6284 ("FCI not available"), which
//! the navigator uses to tell DFs from EFs.

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};
use crate::types::{Aid, FileId};

apdu_pair! {
    /// SELECT FILE command for STARCOS SPK 2.3
    pub struct SelectFile {
        command {
            cla: cla::ISO,
            ins: ins::SELECT,

            builders {
                /// Select by 2-byte file identifier, requesting the FCI.
                pub fn file_id(id: FileId) -> Self {
                    Self::new(0x00, 0x00).with_data(id.to_be_bytes().to_vec()).with_le(0)
                }

                /// Select by 2-byte file identifier without requesting an FCI.
                pub fn file_id_discard_fci(id: FileId) -> Self {
                    Self::new(0x00, 0x0C).with_data(id.to_be_bytes().to_vec())
                }

                /// Select a DF by its 1-16 byte application identifier.
                pub fn application(aid: &Aid) -> Self {
                    Self::new(0x04, 0x0C).with_data(aid.as_ref().to_vec())
                }

                /// Select the MF without requesting an FCI.
                pub fn master_file() -> Self {
                    Self::file_id_discard_fci(FileId::MF)
                }
            }
        }

        response {
            ok {
                /// File selected; `fci` is empty when none was requested.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "fci")]
                Selected {
                    fci: Vec<u8>,
                },

                /// Selection succeeded but the card has no FCI to
                /// return (a DF on this card).
                #[sw(SW_FCI_NOT_AVAILABLE)]
                NoFci,
            }

            errors {
                /// File or application not found
                #[sw(0x6A, 0x82)]
                #[error("file or application not found")]
                NotFound,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<SelectFileOk, SelectFileError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) | (0x61, _) => Ok(SelectFileOk::Selected {
                        fci: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x62, 0x84) => Ok(SelectFileOk::NoFci),
                    (0x6A, 0x82) => Err(SelectFileError::NotFound),
                    (sw1, sw2) => Err(SelectFileError::Unknown { sw1, sw2 }),
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
    fn select_by_file_id_requests_fci() {
        let cmd = SelectFileCommand::file_id(FileId::new(0xDF01));
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00A4000002DF0100"));
    }

    #[test]
    fn select_by_file_id_discarding_fci_is_case_3() {
        let cmd = SelectFileCommand::file_id_discard_fci(FileId::new(0x3F00));
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00A4000C023F00"));
    }

    #[test]
    fn select_by_application_id() {
        let aid = Aid::try_from(hex!("D27600000101").as_ref()).unwrap();
        let cmd = SelectFileCommand::application(&aid);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00A4040C06D27600000101"));
    }

    #[test]
    fn no_fci_status_is_a_success_variant() {
        let result =
            SelectFileCommand::parse_response_raw(Bytes::from_static(&hex!("6284"))).unwrap();
        assert!(matches!(result, SelectFileOk::NoFci));
    }

    #[test]
    fn fci_payload_is_captured() {
        let result = SelectFileCommand::parse_response_raw(Bytes::from_static(&hex!(
            "6F07800200808201019000"
        )))
        .unwrap();
        match result {
            SelectFileOk::Selected { fci } => assert_eq!(fci, hex!("6F0780020080820101").to_vec()),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn unknown_status_is_surfaced() {
        let err =
            SelectFileCommand::parse_response_raw(Bytes::from_static(&hex!("63C2"))).unwrap_err();
        assert!(matches!(err, SelectFileError::Unknown { sw1: 0x63, sw2: 0xC2 }));
    }
}
