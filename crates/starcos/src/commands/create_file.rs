//! The proprietary file-creation protocol.
//!
//! MF, DF and EF creation all go through vendor-class CREATE FILE
//! (`E0`) with fixed-layout headers; DFs additionally require a
//! REGISTER DF (`52`) beforehand, and MF/DF creation must be finished
//! with CREATE END to activate the access conditions.

use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};
use crate::types::{DfData, EfData, FileId, MfData};

apdu_pair! {
    /// CREATE FILE command for STARCOS SPK 2.3
    pub struct CreateFile {
        command {
            cla: cla::STARCOS,
            ins: ins::CREATE_FILE,

            builders {
                /// Create the MF from its 19-byte header.
                pub fn master_file(data: &MfData) -> Self {
                    Self::new(0x00, 0x00).with_data(data.header.to_vec())
                }

                /// Create a DF from its 25-byte header. REGISTER DF
                /// must have been issued first.
                pub fn dedicated_file(data: &DfData) -> Self {
                    Self::new(0x01, 0x00).with_data(data.header.to_vec())
                }

                /// Create an EF from its 16-byte header.
                pub fn elementary_file(data: &EfData) -> Self {
                    Self::new(0x03, 0x00).with_data(data.header.to_vec())
                }

                /// Finish MF/DF creation and activate the access
                /// conditions.
                pub fn end(id: FileId) -> Self {
                    Self::new(0x02, 0x00).with_data(id.to_be_bytes().to_vec())
                }
            }
        }

        response {
            ok {
                /// File created.
                #[sw(SW_NO_ERROR)]
                Created,
            }

            errors {
                /// File exists
                #[sw(SW_FILE_EXISTS)]
                #[error("file exists")]
                FileExists,

                /// Application exists
                #[sw(SW_APPLICATION_EXISTS)]
                #[error("application exists")]
                ApplicationExists,

                /// Command not allowed
                #[sw(SW_COMMAND_NOT_ALLOWED)]
                #[error("command not allowed")]
                NotAllowed,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<CreateFileOk, CreateFileError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(CreateFileOk::Created),
                    (0x6A, 0x89) => Err(CreateFileError::FileExists),
                    (0x6A, 0x8A) => Err(CreateFileError::ApplicationExists),
                    (0x69, 0xF0) => Err(CreateFileError::NotAllowed),
                    (sw1, sw2) => Err(CreateFileError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}

apdu_pair! {
    /// REGISTER DF command for STARCOS SPK 2.3
    pub struct RegisterDf {
        command {
            cla: cla::STARCOS,
            ins: ins::REGISTER_DF,

            builders {
                /// Register a DF of `size` bytes; `prefix` is the
                /// leading `3 + aid_len` bytes of the DF header.
                pub fn with_size(size: u16, prefix: &[u8]) -> Self {
                    let [hi, lo] = size.to_be_bytes();
                    Self::new(hi, lo).with_data(prefix.to_vec())
                }
            }
        }

        response {
            ok {
                /// DF registered.
                #[sw(SW_NO_ERROR)]
                Registered,
            }

            errors {
                /// Application exists
                #[sw(SW_APPLICATION_EXISTS)]
                #[error("application exists")]
                ApplicationExists,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<RegisterDfOk, RegisterDfError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(RegisterDfOk::Registered),
                    (0x6A, 0x8A) => Err(RegisterDfError::ApplicationExists),
                    (sw1, sw2) => Err(RegisterDfError::Unknown { sw1, sw2 }),
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
    fn create_end_carries_the_file_id() {
        let cmd = CreateFileCommand::end(FileId::new(0xDF01));
        assert_eq!(cmd.to_bytes().as_ref(), hex!("80E0020002DF01"));
    }

    #[test]
    fn register_df_encodes_size_in_p1_p2() {
        let prefix = hex!("DF0102DF01");
        let cmd = RegisterDfCommand::with_size(0x0400, &prefix);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("8052040005DF0102DF01"));
    }

    #[test]
    fn create_ef_uses_p1_03() {
        let data = EfData {
            header: hex!("2F00 9F9F9F 9F9F9F9F 0000 00 00 810080"),
        };
        let cmd = CreateFileCommand::elementary_file(&data);
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("80E00300 10 2F009F9F9F9F9F9F9F0000000081 0080")
        );
    }

    #[test]
    fn existing_file_is_reported() {
        let err = CreateFileCommand::parse_response_raw(bytes::Bytes::from_static(&hex!("6A89")))
            .unwrap_err();
        assert!(matches!(err, CreateFileError::FileExists));
    }
}
