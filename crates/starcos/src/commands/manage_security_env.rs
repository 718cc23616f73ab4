//! MANAGE SECURITY ENVIRONMENT.
//!
//! The same instruction configures three different operations on this
//! card: deciphering (P1P2 = 81B8), signing with COMPUTE SIGNATURE
//! (41B6) and signing with INTERNAL AUTHENTICATE (41A4).

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// MANAGE SECURITY ENVIRONMENT command for STARCOS SPK 2.3
    pub struct ManageSecurityEnv {
        command {
            cla: cla::ISO,
            ins: ins::MANAGE_SECURITY_ENV,

            builders {
                /// Configure a decipher operation.
                pub fn set_decipher(data: impl Into<Bytes>) -> Self {
                    Self::new(0x81, 0xB8).with_data(data.into())
                }

                /// Configure a COMPUTE SIGNATURE operation. This may
                /// legally fail; the negotiator probes it first.
                pub fn set_sign(data: impl Into<Bytes>) -> Self {
                    Self::new(0x41, 0xB6).with_data(data.into())
                }

                /// Configure an INTERNAL AUTHENTICATE operation.
                pub fn set_authenticate(data: impl Into<Bytes>) -> Self {
                    Self::new(0x41, 0xA4).with_data(data.into())
                }
            }
        }

        response {
            ok {
                /// Environment accepted.
                #[sw(SW_NO_ERROR)]
                Set,
            }

            errors {
                /// Error setting the security env
                #[sw(SW_SEC_ENV_ERROR)]
                #[error("error setting the security environment")]
                EnvironmentError,

                /// Security environment invalid
                #[sw(SW_SEC_ENV_INVALID)]
                #[error("security environment invalid")]
                EnvironmentInvalid,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<ManageSecurityEnvOk, ManageSecurityEnvError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(ManageSecurityEnvOk::Set),
                    (0x66, 0x00) => Err(ManageSecurityEnvError::EnvironmentError),
                    (0x6F, 0x05) => Err(ManageSecurityEnvError::EnvironmentInvalid),
                    (sw1, sw2) => Err(ManageSecurityEnvError::Unknown { sw1, sw2 }),
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
    fn sign_probe_targets_the_dst() {
        let cmd = ManageSecurityEnvCommand::set_sign(hex!("800112").to_vec());
        assert_eq!(cmd.to_bytes().as_ref(), hex!("002241B603800112"));
    }

    #[test]
    fn authenticate_targets_the_at() {
        let cmd = ManageSecurityEnvCommand::set_authenticate(hex!("800101").to_vec());
        assert_eq!(cmd.to_bytes().as_ref(), hex!("002241A403800101"));
    }

    #[test]
    fn decipher_targets_the_ct() {
        let cmd = ManageSecurityEnvCommand::set_decipher(hex!("800102").to_vec());
        assert_eq!(cmd.to_bytes().as_ref(), hex!("002281B803800102"));
    }
}
