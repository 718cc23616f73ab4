//! The two on-card signature operations.
//!
//! COMPUTE SIGNATURE is a pair of PERFORM SECURITY OPERATION commands
//! (set hash, then compute); INTERNAL AUTHENTICATE is a single case-4
//! exchange over a pre-encoded DigestInfo block.

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// PSO: HASH for STARCOS SPK 2.3
    pub struct PutHash {
        command {
            cla: cla::ISO,
            ins: ins::PERFORM_SECURITY_OP,

            builders {
                /// Load the digest to be signed into the card.
                pub fn with_digest(digest: impl Into<Bytes>) -> Self {
                    Self::new(0x90, 0x81).with_data(digest.into())
                }
            }
        }

        response {
            ok {
                /// Digest accepted.
                #[sw(SW_NO_ERROR)]
                Accepted,
            }

            errors {
                /// No space left for padding
                #[sw(SW_PADDING_OVERFLOW)]
                #[error("no space left for padding")]
                PaddingOverflow,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<PutHashOk, PutHashError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(PutHashOk::Accepted),
                    (0x66, 0xF0) => Err(PutHashError::PaddingOverflow),
                    (sw1, sw2) => Err(PutHashError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}

apdu_pair! {
    /// PSO: COMPUTE DIGITAL SIGNATURE for STARCOS SPK 2.3
    pub struct ComputeSignature {
        command {
            cla: cla::ISO,
            ins: ins::PERFORM_SECURITY_OP,

            builders {
                /// Sign the previously loaded digest.
                pub fn over_loaded_digest() -> Self {
                    Self::new(0x9E, 0x9A).with_le(0)
                }
            }
        }

        response {
            ok {
                /// The computed signature.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "signature")]
                Signature {
                    signature: Vec<u8>,
                },
            }

            errors {
                /// Signature failed
                #[sw(SW_SIGNATURE_FAILED)]
                #[error("signature failed")]
                SignatureFailed,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<ComputeSignatureOk, ComputeSignatureError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(ComputeSignatureOk::Signature {
                        signature: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x6F, 0x08) => Err(ComputeSignatureError::SignatureFailed),
                    (sw1, sw2) => Err(ComputeSignatureError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}

apdu_pair! {
    /// INTERNAL AUTHENTICATE for STARCOS SPK 2.3
    pub struct InternalAuthenticate {
        command {
            cla: cla::ISO,
            ins: ins::INTERNAL_AUTHENTICATE,

            builders {
                /// Sign a pre-encoded block (DigestInfo or raw data).
                pub fn with_block(block: impl Into<Bytes>) -> Self {
                    Self::new(0x10, 0x00).with_data(block.into()).with_le(0)
                }
            }
        }

        response {
            ok {
                /// The computed signature.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "signature")]
                Signature {
                    signature: Vec<u8>,
                },
            }

            errors {
                /// Signature failed
                #[sw(SW_SIGNATURE_FAILED)]
                #[error("signature failed")]
                SignatureFailed,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<InternalAuthenticateOk, InternalAuthenticateError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) => Ok(InternalAuthenticateOk::Signature {
                        signature: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x6F, 0x08) => Err(InternalAuthenticateError::SignatureFailed),
                    (sw1, sw2) => Err(InternalAuthenticateError::Unknown { sw1, sw2 }),
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
    fn put_hash_is_case_3() {
        let digest = hex!("A9993E364706816ABA3E25717850C26C9CD0D89D");
        let cmd = PutHashCommand::with_digest(digest.to_vec());
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("002A9081 14 A9993E364706816ABA3E25717850C26C9CD0D89D")
        );
    }

    #[test]
    fn compute_signature_expects_a_full_response() {
        let cmd = ComputeSignatureCommand::over_loaded_digest();
        assert_eq!(cmd.to_bytes().as_ref(), hex!("002A9E9A00"));
    }

    #[test]
    fn internal_authenticate_is_case_4() {
        let cmd = InternalAuthenticateCommand::with_block(hex!("0102").to_vec());
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00881000 02 0102 00"));
    }

    #[test]
    fn signature_bytes_are_returned_verbatim() {
        let mut response = hex!("DEADBEEF").to_vec();
        response.extend_from_slice(&hex!("9000"));
        let result =
            ComputeSignatureCommand::parse_response_raw(Bytes::copy_from_slice(&response)).unwrap();
        let ComputeSignatureOk::Signature { signature } = result;
        assert_eq!(signature, hex!("DEADBEEF").to_vec());
    }
}
