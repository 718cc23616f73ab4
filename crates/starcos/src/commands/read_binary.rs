//! READ BINARY, used as a one-byte probe.
//!
//! After a SELECT that returned data, the navigator reads a single
//! byte: 6986 ("no current EF") means the selected object is a DF.

use bytes::Bytes;
use nexum_apdu_core::prelude::*;
use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, status::*};

apdu_pair! {
    /// READ BINARY command for STARCOS SPK 2.3
    pub struct ReadBinary {
        command {
            cla: cla::ISO,
            ins: ins::READ_BINARY,

            builders {
                /// One-byte read at offset zero, to tell EFs from DFs.
                pub fn probe() -> Self {
                    Self::new(0x00, 0x00).with_le(1)
                }
            }
        }

        response {
            ok {
                /// Data read from the current EF.
                #[sw(SW_NO_ERROR)]
                #[payload(field = "data")]
                Data {
                    data: Vec<u8>,
                },
            }

            errors {
                /// No current EF is selected (the object is a DF).
                #[sw(SW_NO_CURRENT_EF)]
                #[error("no current EF selected")]
                NoCurrentEf,
            }

            custom_parse = |response: &nexum_apdu_core::Response| -> Result<ReadBinaryOk, ReadBinaryError> {
                let status = response.status();
                match (status.sw1, status.sw2) {
                    (0x90, 0x00) | (0x61, _) => Ok(ReadBinaryOk::Data {
                        data: response.payload().as_ref().unwrap_or(&Bytes::new()).to_vec(),
                    }),
                    (0x69, 0x86) => Err(ReadBinaryError::NoCurrentEf),
                    (sw1, sw2) => Err(ReadBinaryError::Unknown { sw1, sw2 }),
                }
            }
        }
    }
}
