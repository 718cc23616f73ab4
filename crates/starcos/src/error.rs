//! Error types for STARCOS operations
//!
//! This module centralizes the driver's error variants and the
//! vendor status-word classifier. Commands declare the status words
//! the driver branches on; everything else funnels through
//! [`Error::from_status`], which knows the card's 14 proprietary
//! error codes and defers the rest to the generic layer.

use iso7816_tlv::TlvError;
use nexum_apdu_core::StatusWord;
use thiserror::Error;

use crate::commands::*;

/// Result type for STARCOS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for STARCOS operations
#[derive(Debug, Error)]
pub enum Error {
    /// Core error from nexum_apdu_core
    #[error(transparent)]
    Core(#[from] nexum_apdu_core::Error),

    /// TLV encoding/decoding error
    #[error("TLV error: {0}")]
    Tlv(TlvError),

    /// Malformed input caught before any APDU was sent
    #[error("invalid arguments: {0}")]
    InvalidArguments(&'static str),

    /// Malformed data received from the card
    #[error("invalid data: {0}")]
    InvalidData(&'static str),

    /// PIN verification failed; the card reported the remaining tries
    #[error("PIN verification failed ({retries} tries left)")]
    PinCodeIncorrect {
        /// Remaining verification attempts.
        retries: u8,
    },

    /// The card rejected a parameter of the command
    #[error("incorrect parameters: {0}")]
    IncorrectParameters(&'static str),

    /// The card does not allow the command in the current state
    #[error("not allowed: {0}")]
    NotAllowed(&'static str),

    /// A file or key component was not found
    #[error("file not found: {0}")]
    FileNotFound(&'static str),

    /// A file or application already exists
    #[error("file already exists: {0}")]
    FileAlreadyExists(&'static str),

    /// The card failed to execute the command
    #[error("card command failed: {0}")]
    CardCommandFailed(&'static str),

    /// A protocol invariant was violated
    #[error("internal driver error: {0}")]
    Internal(&'static str),

    /// Status word left to the generic layer's interpretation
    #[error("card returned error status: {0}")]
    CardStatus(StatusWord),

    /// Context with source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },

    /// Other error with dynamic message
    #[error("{0}")]
    Message(String),

    /// Other error with static message
    #[error("{0}")]
    Other(&'static str),
}

impl Error {
    /// Classify a status word the way the card documents it.
    ///
    /// PIN failures (63 Cx) carry their remaining-tries counter; the
    /// 14 vendor codes map onto driver error kinds; anything else is
    /// surfaced as a plain status for the generic layer.
    pub fn from_status(sw1: u8, sw2: u8) -> Self {
        if sw1 == 0x63 && sw2 & 0xF0 == 0xC0 {
            return Self::PinCodeIncorrect {
                retries: sw2 & 0x0F,
            };
        }
        match u16::from(sw1) << 8 | u16::from(sw2) {
            0x6600 => Self::IncorrectParameters("error setting the security environment"),
            0x66F0 => Self::IncorrectParameters("no space left for padding"),
            0x69F0 => Self::NotAllowed("command not allowed"),
            0x6A89 => Self::FileAlreadyExists("file exists"),
            0x6A8A => Self::FileAlreadyExists("application exists"),
            0x6F01 => Self::CardCommandFailed("public key not complete"),
            0x6F02 => Self::CardCommandFailed("data overflow"),
            0x6F03 => Self::CardCommandFailed("invalid command sequence"),
            0x6F05 => Self::CardCommandFailed("security environment invalid"),
            0x6F07 => Self::FileNotFound("key part not found"),
            0x6F08 => Self::CardCommandFailed("signature failed"),
            0x6F0A => Self::IncorrectParameters("key format does not match key length"),
            0x6F0B => Self::IncorrectParameters("length of key component inconsistent with algorithm"),
            0x6F81 => Self::CardCommandFailed("system error"),
            _ => Self::CardStatus(StatusWord::new(sw1, sw2)),
        }
    }

    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new error with a dynamic message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error was surfaced from a card status word.
    pub fn is_card_status(&self) -> bool {
        matches!(
            self,
            Self::PinCodeIncorrect { .. }
                | Self::IncorrectParameters(_)
                | Self::NotAllowed(_)
                | Self::FileNotFound(_)
                | Self::FileAlreadyExists(_)
                | Self::CardCommandFailed(_)
                | Self::CardStatus(_)
        )
    }
}

/// Extension trait for Result with context addition
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }
}

/// Extension trait for nexum_apdu_core::Result
pub trait CoreResultExt<T> {
    /// Convert core result to STARCOS result
    fn to_starcos(self) -> Result<T>;
}

impl<T> CoreResultExt<T> for std::result::Result<T, nexum_apdu_core::Error> {
    fn to_starcos(self) -> Result<T> {
        self.map_err(Error::from)
    }
}

impl From<TlvError> for Error {
    fn from(error: TlvError) -> Self {
        Self::Tlv(error)
    }
}

impl From<SelectFileError> for Error {
    fn from(err: SelectFileError) -> Self {
        match err {
            SelectFileError::NotFound => Self::FileNotFound("file or application not found"),
            SelectFileError::ResponseError(e) => Self::Core(e),
            SelectFileError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<ReadBinaryError> for Error {
    fn from(err: ReadBinaryError) -> Self {
        match err {
            ReadBinaryError::NoCurrentEf => Self::from_status(0x69, 0x86),
            ReadBinaryError::ResponseError(e) => Self::Core(e),
            ReadBinaryError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<CreateFileError> for Error {
    fn from(err: CreateFileError) -> Self {
        match err {
            CreateFileError::FileExists => Self::FileAlreadyExists("file exists"),
            CreateFileError::ApplicationExists => Self::FileAlreadyExists("application exists"),
            CreateFileError::NotAllowed => Self::NotAllowed("command not allowed"),
            CreateFileError::ResponseError(e) => Self::Core(e),
            CreateFileError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<RegisterDfError> for Error {
    fn from(err: RegisterDfError) -> Self {
        match err {
            RegisterDfError::ApplicationExists => Self::FileAlreadyExists("application exists"),
            RegisterDfError::ResponseError(e) => Self::Core(e),
            RegisterDfError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<EraseCardError> for Error {
    fn from(err: EraseCardError) -> Self {
        match err {
            EraseCardError::NotAllowed => Self::NotAllowed("command not allowed"),
            EraseCardError::ResponseError(e) => Self::Core(e),
            EraseCardError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<WriteKeyError> for Error {
    fn from(err: WriteKeyError) -> Self {
        match err {
            WriteKeyError::KeyPartNotFound => Self::FileNotFound("key part not found"),
            WriteKeyError::KeyFormatMismatch => {
                Self::IncorrectParameters("key format does not match key length")
            }
            WriteKeyError::KeyComponentLength => {
                Self::IncorrectParameters("length of key component inconsistent with algorithm")
            }
            WriteKeyError::ResponseError(e) => Self::Core(e),
            WriteKeyError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<GenerateKeyPairError> for Error {
    fn from(err: GenerateKeyPairError) -> Self {
        match err {
            GenerateKeyPairError::NotAllowed => Self::NotAllowed("command not allowed"),
            GenerateKeyPairError::ResponseError(e) => Self::Core(e),
            GenerateKeyPairError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<ReadPublicKeyError> for Error {
    fn from(err: ReadPublicKeyError) -> Self {
        match err {
            ReadPublicKeyError::PublicKeyIncomplete => {
                Self::CardCommandFailed("public key not complete")
            }
            ReadPublicKeyError::ResponseError(e) => Self::Core(e),
            ReadPublicKeyError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<ManageSecurityEnvError> for Error {
    fn from(err: ManageSecurityEnvError) -> Self {
        match err {
            ManageSecurityEnvError::EnvironmentError => {
                Self::IncorrectParameters("error setting the security environment")
            }
            ManageSecurityEnvError::EnvironmentInvalid => {
                Self::CardCommandFailed("security environment invalid")
            }
            ManageSecurityEnvError::ResponseError(e) => Self::Core(e),
            ManageSecurityEnvError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<PutHashError> for Error {
    fn from(err: PutHashError) -> Self {
        match err {
            PutHashError::PaddingOverflow => {
                Self::IncorrectParameters("no space left for padding")
            }
            PutHashError::ResponseError(e) => Self::Core(e),
            PutHashError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<ComputeSignatureError> for Error {
    fn from(err: ComputeSignatureError) -> Self {
        match err {
            ComputeSignatureError::SignatureFailed => Self::CardCommandFailed("signature failed"),
            ComputeSignatureError::ResponseError(e) => Self::Core(e),
            ComputeSignatureError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<InternalAuthenticateError> for Error {
    fn from(err: InternalAuthenticateError) -> Self {
        match err {
            InternalAuthenticateError::SignatureFailed => {
                Self::CardCommandFailed("signature failed")
            }
            InternalAuthenticateError::ResponseError(e) => Self::Core(e),
            InternalAuthenticateError::Unknown { sw1, sw2 } => Self::from_status(sw1, sw2),
        }
    }
}

impl From<GetCardDataError> for Error {
    fn from(err: GetCardDataError) -> Self {
        match err {
            // GET CARD DATA must answer 9000 once the transmit went
            // through; anything else is a broken protocol invariant.
            GetCardDataError::SystemError | GetCardDataError::Unknown { .. } => {
                Self::Internal("GET CARD DATA returned an unexpected status")
            }
            GetCardDataError::ResponseError(e) => Self::Core(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_failures_carry_the_retry_counter() {
        for retries in 0..=0x0F {
            match Error::from_status(0x63, 0xC0 | retries) {
                Error::PinCodeIncorrect { retries: r } => assert_eq!(r, retries),
                other => panic!("unexpected classification: {:?}", other),
            }
        }
    }

    #[test]
    fn vendor_table_is_complete() {
        let table: [(u8, u8, fn(&Error) -> bool); 14] = [
            (0x66, 0x00, |e| matches!(e, Error::IncorrectParameters(_))),
            (0x66, 0xF0, |e| matches!(e, Error::IncorrectParameters(_))),
            (0x69, 0xF0, |e| matches!(e, Error::NotAllowed(_))),
            (0x6A, 0x89, |e| matches!(e, Error::FileAlreadyExists(_))),
            (0x6A, 0x8A, |e| matches!(e, Error::FileAlreadyExists(_))),
            (0x6F, 0x01, |e| matches!(e, Error::CardCommandFailed(_))),
            (0x6F, 0x02, |e| matches!(e, Error::CardCommandFailed(_))),
            (0x6F, 0x03, |e| matches!(e, Error::CardCommandFailed(_))),
            (0x6F, 0x05, |e| matches!(e, Error::CardCommandFailed(_))),
            (0x6F, 0x07, |e| matches!(e, Error::FileNotFound(_))),
            (0x6F, 0x08, |e| matches!(e, Error::CardCommandFailed(_))),
            (0x6F, 0x0A, |e| matches!(e, Error::IncorrectParameters(_))),
            (0x6F, 0x0B, |e| matches!(e, Error::IncorrectParameters(_))),
            (0x6F, 0x81, |e| matches!(e, Error::CardCommandFailed(_))),
        ];
        for (sw1, sw2, check) in table {
            let err = Error::from_status(sw1, sw2);
            assert!(check(&err), "wrong kind for {:02X}{:02X}: {:?}", sw1, sw2, err);
        }
    }

    #[test]
    fn unlisted_status_words_fall_through() {
        match Error::from_status(0x6A, 0x82) {
            Error::CardStatus(sw) => assert_eq!((sw.sw1, sw.sw2), (0x6A, 0x82)),
            other => panic!("unexpected classification: {:?}", other),
        }
    }
}
