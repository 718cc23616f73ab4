//! Constants for the STARCOS SPK 2.3 card.

pub use nexum_apdu_core::StatusWord;

/// Class bytes used by the driver.
pub mod cla {
    /// Plain ISO 7816-4 class byte.
    pub const ISO: u8 = 0x00;
    /// Vendor class byte for the proprietary STARCOS commands.
    pub const STARCOS: u8 = 0x80;
}

/// Instruction bytes used by the driver.
pub mod ins {
    pub const SELECT: u8 = 0xA4;
    pub const READ_BINARY: u8 = 0xB0;
    pub const MANAGE_SECURITY_ENV: u8 = 0x22;
    pub const PERFORM_SECURITY_OP: u8 = 0x2A;
    pub const GENERATE_KEY: u8 = 0x46;
    pub const REGISTER_DF: u8 = 0x52;
    pub const INTERNAL_AUTHENTICATE: u8 = 0x88;
    pub const CREATE_FILE: u8 = 0xE0;
    pub const ERASE_FILES: u8 = 0xE4;
    pub const READ_PUBLIC_KEY: u8 = 0xF0;
    pub const WRITE_KEY: u8 = 0xF4;
    pub const GET_CARD_DATA: u8 = 0xF6;
}

/// Status words the driver branches on. The full vendor error table
/// lives in [`crate::Error::from_status`].
pub mod status {
    use super::StatusWord;

    /// Normal completion.
    pub const SW_NO_ERROR: StatusWord = StatusWord::new(0x90, 0x00);
    /// SELECT succeeded but no FCI is available (DF on this card).
    pub const SW_FCI_NOT_AVAILABLE: StatusWord = StatusWord::new(0x62, 0x84);
    /// Conditions of use not satisfied (no MF on erase/logout).
    pub const SW_CONDITIONS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x85);
    /// No current EF selected (READ BINARY against a DF).
    pub const SW_NO_CURRENT_EF: StatusWord = StatusWord::new(0x69, 0x86);
    /// Command not allowed (vendor).
    pub const SW_COMMAND_NOT_ALLOWED: StatusWord = StatusWord::new(0x69, 0xF0);
    /// File exists (vendor).
    pub const SW_FILE_EXISTS: StatusWord = StatusWord::new(0x6A, 0x89);
    /// Application exists (vendor).
    pub const SW_APPLICATION_EXISTS: StatusWord = StatusWord::new(0x6A, 0x8A);
    /// Error setting the security environment (vendor).
    pub const SW_SEC_ENV_ERROR: StatusWord = StatusWord::new(0x66, 0x00);
    /// No space left for padding (vendor).
    pub const SW_PADDING_OVERFLOW: StatusWord = StatusWord::new(0x66, 0xF0);
    /// Security environment invalid (vendor).
    pub const SW_SEC_ENV_INVALID: StatusWord = StatusWord::new(0x6F, 0x05);
    /// Key part not found (vendor).
    pub const SW_KEY_PART_NOT_FOUND: StatusWord = StatusWord::new(0x6F, 0x07);
    /// Signature failed (vendor).
    pub const SW_SIGNATURE_FAILED: StatusWord = StatusWord::new(0x6F, 0x08);
    /// Public key not complete (vendor).
    pub const SW_PUBLIC_KEY_INCOMPLETE: StatusWord = StatusWord::new(0x6F, 0x01);
}

/// Wire tags of the proprietary protocols.
pub mod tags {
    /// FCI template returned by SELECT.
    pub const FCI_TEMPLATE: u8 = 0x6F;
    /// File body size inside the FCI template.
    pub const FILE_SIZE: u8 = 0x80;
    /// File descriptor inside the FCI template.
    pub const FILE_DESCRIPTOR: u8 = 0x82;
    /// Key header carrier for WRITE KEY.
    pub const KEY_HEADER: u8 = 0xC1;
    /// Key segment carrier for WRITE KEY.
    pub const KEY_SEGMENT: u8 = 0xC2;
}

/// STARCOS access-condition codes.
pub mod ac {
    /// Operation always allowed.
    pub const ALWAYS: u8 = 0x9F;
    /// Operation never allowed.
    pub const NEVER: u8 = 0x5F;
    /// Secure-messaging bit inside a PIN-state AC byte.
    pub const SM_BIT: u8 = 0x10;
    /// Combined-mode secure messaging marker in creation headers.
    pub const SM_COMBINED: u8 = 0x03;
    /// No secure messaging in creation headers.
    pub const SM_NONE: u8 = 0x00;
}

/// Largest data field the card accepts or produces per APDU.
pub const MAX_APDU_DATA: usize = 128;

/// WRITE KEY streams key material in segments of at most this size.
pub const KEY_SEGMENT_SIZE: usize = 124;

/// Offset of the (little-endian) modulus inside a READ PUBLIC KEY
/// response. The preceding bytes carry undocumented key metadata.
pub const PUBLIC_KEY_MODULUS_OFFSET: usize = 18;

/// Factory transport key placeholder written into new MF headers.
pub const MF_DEFAULT_KEY: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

/// WRITE KEY mode that installs a key header before any key material.
pub const KEY_MODE_INSTALL: u8 = 0x00;
