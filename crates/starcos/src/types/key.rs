//! Key material for the Internal Secret File.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The 12-byte key header installed ahead of any key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Zeroize)]
pub struct KeyHeader(pub [u8; 12]);

/// A key-installation request.
///
/// Mode 0 installs the header first; other modes update existing key
/// material. The key bytes are wiped when the request is dropped.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct WriteKeyData {
    /// Key header written under tag C1.
    pub header: KeyHeader,
    /// ISF key identifier.
    pub key_id: u8,
    /// 0 installs a new key, other values update one.
    pub mode: u8,
    /// Key material, streamed in segments; may be empty when only the
    /// header is installed.
    pub key: Vec<u8>,
}

impl WriteKeyData {
    /// Install a key header, optionally followed by key material.
    pub fn install(header: KeyHeader, key_id: u8, key: Vec<u8>) -> Self {
        Self {
            header,
            key_id,
            mode: crate::constants::KEY_MODE_INSTALL,
            key,
        }
    }
}

/// An on-card key-generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateKeyData {
    /// ISF key identifier that receives the private key.
    pub key_id: u8,
    /// Modulus length in bits.
    pub modulus_bits: u16,
}
