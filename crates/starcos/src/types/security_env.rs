//! Security environments requested by callers.

/// The cryptographic operation a security environment configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityOperation {
    /// Digital signature.
    Sign,
    /// Internal authentication (also used as the signature fallback).
    Authenticate,
    /// Deciphering.
    Decipher,
}

/// The asymmetric algorithm of the referenced key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// RSA, the only algorithm this card supports.
    Rsa,
}

/// Signature padding schemes of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// PKCS#1 v1.5.
    Pkcs1,
    /// ISO 9796-2.
    Iso9796,
}

/// Hash modes advertised by the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// No on-card hashing; data is signed as given.
    #[default]
    None,
    /// SHA-1.
    Sha1,
    /// MD5.
    Md5,
    /// RIPEMD-160.
    Ripemd160,
    /// Concatenated MD5 and SHA-1 digests (TLS client signatures).
    Md5Sha1,
}

/// Reference to a key in the Internal Secret File.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyReference {
    /// Raw reference bytes.
    pub value: Vec<u8>,
    /// Whether the reference names an asymmetric key (tag 83 on the
    /// wire instead of 84).
    pub asymmetric: bool,
}

impl KeyReference {
    /// Reference an asymmetric key.
    pub fn asymmetric(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            asymmetric: true,
        }
    }

    /// Reference a symmetric key.
    pub fn symmetric(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            asymmetric: false,
        }
    }
}

/// A caller-provided security environment, immutable per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEnvironment {
    /// Requested operation.
    pub operation: SecurityOperation,
    /// Algorithm of the referenced key, when the caller states one.
    pub algorithm: Option<Algorithm>,
    /// Requested padding.
    pub padding: Padding,
    /// Requested hash mode.
    pub hash: HashAlgorithm,
    /// Optional key reference.
    pub key_reference: Option<KeyReference>,
    /// Explicit algorithm reference overriding the padding/hash
    /// matrix.
    pub algorithm_reference: Option<u8>,
}

impl SecurityEnvironment {
    /// A signing environment.
    pub fn sign(padding: Padding, hash: HashAlgorithm) -> Self {
        Self {
            operation: SecurityOperation::Sign,
            algorithm: Some(Algorithm::Rsa),
            padding,
            hash,
            key_reference: None,
            algorithm_reference: None,
        }
    }

    /// An internal-authentication environment (PKCS#1 only).
    pub fn authenticate(hash: HashAlgorithm) -> Self {
        Self {
            operation: SecurityOperation::Authenticate,
            ..Self::sign(Padding::Pkcs1, hash)
        }
    }

    /// A deciphering environment (PKCS#1 only).
    pub fn decipher() -> Self {
        Self {
            operation: SecurityOperation::Decipher,
            ..Self::sign(Padding::Pkcs1, HashAlgorithm::None)
        }
    }

    /// Attach a key reference.
    pub fn with_key_reference(mut self, key_reference: KeyReference) -> Self {
        self.key_reference = Some(key_reference);
        self
    }

    /// Force an explicit algorithm reference byte.
    pub fn with_algorithm_reference(mut self, reference: u8) -> Self {
        self.algorithm_reference = Some(reference);
        self
    }
}
