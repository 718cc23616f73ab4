//! File identities and descriptors.

use std::fmt;

use crate::error::Error;
use crate::types::FileAcl;

/// A 2-byte ISO 7816 file identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u16);

impl FileId {
    /// The master file.
    pub const MF: Self = Self(0x3F00);

    /// Create a file id from its 16-bit value.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// The 16-bit value.
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Big-endian wire form.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Build a file id from its two wire bytes.
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

/// A 1-16 byte application identifier naming a DF.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Aid(Vec<u8>);

impl Aid {
    /// Maximum AID length in bytes.
    pub const MAX_LEN: usize = 16;

    /// The AID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the AID is empty; construction rejects empty AIDs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Aid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Aid {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() || value.len() > Self::MAX_LEN {
            return Err(Error::InvalidArguments("AID must be 1 to 16 bytes"));
        }
        Ok(Self(value.to_vec()))
    }
}

impl fmt::Display for Aid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(&self.0))
    }
}

/// Whether a file is a directory or a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A dedicated file (directory).
    Dedicated,
    /// A working elementary file.
    WorkingEf,
}

/// The on-card structure of an EF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EfStructure {
    /// Transparent byte string.
    Transparent,
    /// Proprietary object file. Readable like a transparent EF, but
    /// the card stores additional structure the driver does not
    /// interpret.
    Object,
    /// Linear fixed records.
    LinearFixed,
    /// Cyclic records.
    Cyclic,
    /// Compute-service file; not readable through this driver.
    ComputeService,
    /// Structure not reported by the card.
    #[default]
    Unknown,
}

impl EfStructure {
    /// Whether the file can be read with READ BINARY.
    pub const fn is_transparent(self) -> bool {
        matches!(self, Self::Transparent | Self::Object)
    }
}

/// Semantic description of a file on the card.
///
/// Selection fills in what the card reports (kind, structure, size);
/// creation additionally consumes the dimensions and the ACL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// 2-byte file identifier.
    pub id: FileId,
    /// Application identifier, for DFs that carry one.
    pub aid: Option<Aid>,
    /// DF or working EF.
    pub kind: FileKind,
    /// EF structure; `Unknown` for DFs.
    pub structure: EfStructure,
    /// File body size in bytes (transparent EFs, MF/DF allocation).
    pub size: usize,
    /// Number of records (record EFs).
    pub record_count: usize,
    /// Record length in bytes (record EFs).
    pub record_length: usize,
    /// Access-control list consumed by file creation.
    pub acl: FileAcl,
}

impl FileDescriptor {
    /// A DF known only by its file id.
    pub fn dedicated(id: FileId) -> Self {
        Self {
            id,
            aid: None,
            kind: FileKind::Dedicated,
            structure: EfStructure::Unknown,
            size: 0,
            record_count: 0,
            record_length: 0,
            acl: FileAcl::default(),
        }
    }

    /// A DF known by its application identifier.
    pub fn application(aid: Aid) -> Self {
        Self {
            aid: Some(aid),
            ..Self::dedicated(FileId::new(0x0000))
        }
    }

    /// The MF, sized for creation.
    pub fn master_file(size: usize) -> Self {
        Self {
            size,
            ..Self::dedicated(FileId::MF)
        }
    }

    /// A transparent EF, sized for creation.
    pub fn transparent_ef(id: FileId, size: usize) -> Self {
        Self {
            kind: FileKind::WorkingEf,
            structure: EfStructure::Transparent,
            size,
            ..Self::dedicated(id)
        }
    }

    /// A linear-fixed EF, dimensioned for creation.
    pub fn linear_fixed_ef(id: FileId, record_count: usize, record_length: usize) -> Self {
        Self {
            kind: FileKind::WorkingEf,
            structure: EfStructure::LinearFixed,
            record_count,
            record_length,
            ..Self::dedicated(id)
        }
    }

    /// A cyclic EF, dimensioned for creation.
    pub fn cyclic_ef(id: FileId, record_count: usize, record_length: usize) -> Self {
        Self {
            kind: FileKind::WorkingEf,
            structure: EfStructure::Cyclic,
            record_count,
            record_length,
            ..Self::dedicated(id)
        }
    }

    /// Attach an access-control list.
    pub fn with_acl(mut self, acl: FileAcl) -> Self {
        self.acl = acl;
        self
    }

    /// Attach an application identifier (DFs only).
    pub fn with_aid(mut self, aid: Aid) -> Self {
        self.aid = Some(aid);
        self
    }
}

impl fmt::Display for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FileKind::Dedicated => match &self.aid {
                Some(aid) => write!(f, "DF {} (AID {})", self.id, aid),
                None => write!(f, "DF {}", self.id),
            },
            FileKind::WorkingEf => write!(f, "EF {} ({:?}, {} bytes)", self.id, self.structure, self.size),
        }
    }
}
