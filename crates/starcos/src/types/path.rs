//! Abstract paths accepted by the navigator.

use std::fmt;

use crate::error::Error;
use crate::types::{Aid, FileId};

/// A sequence of file identifiers, optionally starting at the MF.
///
/// STARCOS SPK 2.3 supports a single level of subdirectories, so a
/// normalized path is at most MF / DF / EF.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath(Vec<FileId>);

impl FilePath {
    /// Maximum raw path length in bytes.
    pub const MAX_BYTES: usize = 6;

    /// Build a path from file identifiers.
    pub fn new(ids: Vec<FileId>) -> Self {
        Self(ids)
    }

    /// The path selecting the MF itself.
    pub fn master_file() -> Self {
        Self(vec![FileId::MF])
    }

    /// The file identifiers making up the path.
    pub fn components(&self) -> &[FileId] {
        &self.0
    }

    /// Number of file identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path is empty. Normalization rejects empty paths.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The terminal file identifier.
    pub fn terminal(&self) -> Option<FileId> {
        self.0.last().copied()
    }

    /// Return the absolute form of the path: validated against the
    /// card's path rules and prefixed with the MF when necessary.
    ///
    /// Normalization is idempotent.
    pub fn normalized(&self) -> Result<Self, Error> {
        if self.0.is_empty() || self.0.len() * 2 > Self::MAX_BYTES {
            return Err(Error::InvalidArguments(
                "path must contain one to three file ids",
            ));
        }
        if self.0.len() * 2 == Self::MAX_BYTES && self.0[0] != FileId::MF {
            return Err(Error::InvalidArguments(
                "three-level paths must start at the MF",
            ));
        }
        if self.0[0] == FileId::MF {
            return Ok(self.clone());
        }
        let mut ids = Vec::with_capacity(self.0.len() + 1);
        ids.push(FileId::MF);
        ids.extend_from_slice(&self.0);
        Ok(Self(ids))
    }

    /// Whether this path is a leading prefix of `other`.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }
}

impl TryFrom<&[u8]> for FilePath {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() || value.len() % 2 != 0 || value.len() > Self::MAX_BYTES {
            return Err(Error::InvalidArguments(
                "raw path must be a non-empty even byte sequence of at most 6 bytes",
            ));
        }
        Ok(Self(
            value
                .chunks_exact(2)
                .map(|pair| FileId::from_be_bytes([pair[0], pair[1]]))
                .collect(),
        ))
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in &self.0 {
            if !first {
                write!(f, "/")?;
            }
            write!(f, "{}", id)?;
            first = false;
        }
        Ok(())
    }
}

/// The three path-type inputs the card accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    /// A single 2-byte file identifier, resolved in the current DF.
    FileId(FileId),
    /// A DF named by its application identifier.
    Application(Aid),
    /// A path of file identifiers from the MF.
    Path(FilePath),
}

impl From<FileId> for SelectTarget {
    fn from(id: FileId) -> Self {
        Self::FileId(id)
    }
}

impl From<Aid> for SelectTarget {
    fn from(aid: Aid) -> Self {
        Self::Application(aid)
    }
}

impl From<FilePath> for SelectTarget {
    fn from(path: FilePath) -> Self {
        Self::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_prefixes_the_mf() {
        let path = FilePath::new(vec![FileId::new(0xDF01), FileId::new(0xEF05)]);
        let normalized = path.normalized().unwrap();
        assert_eq!(
            normalized.components(),
            &[FileId::MF, FileId::new(0xDF01), FileId::new(0xEF05)]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let paths = [
            FilePath::new(vec![FileId::new(0x2F00)]),
            FilePath::new(vec![FileId::MF, FileId::new(0xDF01)]),
            FilePath::new(vec![FileId::new(0xDF01), FileId::new(0xEF05)]),
        ];
        for path in paths {
            let once = path.normalized().unwrap();
            assert_eq!(once.normalized().unwrap(), once);
        }
    }

    #[test]
    fn three_levels_must_start_at_the_mf() {
        let path = FilePath::new(vec![
            FileId::new(0xDF01),
            FileId::new(0xDF02),
            FileId::new(0xEF01),
        ]);
        assert!(path.normalized().is_err());
    }

    #[test]
    fn raw_paths_must_be_even_and_short() {
        assert!(FilePath::try_from([0x3Fu8].as_ref()).is_err());
        assert!(FilePath::try_from([0u8; 8].as_ref()).is_err());
        assert!(FilePath::try_from([0u8; 0].as_ref()).is_err());
        assert!(FilePath::try_from([0x3Fu8, 0x00, 0xDF, 0x01].as_ref()).is_ok());
    }

    #[test]
    fn prefix_detection() {
        let cache = FilePath::new(vec![FileId::MF, FileId::new(0xDF01)]);
        let target = FilePath::new(vec![
            FileId::MF,
            FileId::new(0xDF01),
            FileId::new(0xEF05),
        ]);
        assert!(cache.is_prefix_of(&target));
        assert!(!target.is_prefix_of(&cache));

        let sibling = FilePath::new(vec![FileId::MF, FileId::new(0xDF02)]);
        assert!(!cache.is_prefix_of(&sibling));
    }
}
