//! Access conditions and their STARCOS wire encoding.

use crate::constants::ac;

/// How an operation on a file is gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCondition {
    /// Operation always allowed.
    Always,
    /// Operation never allowed.
    Never,
    /// Operation gated by a PIN. `reference & 0x0F == 1` is the
    /// security-officer PIN.
    Pin {
        /// PIN reference number, 1..=15.
        reference: u8,
        /// Whether the operation additionally requires secure
        /// messaging.
        protected: bool,
    },
    /// Operation requires secure messaging without a PIN. The AC
    /// byte keeps the caller-supplied default; only the header's SM
    /// mode byte is affected.
    Protected,
}

impl AccessCondition {
    /// Encode the condition as a STARCOS AC byte, falling back to
    /// `default` where the card format has no direct encoding.
    ///
    /// PIN states: the SOPIN keeps its raw low nibble (0x01); any
    /// other reference `k` encodes as `0x0F - (k >> 1)`.
    pub fn to_wire(self, default: u8) -> u8 {
        match self {
            Self::Always => ac::ALWAYS,
            Self::Never => ac::NEVER,
            Self::Pin {
                reference,
                protected,
            } => {
                let sm = if protected { ac::SM_BIT } else { 0x00 };
                let state = match reference & 0x0F {
                    0x01 => 0x01,
                    low => 0x0F - (low >> 1),
                };
                sm | state
            }
            Self::Protected => default,
        }
    }

    /// Whether this condition forces secure messaging.
    pub const fn requires_protection(self) -> bool {
        matches!(
            self,
            Self::Protected
                | Self::Pin {
                    protected: true,
                    ..
                }
        )
    }
}

/// Per-operation access conditions of a file.
///
/// Operations without an entry use the creation default (ALWAYS for
/// files created through this driver).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileAcl {
    /// Reading the file body or records.
    pub read: Option<AccessCondition>,
    /// Updating the file body or records.
    pub write: Option<AccessCondition>,
    /// Erasing the file content.
    pub erase: Option<AccessCondition>,
    /// Creating children (EFs, DFs, keys) below a DF or the MF.
    pub create: Option<AccessCondition>,
}

impl FileAcl {
    /// The SM mode byte for an MF/DF header: combined mode when child
    /// creation requires protected messaging.
    pub(crate) fn create_sm_mode(&self) -> u8 {
        match self.create {
            Some(entry) if entry.requires_protection() => ac::SM_COMBINED,
            _ => ac::SM_NONE,
        }
    }

    /// The SM mode byte for an EF header: combined mode when any data
    /// operation requires protected messaging.
    pub(crate) fn data_sm_mode(&self) -> u8 {
        let protected = [self.read, self.write, self.erase]
            .into_iter()
            .flatten()
            .any(AccessCondition::requires_protection);
        if protected {
            ac::SM_COMBINED
        } else {
            ac::SM_NONE
        }
    }
}

/// Encode an optional ACL entry, using `default` when absent.
pub(crate) fn wire_byte(entry: Option<AccessCondition>, default: u8) -> u8 {
    entry.map_or(default, |entry| entry.to_wire(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_encode_directly() {
        assert_eq!(AccessCondition::Always.to_wire(0x00), 0x9F);
        assert_eq!(AccessCondition::Never.to_wire(0x00), 0x5F);
    }

    #[test]
    fn missing_entries_use_the_default() {
        assert_eq!(wire_byte(None, 0x9F), 0x9F);
        assert_eq!(wire_byte(Some(AccessCondition::Protected), 0x5F), 0x5F);
    }

    #[test]
    fn sopin_keeps_its_raw_nibble() {
        for protected in [false, true] {
            let byte = AccessCondition::Pin {
                reference: 0x01,
                protected,
            }
            .to_wire(0x00);
            assert_eq!(byte & 0x0F, 0x01);
            assert_eq!(byte & 0x10 != 0, protected);
        }
    }

    #[test]
    fn pin_states_cover_the_reference_range() {
        // Total on every reference and SM flag: ALWAYS/NEVER markers
        // never collide with PIN states, the SM bit tracks the flag
        // and the low nibble follows the documented formula.
        for reference in 1..=15u8 {
            for protected in [false, true] {
                let byte = AccessCondition::Pin {
                    reference,
                    protected,
                }
                .to_wire(0x00);
                assert_ne!(byte, 0x9F);
                assert_ne!(byte, 0x5F);
                assert_eq!(byte & 0x10 != 0, protected);
                let expected = if reference & 0x0F == 1 {
                    0x01
                } else {
                    0x0F - ((reference & 0x0F) >> 1)
                };
                assert_eq!(byte & 0x0F, expected);
            }
        }
    }

    #[test]
    fn sm_mode_scans_the_data_operations() {
        let mut acl = FileAcl {
            read: Some(AccessCondition::Always),
            write: Some(AccessCondition::Always),
            erase: None,
            create: None,
        };
        assert_eq!(acl.data_sm_mode(), 0x00);

        acl.erase = Some(AccessCondition::Pin {
            reference: 3,
            protected: true,
        });
        assert_eq!(acl.data_sm_mode(), 0x03);

        acl.erase = Some(AccessCondition::Protected);
        assert_eq!(acl.data_sm_mode(), 0x03);
    }
}
