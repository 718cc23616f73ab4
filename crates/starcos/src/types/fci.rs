//! File-control-information decoding.
//!
//! A SELECT against this card may answer with a 6F template holding
//! the body size (tag 80) and a proprietary file descriptor (tag 82).
//! DFs usually return no FCI at all; the navigator never relies on
//! one to detect them.

use iso7816_tlv::ber::{Tag, Tlv, Value};

use crate::constants::tags;
use crate::error::Error;
use crate::types::EfStructure;

/// Decoded file-control information of an EF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fci {
    /// File body size in bytes.
    pub size: usize,
    /// EF structure; `Unknown` when the card does not report one.
    pub structure: EfStructure,
    /// Record length for record-structured EFs, zero otherwise.
    pub record_length: usize,
}

impl TryFrom<&[u8]> for Fci {
    type Error = Error;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        if buf.len() < 2 {
            return Err(Error::InvalidData("FCI shorter than a template header"));
        }
        if buf[0] != tags::FCI_TEMPLATE {
            return Err(Error::InvalidData("FCI does not start with tag 6F"));
        }
        let len = buf[1] as usize;
        if buf.len() - 2 < len {
            return Err(Error::InvalidData("FCI length exceeds the buffer"));
        }

        let template = Tlv::from_bytes(&buf[..2 + len])?;
        let children: &[Tlv] = match template.value() {
            Value::Constructed(children) => children,
            Value::Primitive(_) => return Ok(Self::default()),
        };

        let mut fci = Self::default();

        let size_tag = Tag::try_from(tags::FILE_SIZE)?;
        if let Some(Value::Primitive(bytes)) = children
            .iter()
            .find(|tlv| tlv.tag() == &size_tag)
            .map(Tlv::value)
        {
            if bytes.len() >= 2 {
                fci.size = usize::from(bytes[0]) << 8 | usize::from(bytes[1]);
            }
        }

        let descriptor_tag = Tag::try_from(tags::FILE_DESCRIPTOR)?;
        if let Some(Value::Primitive(bytes)) = children
            .iter()
            .find(|tlv| tlv.tag() == &descriptor_tag)
            .map(Tlv::value)
        {
            match bytes.as_slice() {
                [0x01] => fci.structure = EfStructure::Transparent,
                [0x11] => fci.structure = EfStructure::Object,
                [first, 0x21, record_length] => {
                    fci.structure = match *first {
                        0x02 => EfStructure::LinearFixed,
                        0x07 => EfStructure::Cyclic,
                        0x17 => EfStructure::ComputeService,
                        _ => EfStructure::Unknown,
                    };
                    if fci.structure != EfStructure::Unknown {
                        fci.record_length = usize::from(*record_length);
                    }
                }
                _ => {}
            }
        }

        Ok(fci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn transparent_ef_with_size() {
        let fci = Fci::try_from(hex!("6F07 8002 0080 820101").as_ref()).unwrap();
        assert_eq!(fci.size, 128);
        assert_eq!(fci.structure, EfStructure::Transparent);
        assert_eq!(fci.record_length, 0);
    }

    #[test]
    fn object_ef_reads_as_transparent() {
        let fci = Fci::try_from(hex!("6F07 8002 0200 820111").as_ref()).unwrap();
        assert_eq!(fci.size, 512);
        assert_eq!(fci.structure, EfStructure::Object);
        assert!(fci.structure.is_transparent());
    }

    #[test]
    fn linear_fixed_ef_with_record_length() {
        let fci = Fci::try_from(hex!("6F05 8203 022118").as_ref()).unwrap();
        assert_eq!(fci.structure, EfStructure::LinearFixed);
        assert_eq!(fci.record_length, 0x18);
    }

    #[test]
    fn cyclic_and_compute_descriptors() {
        let cyclic = Fci::try_from(hex!("6F05 8203 072110").as_ref()).unwrap();
        assert_eq!(cyclic.structure, EfStructure::Cyclic);
        assert_eq!(cyclic.record_length, 0x10);

        let compute = Fci::try_from(hex!("6F05 8203 172120").as_ref()).unwrap();
        assert_eq!(compute.structure, EfStructure::ComputeService);
    }

    #[test]
    fn unknown_record_kind_clears_the_record_length() {
        let fci = Fci::try_from(hex!("6F05 8203 052110").as_ref()).unwrap();
        assert_eq!(fci.structure, EfStructure::Unknown);
        assert_eq!(fci.record_length, 0);
    }

    #[test]
    fn missing_descriptor_defaults_to_unknown() {
        let fci = Fci::try_from(hex!("6F04 8002 0040").as_ref()).unwrap();
        assert_eq!(fci.size, 64);
        assert_eq!(fci.structure, EfStructure::Unknown);
    }

    #[test]
    fn creation_descriptors_round_trip_through_the_fci() {
        use crate::types::{CreateData, FileDescriptor, FileId};

        let files = [
            FileDescriptor::transparent_ef(FileId::new(0x2F00), 128),
            FileDescriptor::linear_fixed_ef(FileId::new(0x2F01), 4, 0x18),
            FileDescriptor::cyclic_ef(FileId::new(0x2F02), 8, 0x10),
        ];
        for file in files {
            let CreateData::ElementaryFile(data) = CreateData::from_descriptor(&file).unwrap()
            else {
                panic!("expected EF data");
            };
            // rebuild the template the card reports for such a file
            let template = match data.header[13] {
                0x81 => vec![
                    0x6F,
                    0x07,
                    0x80,
                    0x02,
                    data.header[14],
                    data.header[15],
                    0x82,
                    0x01,
                    0x01,
                ],
                kind => {
                    let reported = if kind == 0x82 { 0x02 } else { 0x07 };
                    vec![0x6F, 0x05, 0x82, 0x03, reported, 0x21, data.header[15]]
                }
            };
            let fci = Fci::try_from(template.as_slice()).unwrap();
            assert_eq!(fci.structure, file.structure);
            if fci.structure.is_transparent() {
                assert_eq!(fci.size, file.size);
            } else {
                assert_eq!(fci.record_length, file.record_length);
            }
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        assert!(Fci::try_from(hex!("6F").as_ref()).is_err());
        assert!(Fci::try_from(hex!("700482020101").as_ref()).is_err());
        assert!(Fci::try_from(hex!("6F10820101").as_ref()).is_err());
    }
}
