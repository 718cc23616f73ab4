//! Assembly of the proprietary creation headers.
//!
//! The card consumes fixed-layout buffers: 19 bytes for the MF, 25
//! for a DF (whose leading `3 + aid_len` bytes double as the REGISTER
//! DF payload) and 16 for an EF. All multi-byte fields are big-endian
//! and every narrowing from the abstract descriptor is checked.

use crate::constants::{ac, MF_DEFAULT_KEY};
use crate::error::Error;
use crate::types::acl::wire_byte;
use crate::types::{EfStructure, FileDescriptor, FileId, FileKind};

/// Header for CREATE MF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MfData {
    /// 19-byte creation header.
    pub header: [u8; 19],
}

/// Header for REGISTER DF + CREATE DF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfData {
    /// 25-byte creation header.
    pub header: [u8; 25],
    /// DF size, sent as P1-P2 of REGISTER DF.
    pub size: u16,
}

impl DfData {
    /// The leading `3 + aid_len` header bytes sent with REGISTER DF.
    pub fn register_prefix(&self) -> &[u8] {
        let aid_len = usize::from(self.header[2]);
        &self.header[..3 + aid_len]
    }
}

/// Header for CREATE EF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EfData {
    /// 16-byte creation header.
    pub header: [u8; 16],
}

/// A creation request ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateData {
    /// Create the MF.
    MasterFile(MfData),
    /// Register and create a DF.
    DedicatedFile(DfData),
    /// Create a working EF.
    ElementaryFile(EfData),
}

impl CreateData {
    /// Derive the creation buffers from an abstract descriptor,
    /// using ALWAYS for operations without an ACL entry.
    pub fn from_descriptor(file: &FileDescriptor) -> Result<Self, Error> {
        Self::from_descriptor_with_default(file, ac::ALWAYS)
    }

    /// Derive the creation buffers, using `default_ac` for operations
    /// without an ACL entry.
    pub fn from_descriptor_with_default(
        file: &FileDescriptor,
        default_ac: u8,
    ) -> Result<Self, Error> {
        match file.kind {
            FileKind::Dedicated if file.id == FileId::MF => {
                Ok(Self::MasterFile(build_mf(file, default_ac)?))
            }
            FileKind::Dedicated => Ok(Self::DedicatedFile(build_df(file, default_ac)?)),
            FileKind::WorkingEf => Ok(Self::ElementaryFile(build_ef(file, default_ac)?)),
        }
    }
}

fn file_size(file: &FileDescriptor) -> Result<u16, Error> {
    u16::try_from(file.size).map_err(|_| Error::InvalidArguments("file size exceeds 16 bits"))
}

fn build_mf(file: &FileDescriptor, default_ac: u8) -> Result<MfData, Error> {
    let size = file_size(file)?;
    let create_ac = wire_byte(file.acl.create, default_ac);
    let sm = file.acl.create_sm_mode();

    let mut header = [0u8; 19];
    header[0..8].copy_from_slice(&MF_DEFAULT_KEY);
    header[8..10].copy_from_slice(&size.to_be_bytes());
    // ISF size estimate: a quarter of the MF
    header[10..12].copy_from_slice(&(size / 4).to_be_bytes());
    header[12] = create_ac; // AC create EF
    header[13] = create_ac; // AC create key
    header[14] = create_ac; // AC create DF
    header[15] = header[14]; // AC register DF, same as create DF
    header[16] = sm;
    header[17] = sm;
    header[18] = sm;

    Ok(MfData { header })
}

fn build_df(file: &FileDescriptor, default_ac: u8) -> Result<DfData, Error> {
    let size = file_size(file)?;
    let create_ac = wire_byte(file.acl.create, default_ac);
    let sm = file.acl.create_sm_mode();
    let fid = file.id.to_be_bytes();

    let mut header = [0u8; 25];
    header[0..2].copy_from_slice(&fid);
    match &file.aid {
        Some(aid) => {
            header[2] = aid.len() as u8;
            header[3..3 + aid.len()].copy_from_slice(aid.as_bytes());
        }
        None => {
            // no name: reuse the fid as a 2-byte AID
            header[2] = 2;
            header[3..5].copy_from_slice(&fid);
        }
    }
    header[19..21].copy_from_slice(&(size / 4).to_be_bytes());
    header[21] = create_ac; // AC create EF
    header[22] = create_ac; // AC create key
    header[23] = sm; // SM CR
    header[24] = sm; // SM ISF

    Ok(DfData { header, size })
}

fn build_ef(file: &FileDescriptor, default_ac: u8) -> Result<EfData, Error> {
    let mut header = [0u8; 16];
    header[0..2].copy_from_slice(&file.id.to_be_bytes());
    header[2] = wire_byte(file.acl.read, default_ac);
    header[3] = wire_byte(file.acl.write, default_ac);
    header[4] = wire_byte(file.acl.erase, default_ac);
    header[5] = ac::ALWAYS; // AC LOCK
    header[6] = ac::ALWAYS; // AC UNLOCK
    header[7] = ac::ALWAYS; // AC INCREASE
    header[8] = ac::ALWAYS; // AC DECREASE
    header[9] = 0x00; // rfu
    header[10] = 0x00; // rfu
    header[11] = file.acl.data_sm_mode();
    header[12] = 0x00; // SID: use the low 5 bits of the FID

    match file.structure {
        EfStructure::Transparent | EfStructure::Object => {
            let size = file_size(file)?;
            header[13] = 0x81;
            header[14..16].copy_from_slice(&size.to_be_bytes());
        }
        EfStructure::LinearFixed | EfStructure::Cyclic => {
            header[13] = if file.structure == EfStructure::LinearFixed {
                0x82
            } else {
                0x84
            };
            header[14] = u8::try_from(file.record_count)
                .map_err(|_| Error::InvalidArguments("record count exceeds 8 bits"))?;
            header[15] = u8::try_from(file.record_length)
                .map_err(|_| Error::InvalidArguments("record length exceeds 8 bits"))?;
        }
        EfStructure::ComputeService | EfStructure::Unknown => {
            return Err(Error::InvalidArguments(
                "EF structure not creatable through this driver",
            ));
        }
    }

    Ok(EfData { header })
}
