//! STARCOS SPK 2.3 driver for smart cards speaking the SPK 2.3
//! operating system.
//!
//! This crate adapts the generic `nexum-apdu-core` command layer to
//! the card's quirks: a proprietary file-creation protocol, a SELECT
//! FILE convention that omits FCIs for DFs, a dual-path signature
//! model chosen from a capability matrix, a segmented key-installation
//! protocol and a vendor-specific error-code table.
//!
//! The main entry point is the [`Starcos`] struct, generic over any
//! [`Executor`](nexum_apdu_core::executor::Executor). Hosts that just
//! want a PCSC reader can use [`DefaultStarcos::connect`].

pub mod application;
pub mod atr;
pub mod commands;
pub mod constants;
pub mod digest_info;
pub mod error;
pub mod types;

// Re-exports
pub use application::{ControlReply, ControlRequest, Starcos};
pub use atr::{CardProfile, RsaCapability, STARCOS_ATRS};
pub use error::{CoreResultExt, Error, Result, ResultExt};
pub use types::{
    AccessCondition, Aid, Algorithm, CreateData, DfData, EfData, EfStructure, Fci, FileAcl,
    FileDescriptor, FileId, FileKind, FilePath, GenerateKeyData, HashAlgorithm, KeyHeader,
    KeyReference, MfData, Padding, SecurityEnvironment, SecurityOperation, SelectTarget,
    WriteKeyData,
};

// Export the command pairs
pub use commands::*;

use nexum_apdu_core::prelude::*;
use nexum_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager, PcscTransport};

/// Default driver instance over a PCSC transport.
pub type DefaultStarcos = Starcos<CardExecutor<PcscTransport>>;

impl DefaultStarcos {
    /// Connect to a card reader with the given name.
    ///
    /// Hosts that dispatch between several drivers should first check
    /// the reader's ATR with [`Starcos::matches`].
    pub fn connect(reader_name: &str) -> Result<Self> {
        let config = PcscConfig::default();
        let manager = PcscDeviceManager::new()
            .map_err(|e| Error::message(format!("Failed to create PCSC device manager: {}", e)))?;
        let transport = manager
            .open_reader_with_config(reader_name, config)
            .map_err(|e| Error::message(format!("Failed to open reader: {}", e)))?;

        let executor = CardExecutor::new(transport);
        Ok(Self::new(executor))
    }
}
