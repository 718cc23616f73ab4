//! The STARCOS driver object.
//!
//! [`Starcos`] wraps an executor and adapts the generic command layer
//! to the card's quirks: the SELECT handshake that tells DFs from
//! EFs, the one-entry location cache, the proprietary creation and
//! key-installation protocols and the dual-path signature model.

use std::cell::Cell;
use std::mem;

use bytes::{BufMut, BytesMut};
use nexum_apdu_core::prelude::*;
use tracing::{debug, warn};

use crate::atr::CardProfile;
use crate::commands::*;
use crate::digest_info;
use crate::error::{Error, Result};
use crate::types::{
    Aid, Algorithm, CreateData, DfData, EfData, Fci, FileDescriptor, FileId, FileKind, FilePath,
    GenerateKeyData, HashAlgorithm, MfData, Padding, SecurityEnvironment, SecurityOperation,
    SelectTarget, WriteKeyData,
};
use crate::constants::{KEY_MODE_INSTALL, KEY_SEGMENT_SIZE, PUBLIC_KEY_MODULUS_OFFSET};

/// What the navigator remembers about the card's current position.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LocationCache {
    /// Nothing usable is known.
    Invalid,
    /// The card sits in the DF named by this absolute path.
    Path(FilePath),
    /// The card sits in the DF selected by this AID.
    Application(Aid),
}

/// The signature operation negotiated by the last MSE, consumed by
/// the next signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CryptoState {
    Idle,
    SignNative,
    SignByAuthenticate { hash: HashAlgorithm },
}

/// Scoped error-log suppression, reverted on drop.
///
/// The COMPUTE SIGNATURE probe may legally fail, so the negotiator
/// silences card-error logging while it runs.
struct ErrorSuppression<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> ErrorSuppression<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        Self {
            flag,
            previous: flag.replace(true),
        }
    }
}

impl Drop for ErrorSuppression<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Control operations multiplexed through [`Starcos::control`].
#[derive(Debug, Clone)]
pub enum ControlRequest {
    /// Create a file from pre-assembled creation buffers.
    CreateFile(CreateData),
    /// Activate the access conditions of a created MF or DF.
    CreateEnd(FileId),
    /// Install or update a key in the Internal Secret File.
    WriteKey(WriteKeyData),
    /// Generate a key pair on the card.
    GenerateKey(GenerateKeyData),
    /// Restore the delivery state by deleting the MF.
    EraseCard,
    /// Read (and cache) the card serial number.
    SerialNumber,
}

/// Replies of [`Starcos::control`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlReply {
    /// The operation completed without producing data.
    Done,
    /// The big-endian public modulus of a generated key pair.
    Modulus(Vec<u8>),
    /// The card serial number.
    SerialNumber(Vec<u8>),
}

/// STARCOS SPK 2.3 driver over an APDU executor.
///
/// All driver-side state (the location cache, the negotiated crypto
/// operation and the serial-number cache) lives in this value and is
/// released with it.
pub struct Starcos<E: Executor> {
    /// Command executor
    executor: E,
    /// Capabilities of the matched card
    profile: CardProfile,
    /// One-entry location cache
    location: LocationCache,
    /// Signature operation negotiated by the last MSE
    crypto_env: CryptoState,
    /// Cached card serial number
    serial: Option<Vec<u8>>,
    /// When set, card errors are not logged
    suppress_errors: Cell<bool>,
}

impl<E: Executor> Starcos<E> {
    /// Create a driver instance with the default SPK 2.3 profile.
    pub fn new(executor: E) -> Self {
        Self::with_profile(executor, CardProfile::spk23())
    }

    /// Create a driver instance for a matched card profile.
    pub fn with_profile(executor: E, profile: CardProfile) -> Self {
        Self {
            executor,
            profile,
            location: LocationCache::Invalid,
            crypto_env: CryptoState::Idle,
            serial: None,
            suppress_errors: Cell::new(false),
        }
    }

    /// Whether `atr` identifies a card this driver handles.
    ///
    /// A mismatch is not an error: another driver should be tried.
    pub fn matches(atr: &[u8]) -> bool {
        CardProfile::from_atr(atr).is_some()
    }

    /// The capability profile of the card.
    pub fn profile(&self) -> &CardProfile {
        &self.profile
    }

    /// Access the underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Mutable access to the underlying executor.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Log a card error unless suppression is active, then pass the
    /// error on.
    fn surface(&self, err: Error) -> Error {
        if err.is_card_status() && !self.suppress_errors.get() {
            warn!(%err, "card error");
        }
        err
    }

    //
    // File-system navigation
    //

    /// Resolve `target` to a selected file on the card.
    pub fn select_file(&mut self, target: &SelectTarget) -> Result<FileDescriptor> {
        match target {
            SelectTarget::FileId(id) => self.select_fid(*id, true),
            SelectTarget::Application(aid) => {
                if let LocationCache::Application(cached) = &self.location {
                    if cached == aid {
                        debug!(%aid, "location cache hit");
                        return Ok(FileDescriptor::application(aid.clone()));
                    }
                }
                self.select_aid(aid)
            }
            SelectTarget::Path(path) => self.select_path(path),
        }
    }

    /// SELECT by file id with the DF/EF discrimination handshake.
    ///
    /// When `want_fci` is set the select requests an FCI; 6284 marks
    /// a DF (the select is re-issued without an FCI request), while a
    /// data-bearing response is disambiguated with a one-byte READ
    /// BINARY probe.
    fn select_fid(&mut self, id: FileId, want_fci: bool) -> Result<FileDescriptor> {
        let cmd = if want_fci {
            SelectFileCommand::file_id(id)
        } else {
            SelectFileCommand::file_id_discard_fci(id)
        };

        let mut fci_bytes = Vec::new();
        let is_df = match self.executor.execute(&cmd) {
            Ok(SelectFileOk::Selected { fci }) => {
                // probably an EF; probe to make sure
                match self.executor.execute(&ReadBinaryCommand::probe()) {
                    Err(ReadBinaryError::NoCurrentEf) => true,
                    Err(ReadBinaryError::ResponseError(e)) => {
                        return Err(self.surface(Error::Core(e)))
                    }
                    _ => {
                        fci_bytes = fci;
                        false
                    }
                }
            }
            Ok(SelectFileOk::NoFci) => {
                // no FCI means a DF; complete the select without one
                self.executor
                    .execute(&SelectFileCommand::file_id_discard_fci(id))
                    .map_err(|e| self.surface(e.into()))?;
                true
            }
            Err(e) => return Err(self.surface(e.into())),
        };

        if is_df {
            // a DF select always lands directly below the MF
            let path = if id == FileId::MF {
                FilePath::master_file()
            } else {
                FilePath::new(vec![FileId::MF, id])
            };
            self.location = LocationCache::Path(path);
        }

        if is_df {
            Ok(FileDescriptor::dedicated(id))
        } else if want_fci {
            let fci = Fci::try_from(fci_bytes.as_slice())?;
            Ok(FileDescriptor {
                kind: FileKind::WorkingEf,
                structure: fci.structure,
                size: fci.size,
                record_length: fci.record_length,
                ..FileDescriptor::dedicated(id)
            })
        } else {
            Ok(FileDescriptor {
                kind: FileKind::WorkingEf,
                ..FileDescriptor::dedicated(id)
            })
        }
    }

    /// SELECT a DF by name.
    fn select_aid(&mut self, aid: &Aid) -> Result<FileDescriptor> {
        match self.executor.execute(&SelectFileCommand::application(aid)) {
            Ok(SelectFileOk::Selected { .. }) => {
                self.location = LocationCache::Application(aid.clone());
                Ok(FileDescriptor::application(aid.clone()))
            }
            Ok(SelectFileOk::NoFci) => Err(self.surface(Error::from_status(0x62, 0x84))),
            Err(e) => Err(self.surface(e.into())),
        }
    }

    /// Traverse a path of file ids, reusing the cached position.
    fn select_path(&mut self, path: &FilePath) -> Result<FileDescriptor> {
        let path = path.normalized()?;

        let cached = match &self.location {
            LocationCache::Path(cached) if cached.is_prefix_of(&path) => Some(cached.clone()),
            _ => None,
        };

        let ids = path.components();
        let (remaining, cache_hit) = match &cached {
            Some(cached) if cached.len() == ids.len() => (&[][..], true),
            Some(cached) => (&ids[cached.len()..], false),
            None => (ids, false),
        };

        if cache_hit {
            debug!(%path, "location cache hit");
            let Some(terminal) = path.terminal() else {
                return Err(Error::Internal("normalized path has no components"));
            };
            return Ok(FileDescriptor::dedicated(terminal));
        }

        let Some((terminal, intermediates)) = remaining.split_last() else {
            return Err(Error::Internal("normalized path has no components"));
        };
        let (terminal, intermediates) = (*terminal, intermediates.to_vec());
        for id in intermediates {
            self.select_fid(id, false)?;
        }
        self.select_fid(terminal, true)
    }

    /// SELECT the MF, suppressing error logs; used as logout.
    ///
    /// 6985 ("no MF") counts as success: there is nothing to log out
    /// from.
    pub fn logout(&mut self) -> Result<()> {
        let cmd = SelectFileCommand::master_file();
        let result = {
            let _quiet = ErrorSuppression::new(&self.suppress_errors);
            self.executor.execute(&cmd)
        };
        match result {
            Ok(_) => {
                self.location = LocationCache::Path(FilePath::master_file());
                Ok(())
            }
            Err(SelectFileError::Unknown {
                sw1: 0x69,
                sw2: 0x85,
            }) => Ok(()),
            Err(e) => Err(self.surface(e.into())),
        }
    }

    //
    // File creation
    //

    /// Create the MF, a DF or an EF described by `file`.
    ///
    /// MF and DF creation must be followed by [`Self::create_end`]
    /// before the new directory is usable.
    pub fn create_file(&mut self, file: &FileDescriptor) -> Result<()> {
        match CreateData::from_descriptor(file)? {
            CreateData::MasterFile(data) => self.create_mf(&data),
            CreateData::DedicatedFile(data) => self.create_df(&data),
            CreateData::ElementaryFile(data) => self.create_ef(&data),
        }
    }

    /// Create the MF from a pre-assembled header.
    pub fn create_mf(&mut self, data: &MfData) -> Result<()> {
        debug!("creating MF");
        self.executor
            .execute(&CreateFileCommand::master_file(data))
            .map_err(|e| self.surface(e.into()))?;
        Ok(())
    }

    /// Register and create a DF from a pre-assembled header.
    pub fn create_df(&mut self, data: &DfData) -> Result<()> {
        debug!("registering DF");
        self.executor
            .execute(&RegisterDfCommand::with_size(
                data.size,
                data.register_prefix(),
            ))
            .map_err(|e| self.surface(e.into()))?;
        debug!("creating DF");
        self.executor
            .execute(&CreateFileCommand::dedicated_file(data))
            .map_err(|e| self.surface(e.into()))?;
        Ok(())
    }

    /// Create an EF from a pre-assembled header.
    pub fn create_ef(&mut self, data: &EfData) -> Result<()> {
        debug!("creating EF");
        self.executor
            .execute(&CreateFileCommand::elementary_file(data))
            .map_err(|e| self.surface(e.into()))?;
        Ok(())
    }

    /// Finish MF/DF creation and activate the access conditions.
    pub fn create_end(&mut self, id: FileId) -> Result<()> {
        self.executor
            .execute(&CreateFileCommand::end(id))
            .map_err(|e| self.surface(e.into()))?;
        Ok(())
    }

    /// Delete the MF, restoring the delivery state of test cards.
    ///
    /// The location cache is invalidated whether or not the card
    /// accepts the command.
    pub fn erase_card(&mut self) -> Result<()> {
        let result = self.executor.execute(&EraseCardCommand::master_file());
        self.location = LocationCache::Invalid;
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(self.surface(e.into())),
        }
    }

    //
    // Keys
    //

    /// Install a key header and stream the key material into the ISF.
    ///
    /// Fail-fast: a rejected segment aborts the transfer without any
    /// rollback of what was already written.
    pub fn write_key(&mut self, data: &WriteKeyData) -> Result<()> {
        if data.key.len() > usize::from(u16::MAX) {
            return Err(Error::InvalidArguments("key material exceeds 16-bit offsets"));
        }

        if data.mode == KEY_MODE_INSTALL {
            self.executor
                .execute(&WriteKeyCommand::install_header(&data.header))
                .map_err(|e| self.surface(e.into()))?;
        }

        let mut offset: u16 = 0;
        for chunk in data.key.chunks(KEY_SEGMENT_SIZE) {
            self.executor
                .execute(&WriteKeyCommand::segment(
                    data.mode,
                    data.key_id,
                    offset,
                    chunk,
                ))
                .map_err(|e| self.surface(e.into()))?;
            offset += chunk.len() as u16;
        }
        Ok(())
    }

    /// Generate a key pair on the card and return the public modulus
    /// in big-endian order.
    pub fn generate_key_pair(&mut self, key_id: u8, modulus_bits: u16) -> Result<Vec<u8>> {
        self.executor
            .execute(&GenerateKeyPairCommand::with_modulus_bits(
                key_id,
                modulus_bits,
            ))
            .map_err(|e| self.surface(e.into()))?;

        let ReadPublicKeyOk::KeyData { data } = self
            .executor
            .execute(&ReadPublicKeyCommand::for_key(key_id))
            .map_err(|e| self.surface(e.into()))?;

        let len = usize::from(modulus_bits / 8);
        let start = PUBLIC_KEY_MODULUS_OFFSET;
        if data.len() < start + len {
            return Err(Error::InvalidData("public key response truncated"));
        }
        // the card stores the modulus LSB first
        let mut modulus = data[start..start + len].to_vec();
        modulus.reverse();
        Ok(modulus)
    }

    /// Read the card serial number, caching it on first use.
    pub fn serial_number(&mut self) -> Result<Vec<u8>> {
        if let Some(serial) = &self.serial {
            return Ok(serial.clone());
        }
        let GetCardDataOk::Data { data } = self
            .executor
            .execute(&GetCardDataCommand::serial_number())
            .map_err(|e| self.surface(e.into()))?;
        self.serial = Some(data.clone());
        Ok(data)
    }

    //
    // Cryptographic operations
    //

    /// Negotiate the security environment for the next operation.
    ///
    /// Signing first probes COMPUTE SIGNATURE; if the card refuses
    /// the environment, the negotiator falls back to INTERNAL
    /// AUTHENTICATE. Exactly one signature may follow a successful
    /// negotiation.
    pub fn set_security_env(&mut self, env: &SecurityEnvironment) -> Result<()> {
        let mut data = BytesMut::new();
        if let Some(key_ref) = &env.key_reference {
            if key_ref.value.is_empty() || key_ref.value.len() > 0xFF {
                return Err(Error::InvalidArguments(
                    "key reference must be 1 to 255 bytes",
                ));
            }
            data.put_u8(if key_ref.asymmetric { 0x83 } else { 0x84 });
            data.put_u8(key_ref.value.len() as u8);
            data.put_slice(&key_ref.value);
        }

        match env.operation {
            SecurityOperation::Decipher => {
                if env.padding != Padding::Pkcs1 {
                    return Err(Error::InvalidArguments(
                        "deciphering requires PKCS#1 padding",
                    ));
                }
                data.put_slice(&[0x80, 0x01, 0x02]);
                self.executor
                    .execute(&ManageSecurityEnvCommand::set_decipher(data.freeze()))
                    .map_err(|e| self.surface(e.into()))?;
                Ok(())
            }
            SecurityOperation::Sign => {
                let prefix = data.clone();
                let token = if let Some(reference) = env.algorithm_reference {
                    Some(reference)
                } else if env.algorithm == Some(Algorithm::Rsa) {
                    match (env.padding, env.hash) {
                        (Padding::Pkcs1, HashAlgorithm::Sha1) => Some(0x12),
                        (Padding::Pkcs1, HashAlgorithm::Ripemd160) => Some(0x22),
                        (Padding::Pkcs1, HashAlgorithm::Md5) => Some(0x32),
                        (Padding::Iso9796, HashAlgorithm::Sha1) => Some(0x11),
                        (Padding::Iso9796, HashAlgorithm::Ripemd160) => Some(0x21),
                        _ => {
                            // COMPUTE SIGNATURE has no mode for this
                            // combination
                            return self.authenticate_fallback(env, prefix);
                        }
                    }
                } else {
                    None
                };
                if let Some(token) = token {
                    data.put_slice(&[0x80, 0x01, token]);
                }

                // the probe may legally fail; stay quiet while it runs
                let cmd = ManageSecurityEnvCommand::set_sign(data.freeze());
                let probe = {
                    let _quiet = ErrorSuppression::new(&self.suppress_errors);
                    self.executor.execute(&cmd)
                };
                match probe {
                    Ok(_) => {
                        self.crypto_env = CryptoState::SignNative;
                        Ok(())
                    }
                    Err(ManageSecurityEnvError::ResponseError(e)) => Err(Error::Core(e)),
                    Err(_) => {
                        debug!("COMPUTE SIGNATURE rejected, trying INTERNAL AUTHENTICATE");
                        self.authenticate_fallback(env, prefix)
                    }
                }
            }
            SecurityOperation::Authenticate => self.authenticate_fallback(env, data),
        }
    }

    /// Configure INTERNAL AUTHENTICATE as the signature operation.
    fn authenticate_fallback(
        &mut self,
        env: &SecurityEnvironment,
        mut data: BytesMut,
    ) -> Result<()> {
        if env.padding != Padding::Pkcs1 {
            return Err(Error::InvalidArguments(
                "INTERNAL AUTHENTICATE requires PKCS#1 padding",
            ));
        }
        data.put_slice(&[0x80, 0x01, 0x01]);
        self.executor
            .execute(&ManageSecurityEnvCommand::set_authenticate(data.freeze()))
            .map_err(|e| self.surface(e.into()))?;
        self.crypto_env = CryptoState::SignByAuthenticate { hash: env.hash };
        Ok(())
    }

    /// Execute the negotiated signature operation over `data`.
    ///
    /// The negotiated state is consumed on every exit path, success
    /// or failure.
    pub fn compute_signature(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let state = mem::replace(&mut self.crypto_env, CryptoState::Idle);

        if data.len() > self.profile.max_send_size {
            return Err(Error::InvalidArguments(
                "data exceeds the card's APDU window",
            ));
        }

        match state {
            CryptoState::Idle => Err(Error::InvalidArguments(
                "no signature operation negotiated",
            )),
            CryptoState::SignNative => {
                self.executor
                    .execute(&PutHashCommand::with_digest(data.to_vec()))
                    .map_err(|e| self.surface(e.into()))?;
                let ComputeSignatureOk::Signature { signature } = self
                    .executor
                    .execute(&ComputeSignatureCommand::over_loaded_digest())
                    .map_err(|e| self.surface(e.into()))?;
                Ok(signature)
            }
            CryptoState::SignByAuthenticate { hash } => {
                let block = digest_info::encode(hash, data)?;
                if block.len() > self.profile.max_send_size {
                    return Err(Error::InvalidArguments(
                        "encoded block exceeds the card's APDU window",
                    ));
                }
                let InternalAuthenticateOk::Signature { signature } = self
                    .executor
                    .execute(&InternalAuthenticateCommand::with_block(block))
                    .map_err(|e| self.surface(e.into()))?;
                Ok(signature)
            }
        }
    }

    //
    // Control multiplexer
    //

    /// Dispatch a tagged control request, the way hosts without a
    /// dedicated API surface drive the vendor operations.
    pub fn control(&mut self, request: ControlRequest) -> Result<ControlReply> {
        match request {
            ControlRequest::CreateFile(CreateData::MasterFile(data)) => {
                self.create_mf(&data).map(|_| ControlReply::Done)
            }
            ControlRequest::CreateFile(CreateData::DedicatedFile(data)) => {
                self.create_df(&data).map(|_| ControlReply::Done)
            }
            ControlRequest::CreateFile(CreateData::ElementaryFile(data)) => {
                self.create_ef(&data).map(|_| ControlReply::Done)
            }
            ControlRequest::CreateEnd(id) => self.create_end(id).map(|_| ControlReply::Done),
            ControlRequest::WriteKey(data) => self.write_key(&data).map(|_| ControlReply::Done),
            ControlRequest::GenerateKey(data) => self
                .generate_key_pair(data.key_id, data.modulus_bits)
                .map(ControlReply::Modulus),
            ControlRequest::EraseCard => self.erase_card().map(|_| ControlReply::Done),
            ControlRequest::SerialNumber => {
                self.serial_number().map(ControlReply::SerialNumber)
            }
        }
    }
}

impl<E: Executor> std::fmt::Debug for Starcos<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Starcos")
            .field("profile", &self.profile.name)
            .field("location", &self.location)
            .field("crypto_env", &self.crypto_env)
            .finish()
    }
}
