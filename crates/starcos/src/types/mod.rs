mod acl;
mod create;
mod fci;
mod file;
mod key;
mod path;
mod security_env;

pub use acl::{AccessCondition, FileAcl};
pub use create::{CreateData, DfData, EfData, MfData};
pub use fci::Fci;
pub use file::{Aid, EfStructure, FileDescriptor, FileId, FileKind};
pub use key::{GenerateKeyData, KeyHeader, WriteKeyData};
pub use path::{FilePath, SelectTarget};
pub use security_env::{
    Algorithm, HashAlgorithm, KeyReference, Padding, SecurityEnvironment, SecurityOperation,
};
