//! STARCOS SPK 2.3 command definitions
//!
//! This module contains the definitions of the ISO and vendor commands
//! the driver issues, using the apdu-macros system.

// Submodules
pub mod create_file;
pub mod erase_card;
pub mod generate_key;
pub mod get_card_data;
pub mod manage_security_env;
pub mod read_binary;
pub mod select;
pub mod sign;
pub mod write_key;

// Re-exports for convenience
pub use create_file::{CreateFileCommand, RegisterDfCommand};
pub use erase_card::EraseCardCommand;
pub use generate_key::{GenerateKeyPairCommand, ReadPublicKeyCommand};
pub use get_card_data::GetCardDataCommand;
pub use manage_security_env::ManageSecurityEnvCommand;
pub use read_binary::ReadBinaryCommand;
pub use select::SelectFileCommand;
pub use sign::{ComputeSignatureCommand, InternalAuthenticateCommand, PutHashCommand};
pub use write_key::WriteKeyCommand;

pub use create_file::{CreateFileError, CreateFileOk, RegisterDfError, RegisterDfOk};
pub use erase_card::{EraseCardError, EraseCardOk};
pub use generate_key::{
    GenerateKeyPairError, GenerateKeyPairOk, ReadPublicKeyError, ReadPublicKeyOk,
};
pub use get_card_data::{GetCardDataError, GetCardDataOk};
pub use manage_security_env::{ManageSecurityEnvError, ManageSecurityEnvOk};
pub use read_binary::{ReadBinaryError, ReadBinaryOk};
pub use select::{SelectFileError, SelectFileOk};
pub use sign::{
    ComputeSignatureError, ComputeSignatureOk, InternalAuthenticateError, InternalAuthenticateOk,
    PutHashError, PutHashOk,
};
pub use write_key::{WriteKeyError, WriteKeyOk};
