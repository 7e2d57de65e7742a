//! Credential persistence
//!
//! - [`secure`] - Keychain-equivalent byte storage backends
//! - [`credential_store`] - JSON persistence of the single credential record

pub mod credential_store;
pub mod secure;

pub use credential_store::{CredentialStore, DEFAULT_CREDENTIALS_KEY};
pub use secure::{EncryptedFileStorage, MemoryStorage, SecureStorage};
