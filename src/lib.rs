#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the apple-signin library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod credentials;
pub mod models;
pub mod settings;
pub mod signin;
pub mod store;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use credentials::{AppleCredentials, GenericCredentials};
pub use models::{
    AppleIdCredential, AuthorizationStatus, CredentialRecord, CredentialState, PersonName,
    ProviderCredential, SignInError,
};
pub use settings::SignInSettings;
pub use signin::{AuthorizationProvider, SignInController, SignInDelegate, SignInState};
pub use store::{CredentialStore, EncryptedFileStorage, MemoryStorage, SecureStorage};
