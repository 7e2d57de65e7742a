//! Test fixtures providing pre-built test objects

use std::path::Path;
use std::sync::Arc;

use crate::models::{CredentialRecord, ProviderCredential};
use crate::signin::SignInController;
use crate::store::{CredentialStore, EncryptedFileStorage, MemoryStorage};

use super::builders::TestCredentialBuilder;
use super::constants::TEST_STORAGE_SECRET;
use super::mock::{MockAuthorizationProvider, RecordingDelegate};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// A complete first-time provider credential
    #[must_use]
    pub fn provider_credential() -> ProviderCredential {
        TestCredentialBuilder::new().build_provider_credential()
    }

    /// A record built from [`Self::provider_credential`]
    ///
    /// # Panics
    ///
    /// Panics if the fixture credential stops being valid
    #[must_use]
    pub fn credential_record() -> CredentialRecord {
        CredentialRecord::from_apple_id_credential(&TestCredentialBuilder::new().build())
            .expect("fixture credential is valid")
    }

    /// An empty store over in-memory storage
    #[must_use]
    pub fn memory_store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryStorage::new()))
    }

    /// A store over encrypted files in `directory`
    #[must_use]
    pub fn encrypted_store(directory: &Path) -> CredentialStore {
        CredentialStore::new(Arc::new(EncryptedFileStorage::new(
            directory,
            TEST_STORAGE_SECRET,
        )))
    }

    /// Controller wired to a mock provider, a recording delegate and `store`
    #[must_use]
    pub fn controller(
        store: CredentialStore,
    ) -> (
        Arc<SignInController>,
        Arc<MockAuthorizationProvider>,
        Arc<RecordingDelegate>,
    ) {
        let provider = Arc::new(MockAuthorizationProvider::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let controller =
            SignInController::new(provider.clone(), store).with_delegate(delegate.clone());
        (Arc::new(controller), provider, delegate)
    }
}
