//! Credential Store - the single persisted credential record
//!
//! The store holds zero or one [`CredentialRecord`], JSON-encoded, under a
//! fixed key in a [`SecureStorage`] backend. Every failure is logged and read
//! as "no credential present" so a corrupt or unreadable value signs the user
//! out instead of crashing.

use std::sync::Arc;

use log::{debug, error};

use crate::models::{CredentialRecord, SignInError};
use crate::store::secure::SecureStorage;

/// Default storage key for the Apple credential record
pub const DEFAULT_CREDENTIALS_KEY: &str = "AppleSignIn.data";

/// Get/set access to the one stored credential record
///
/// No caching: each call round-trips through the backend.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn SecureStorage>,
    key: String,
}

impl CredentialStore {
    /// Create a store using [`DEFAULT_CREDENTIALS_KEY`]
    #[must_use]
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self::with_key(storage, DEFAULT_CREDENTIALS_KEY)
    }

    #[must_use]
    pub fn with_key(storage: Arc<dyn SecureStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored record, `None` when absent or unreadable
    #[must_use]
    pub fn get(&self) -> Option<CredentialRecord> {
        match self.try_get() {
            Ok(record) => record,
            Err(e) => {
                error!("Failed to load stored credentials: {e}");
                None
            }
        }
    }

    /// Replace the stored record; `None` deletes it
    pub fn set(&self, record: Option<&CredentialRecord>) {
        if let Err(e) = self.try_set(record) {
            error!("Failed to update stored credentials: {e}");
        }
    }

    /// Delete the stored record
    pub fn clear(&self) {
        self.set(None);
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.get().is_some()
    }

    /// Read and decode the stored record
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the bytes do not decode
    pub fn try_get(&self) -> Result<Option<CredentialRecord>, SignInError> {
        let Some(bytes) = self.storage.read(&self.key)? else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SignInError::Decoding(e.to_string()))
    }

    /// Encode and write (or delete) the record
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the backend write/delete fails
    pub fn try_set(&self, record: Option<&CredentialRecord>) -> Result<(), SignInError> {
        match record {
            Some(record) => {
                let bytes =
                    serde_json::to_vec(record).map_err(|e| SignInError::Encoding(e.to_string()))?;
                self.storage.write(&self.key, &bytes)?;
                debug!("Stored credentials for user {}", record.user_identifier());
            }
            None => {
                self.storage.delete(&self.key)?;
                debug!("Cleared stored credentials");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::secure::MemoryStorage;

    fn record() -> CredentialRecord {
        CredentialRecord::new(
            "auth-code".to_string(),
            "id-token".to_string(),
            "000123.user".to_string(),
            Some("A".to_string()),
            Some("B".to_string()),
            Some("a@b.com".to_string()),
        )
    }

    #[test]
    fn test_round_trip() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        let record = record();

        store.set(Some(&record));

        assert_eq!(store.get(), Some(record));
        assert!(store.has_credentials());
    }

    #[test]
    fn test_set_none_deletes() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        store.set(Some(&record()));

        store.set(None);
        assert_eq!(store.get(), None);

        // Clearing an empty store stays empty
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_replaced_wholesale() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        store.set(Some(&record()));

        let replacement = CredentialRecord::new(
            "code-2".to_string(),
            "token-2".to_string(),
            "000123.user".to_string(),
            None,
            None,
            None,
        );
        store.set(Some(&replacement));

        let stored = store.get().unwrap();
        assert_eq!(stored.authorization_code(), "code-2");
        assert_eq!(stored.email(), None);
    }

    #[test]
    fn test_corrupt_bytes_read_as_signed_out() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(DEFAULT_CREDENTIALS_KEY, b"not json").unwrap();
        let store = CredentialStore::new(storage);

        assert!(matches!(store.try_get(), Err(SignInError::Decoding(_))));
        assert_eq!(store.get(), None);
        assert!(!store.has_credentials());
    }

    #[test]
    fn test_invalid_key_is_logged_not_raised() {
        let store = CredentialStore::with_key(Arc::new(MemoryStorage::new()), "bad/key");

        store.set(Some(&record()));
        assert_eq!(store.get(), None);
        assert!(matches!(store.try_get(), Err(SignInError::Storage(_))));
    }
}
