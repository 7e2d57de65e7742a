//! Secure key/value storage backends
//!
//! [`SecureStorage`] is the keychain-equivalent the credential store writes
//! through. Values are opaque bytes addressed by a short key name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use crate::models::StorageError;
use crate::utils::crypto::{
    decrypt_bytes, derive_encryption_key, encrypt_bytes, ENCRYPTION_KEY_SIZE,
};

/// App-scoped persistent byte storage
pub trait SecureStorage: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails
    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove the value under `key`; removing a missing key succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the backend fails
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Process-lifetime storage, mostly useful for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a consistent map: every operation is a
        // single insert/remove.
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SecureStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.values().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.values().remove(key);
        Ok(())
    }
}

// =============================================================================
// Encrypted file backend
// =============================================================================

/// File-per-key storage encrypted with AES-256-GCM
///
/// Each value lives in `<directory>/<key>` as base64url `nonce || ciphertext`.
/// Writes land in a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written value.
pub struct EncryptedFileStorage {
    directory: PathBuf,
    encryption_key: [u8; ENCRYPTION_KEY_SIZE],
}

impl EncryptedFileStorage {
    /// Create a backend rooted at `directory`, keyed from `secret`
    ///
    /// The directory is created on first write.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, secret: &[u8]) -> Self {
        Self {
            directory: directory.into(),
            encryption_key: derive_encryption_key(secret),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.directory.join(key))
    }
}

impl std::fmt::Debug for EncryptedFileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStorage")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl SecureStorage for EncryptedFileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        decrypt_bytes(&contents, &self.encryption_key)
            .map(Some)
            .map_err(|e| StorageError::Crypto(format!("{e:#}")))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let encrypted = encrypt_bytes(value, &self.encryption_key)
            .map_err(|e| StorageError::Crypto(format!("{e:#}")))?;

        fs::create_dir_all(&self.directory)?;
        let temp_path = self.directory.join(format!(".{key}.tmp"));
        fs::write(&temp_path, encrypted.as_bytes())?;
        fs::rename(&temp_path, &path)?;

        debug!("Wrote encrypted value for {key} to {}", path.display());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_read_write_delete() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.read("AppleSignIn.data").unwrap(), None);

        storage.write("AppleSignIn.data", b"value").unwrap();
        assert_eq!(
            storage.read("AppleSignIn.data").unwrap(),
            Some(b"value".to_vec())
        );

        storage.delete("AppleSignIn.data").unwrap();
        assert_eq!(storage.read("AppleSignIn.data").unwrap(), None);

        // Deleting twice is fine
        storage.delete("AppleSignIn.data").unwrap();
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let storage = MemoryStorage::new();
        for key in ["", "../escape", "nested/key", "..", "back\\slash"] {
            assert!(
                matches!(storage.write(key, b"x"), Err(StorageError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_file_storage_encrypts_at_rest() {
        let dir = tempfile::tempdir().unwrap();
        let storage = EncryptedFileStorage::new(dir.path(), b"secret");

        storage.write("AppleSignIn.data", b"plain credential").unwrap();

        let on_disk = fs::read_to_string(dir.path().join("AppleSignIn.data")).unwrap();
        assert!(!on_disk.contains("plain credential"));
        assert_eq!(
            storage.read("AppleSignIn.data").unwrap(),
            Some(b"plain credential".to_vec())
        );
    }

    #[test]
    fn test_file_storage_missing_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = EncryptedFileStorage::new(dir.path().join("not-yet-created"), b"secret");

        assert_eq!(storage.read("AppleSignIn.data").unwrap(), None);
        storage.delete("AppleSignIn.data").unwrap();
    }

    #[test]
    fn test_file_storage_wrong_secret() {
        let dir = tempfile::tempdir().unwrap();
        EncryptedFileStorage::new(dir.path(), b"secret")
            .write("AppleSignIn.data", b"value")
            .unwrap();

        let other = EncryptedFileStorage::new(dir.path(), b"different");
        assert!(matches!(
            other.read("AppleSignIn.data"),
            Err(StorageError::Crypto(_))
        ));
    }

    #[test]
    fn test_file_storage_overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = EncryptedFileStorage::new(dir.path(), b"secret");

        storage.write("AppleSignIn.data", b"first").unwrap();
        storage.write("AppleSignIn.data", b"second").unwrap();

        assert_eq!(
            storage.read("AppleSignIn.data").unwrap(),
            Some(b"second".to_vec())
        );
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
    }
}
