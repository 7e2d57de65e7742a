use std::fs;

use apple_signin::store::DEFAULT_CREDENTIALS_KEY;
use apple_signin::testing::constants::TEST_USER_IDENTIFIER;
use apple_signin::testing::TestFixtures;
use apple_signin::{CredentialStore, EncryptedFileStorage, SecureStorage};
use std::sync::Arc;

/// Records persisted to disk survive a new store instance
#[test]
fn test_encrypted_store_survives_restart() {
    let dir = tempfile::tempdir().expect("temp dir");
    let record = TestFixtures::credential_record();

    TestFixtures::encrypted_store(dir.path()).set(Some(&record));

    let reopened = TestFixtures::encrypted_store(dir.path());
    assert_eq!(reopened.get(), Some(record));
}

/// Nothing readable about the user is written in the clear
#[test]
fn test_credentials_encrypted_at_rest() {
    let dir = tempfile::tempdir().expect("temp dir");
    TestFixtures::encrypted_store(dir.path()).set(Some(&TestFixtures::credential_record()));

    let on_disk = fs::read_to_string(dir.path().join(DEFAULT_CREDENTIALS_KEY)).unwrap();
    assert!(!on_disk.contains(TEST_USER_IDENTIFIER));
    assert!(!on_disk.contains("identityToken"));
}

/// A different secret cannot read the record and reports signed out
#[test]
fn test_wrong_secret_reads_as_signed_out() {
    let dir = tempfile::tempdir().expect("temp dir");
    TestFixtures::encrypted_store(dir.path()).set(Some(&TestFixtures::credential_record()));

    let other = CredentialStore::new(Arc::new(EncryptedFileStorage::new(
        dir.path(),
        b"some-other-secret",
    )));
    assert!(other.get().is_none());
    assert!(other.try_get().is_err());
}

#[test]
fn test_tampered_file_reads_as_signed_out() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = TestFixtures::encrypted_store(dir.path());
    store.set(Some(&TestFixtures::credential_record()));

    let path = dir.path().join(DEFAULT_CREDENTIALS_KEY);
    let mut contents = fs::read_to_string(&path).unwrap();
    let last = contents.pop().unwrap();
    contents.push(if last == 'A' { 'B' } else { 'A' });
    fs::write(&path, contents).unwrap();

    assert!(store.get().is_none());
}

#[test]
fn test_clear_removes_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = TestFixtures::encrypted_store(dir.path());
    store.set(Some(&TestFixtures::credential_record()));
    assert!(dir.path().join(DEFAULT_CREDENTIALS_KEY).exists());

    store.clear();

    assert!(!dir.path().join(DEFAULT_CREDENTIALS_KEY).exists());
    assert!(store.get().is_none());
}

/// Valid JSON of the wrong shape is treated like any other decode failure
#[test]
fn test_foreign_json_reads_as_signed_out() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = Arc::new(EncryptedFileStorage::new(dir.path(), b"secret"));
    storage
        .write(DEFAULT_CREDENTIALS_KEY, br#"{"userIdentifier": 42}"#)
        .unwrap();

    let store = CredentialStore::new(storage);
    assert!(store.get().is_none());
}
