use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::store::{CredentialStore, EncryptedFileStorage, DEFAULT_CREDENTIALS_KEY};
use crate::utils::crypto::generate_secret;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SignInSettings {
    pub storage: StorageSettings,
    pub status_check: StatusCheckSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding the encrypted credential file
    pub directory: String,
    /// Name of the stored value inside the directory
    pub key: String,
    /// Secret the storage encryption key is derived from
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCheckSettings {
    pub enabled: bool,
    /// Seconds between re-validations of a signed-in identity
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: ".apple-signin".to_string(),
            key: DEFAULT_CREDENTIALS_KEY.to_string(),
            secret: String::new(), // Will be generated if empty
        }
    }
}

impl Default for StatusCheckSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SignInSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Self::initialize_environment();

        let mut settings = Self::load_base_settings()?;

        Self::apply_env_overrides(&mut settings);

        Ok(settings)
    }

    /// Load the .env file and initialize logging
    fn initialize_environment() {
        Self::load_env_file();
        if env_logger::try_init().is_err() {
            debug!("Logger already initialized, keeping existing logger");
        }
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `APPLE_SIGNIN_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml(&fs::read_to_string(&default_config_path)?)?;
            log::info!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("APPLE_SIGNIN_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml(&fs::read_to_string(&secrets_path)?)?;
                log::info!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "ℹ APPLE_SIGNIN_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse settings from TOML text; missing sections keep their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrongly typed values
    pub fn from_toml(content: &str) -> Result<Self, basic_toml::Error> {
        basic_toml::from_str(content)
    }

    /// Apply environment variable overrides to settings
    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_storage_env_overrides(&mut settings.storage);
        Self::apply_status_check_env_overrides(&mut settings.status_check);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for storage settings
    pub fn apply_storage_env_overrides(storage_settings: &mut StorageSettings) {
        if let Ok(directory) = std::env::var("APPLE_SIGNIN_STORAGE_DIR") {
            storage_settings.directory = directory;
        }
        if let Ok(key) = std::env::var("APPLE_SIGNIN_STORAGE_KEY") {
            storage_settings.key = key;
        }

        Self::handle_storage_secret_override(storage_settings);
    }

    /// Apply environment overrides for status check settings
    pub fn apply_status_check_env_overrides(status_settings: &mut StatusCheckSettings) {
        if let Ok(enabled_str) = std::env::var("STATUS_CHECK_ENABLED") {
            if let Ok(enabled) = enabled_str.parse::<bool>() {
                status_settings.enabled = enabled;
            }
        }
        if let Ok(interval_str) = std::env::var("STATUS_CHECK_INTERVAL_SECONDS") {
            if let Ok(interval) = interval_str.parse::<u64>() {
                status_settings.interval_seconds = interval;
            }
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Helper function to handle storage secret environment override and generation
    fn handle_storage_secret_override(storage_settings: &mut StorageSettings) {
        let env_secret_set = std::env::var("APPLE_SIGNIN_STORAGE_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                storage_settings.secret = secret;
                true
            }
        });

        if !env_secret_set && storage_settings.secret.is_empty() {
            storage_settings.secret = generate_secret();
            Self::warn_about_generated_secret();
        }
    }

    /// Display warnings about using a generated storage secret
    fn warn_about_generated_secret() {
        log::warn!("⚠️  Using auto-generated storage secret");
        log::warn!("🔒 Set APPLE_SIGNIN_STORAGE_SECRET or storage.secret in Settings.toml");
        log::warn!(
            "💡 Stored credentials become unreadable after restart unless the secret is configured"
        );
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Encrypted file backend for the configured directory and secret
    #[must_use]
    pub fn open_storage(&self) -> EncryptedFileStorage {
        EncryptedFileStorage::new(&self.storage.directory, self.storage.secret.as_bytes())
    }

    /// Credential store over [`Self::open_storage`]
    #[must_use]
    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::with_key(Arc::new(self.open_storage()), self.storage.key.clone())
    }

    /// Interval for the status monitor, `None` when disabled
    #[must_use]
    pub fn status_check_interval(&self) -> Option<Duration> {
        if self.status_check.enabled && self.status_check.interval_seconds > 0 {
            Some(Duration::from_secs(self.status_check.interval_seconds))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        std::env::remove_var("APPLE_SIGNIN_STORAGE_DIR");
        std::env::remove_var("APPLE_SIGNIN_STORAGE_KEY");
        std::env::remove_var("APPLE_SIGNIN_STORAGE_SECRET");
        std::env::remove_var("STATUS_CHECK_ENABLED");
        std::env::remove_var("STATUS_CHECK_INTERVAL_SECONDS");
        std::env::remove_var("APPLE_SIGNIN_SECRETS_DIR");
    }

    #[test]
    fn test_defaults() {
        let settings = SignInSettings::default();
        assert_eq!(settings.storage.key, "AppleSignIn.data");
        assert_eq!(settings.storage.secret, "");
        assert!(settings.status_check.enabled);
        assert_eq!(
            settings.status_check_interval(),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = SignInSettings::from_toml(
            r#"
            [storage]
            directory = "/var/lib/app/credentials"
            secret = "configured-secret"

            [status_check]
            interval_seconds = 600
            "#,
        )
        .unwrap();

        assert_eq!(settings.storage.directory, "/var/lib/app/credentials");
        assert_eq!(settings.storage.secret, "configured-secret");
        assert_eq!(settings.storage.key, "AppleSignIn.data");
        assert_eq!(settings.status_check_interval(), Some(Duration::from_secs(600)));
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_malformed_toml() {
        assert!(SignInSettings::from_toml("[status_check]\ninterval_seconds = \"soon\"").is_err());
    }

    #[test]
    fn test_disabled_status_check() {
        let mut settings = SignInSettings::default();
        settings.status_check.enabled = false;
        assert_eq!(settings.status_check_interval(), None);

        settings.status_check.enabled = true;
        settings.status_check.interval_seconds = 0;
        assert_eq!(settings.status_check_interval(), None);
    }

    #[test]
    #[serial]
    fn test_storage_env_override() {
        clean_env_vars();

        let mut storage_settings = StorageSettings {
            directory: "default-dir".to_string(),
            key: "AppleSignIn.data".to_string(),
            secret: "default-secret".to_string(),
        };

        std::env::set_var("APPLE_SIGNIN_STORAGE_DIR", "/tmp/override");
        std::env::set_var("APPLE_SIGNIN_STORAGE_SECRET", "env-override-secret");

        SignInSettings::apply_storage_env_overrides(&mut storage_settings);

        assert_eq!(storage_settings.directory, "/tmp/override");
        assert_eq!(storage_settings.secret, "env-override-secret");
        assert_eq!(storage_settings.key, "AppleSignIn.data"); // Should remain unchanged

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_storage_secret_auto_generation() {
        clean_env_vars();

        let mut first = StorageSettings::default();
        SignInSettings::apply_storage_env_overrides(&mut first);
        let mut second = StorageSettings::default();
        SignInSettings::apply_storage_env_overrides(&mut second);

        assert!(!first.secret.is_empty());
        assert_ne!(first.secret, second.secret);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_env_secret_is_ignored() {
        clean_env_vars();

        let mut storage_settings = StorageSettings {
            secret: "configured".to_string(),
            ..StorageSettings::default()
        };
        std::env::set_var("APPLE_SIGNIN_STORAGE_SECRET", "");

        SignInSettings::apply_storage_env_overrides(&mut storage_settings);
        assert_eq!(storage_settings.secret, "configured");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_status_check_env_override() {
        clean_env_vars();

        let mut status_settings = StatusCheckSettings::default();
        std::env::set_var("STATUS_CHECK_ENABLED", "false");
        std::env::set_var("STATUS_CHECK_INTERVAL_SECONDS", "120");

        SignInSettings::apply_status_check_env_overrides(&mut status_settings);

        assert!(!status_settings.enabled);
        assert_eq!(status_settings.interval_seconds, 120);

        // Unparseable values are ignored
        std::env::set_var("STATUS_CHECK_INTERVAL_SECONDS", "often");
        SignInSettings::apply_status_check_env_overrides(&mut status_settings);
        assert_eq!(status_settings.interval_seconds, 120);

        clean_env_vars();
    }

    #[test]
    fn test_credential_store_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = SignInSettings::default();
        settings.storage.directory = dir.path().display().to_string();
        settings.storage.secret = "secret".to_string();
        settings.storage.key = "Custom.data".to_string();

        let store = settings.credential_store();
        assert_eq!(store.key(), "Custom.data");
        assert_eq!(store.get(), None);
        assert_eq!(settings.open_storage().directory(), dir.path());
    }
}
