//! Common sign-in error and status types
//!
//! This module provides the error types shared by the credential store, the
//! sign-in controller and the status checker, plus the authorization states
//! reported by the identity provider.

use std::fmt;
use thiserror::Error;

/// Errors raised while signing in or handling stored credentials
///
/// None of these are fatal: every component logs the error where it happens
/// and falls back to a signed-out or "no verdict" state.
#[derive(Debug, Error)]
pub enum SignInError {
    /// The provider payload had no authorization code, or it was not UTF-8
    #[error("Authorization code missing or not valid UTF-8")]
    BadAuthorizationCode,
    /// The provider payload had no identity token, or it was not UTF-8
    #[error("Identity token missing or not valid UTF-8")]
    BadIdToken,
    /// A credential record could not be serialized
    #[error("Credential encoding failed: {0}")]
    Encoding(String),
    /// Stored bytes could not be deserialized into a credential record
    #[error("Credential decoding failed: {0}")]
    Decoding(String),
    /// Opaque error reported by the identity provider
    #[error("Identity provider error: {0}")]
    Provider(String),
    /// The provider reported a credential state this crate does not know
    #[error("Unknown authorization state: {0}")]
    UnknownAuthorizationState(i64),
    /// The provider returned a credential that is not an Apple ID credential
    #[error("Unsupported credential type: {0}")]
    UnsupportedCredential(String),
    /// A sign-in was started while another one is still pending
    #[error("A sign-in attempt is already in progress")]
    SignInInProgress,
    /// The pending sign-in was superseded by a sign-out or cancel
    #[error("The sign-in attempt was cancelled before it completed")]
    SignInAborted,
    /// Secure storage backend failure
    #[error("Secure storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Secure storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key names must be non-empty and free of path separators
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    /// Underlying I/O failure
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Encryption or decryption of a stored value failed
    #[error("Storage cryptography failed: {0}")]
    Crypto(String),
}

/// Raw credential state as reported by the identity provider
///
/// `Other` carries any state code the provider may add in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Authorized,
    Revoked,
    NotFound,
    Transferred,
    Other(i64),
}

/// Verdict of the status checker on a previously issued identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// The identity is still valid
    Authorized,
    /// The user revoked the app's access
    Revoked,
    /// The provider does not know this identity
    NotFound,
    /// The identity was transferred to another team
    Transferred,
    /// No verdict could be obtained; the reason is kept for logging
    Unknown(String),
}

impl AuthorizationStatus {
    /// Whether this status invalidates the stored credential
    ///
    /// `Unknown` never does: ambiguous or transient failures must not sign
    /// the user out.
    #[must_use]
    pub fn requires_sign_out(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::Revoked
                | AuthorizationStatus::NotFound
                | AuthorizationStatus::Transferred
        )
    }
}

impl From<CredentialState> for AuthorizationStatus {
    fn from(state: CredentialState) -> Self {
        match state {
            CredentialState::Authorized => AuthorizationStatus::Authorized,
            CredentialState::Revoked => AuthorizationStatus::Revoked,
            CredentialState::NotFound => AuthorizationStatus::NotFound,
            CredentialState::Transferred => AuthorizationStatus::Transferred,
            CredentialState::Other(code) => AuthorizationStatus::Unknown(
                SignInError::UnknownAuthorizationState(code).to_string(),
            ),
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationStatus::Authorized => write!(f, "authorized"),
            AuthorizationStatus::Revoked => write!(f, "revoked"),
            AuthorizationStatus::NotFound => write!(f, "not found"),
            AuthorizationStatus::Transferred => write!(f, "transferred"),
            AuthorizationStatus::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}
