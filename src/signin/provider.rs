//! Identity provider abstraction
//!
//! The platform performs the actual Sign in with Apple consent flow; this
//! crate only sees its results through [`AuthorizationProvider`].

use async_trait::async_trait;

use crate::models::{AuthorizationScope, CredentialState, ProviderCredential, SignInError};

/// Platform identity provider
///
/// Each call completes exactly once. Implementations that receive results on
/// a platform callback typically bridge them through a oneshot channel.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Run an authorization request for the given scopes, presenting the
    /// provider's own UI
    ///
    /// # Errors
    ///
    /// Returns `SignInError::Provider` when the user cancels or the platform
    /// reports a failure
    async fn authorize(
        &self,
        scopes: &[AuthorizationScope],
    ) -> Result<ProviderCredential, SignInError>;

    /// Ask the provider for the current state of a previously issued identity
    ///
    /// # Errors
    ///
    /// Returns `SignInError::Provider` when the provider cannot answer
    async fn credential_state(&self, user_id: &str) -> Result<CredentialState, SignInError>;
}
