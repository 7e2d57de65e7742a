//! Authorization Status Checker
//!
//! Asks the provider whether a stored identity is still valid and turns the
//! answer into an [`AuthorizationStatus`]. Provider errors and unrecognized
//! states become `Unknown` so a flaky check never signs anyone out.

use std::sync::Arc;

use log::{info, warn};

use crate::models::AuthorizationStatus;
use crate::signin::provider::AuthorizationProvider;

#[derive(Clone)]
pub struct AuthorizationStatusChecker {
    provider: Arc<dyn AuthorizationProvider>,
}

impl AuthorizationStatusChecker {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self { provider }
    }

    /// Query the provider for the status of `user_id`
    pub async fn check_status(&self, user_id: &str) -> AuthorizationStatus {
        let status = match self.provider.credential_state(user_id).await {
            Ok(state) => AuthorizationStatus::from(state),
            Err(e) => AuthorizationStatus::Unknown(e.to_string()),
        };

        match &status {
            AuthorizationStatus::Authorized => {
                info!("Apple ID credential for {user_id} is still authorized");
            }
            AuthorizationStatus::Unknown(reason) => {
                warn!("Could not determine Apple ID credential state for {user_id}: {reason}");
            }
            invalid => {
                warn!("Apple ID credential for {user_id} is no longer valid: {invalid}");
            }
        }

        status
    }
}

impl std::fmt::Debug for AuthorizationStatusChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationStatusChecker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorizationScope, CredentialState, ProviderCredential, SignInError};
    use async_trait::async_trait;

    struct FixedStateProvider(Result<CredentialState, String>);

    #[async_trait]
    impl AuthorizationProvider for FixedStateProvider {
        async fn authorize(
            &self,
            _scopes: &[AuthorizationScope],
        ) -> Result<ProviderCredential, SignInError> {
            Err(SignInError::Provider("not used".to_string()))
        }

        async fn credential_state(&self, _user_id: &str) -> Result<CredentialState, SignInError> {
            self.0.clone().map_err(SignInError::Provider)
        }
    }

    async fn status_for(answer: Result<CredentialState, String>) -> AuthorizationStatus {
        AuthorizationStatusChecker::new(Arc::new(FixedStateProvider(answer)))
            .check_status("000123.user")
            .await
    }

    #[tokio::test]
    async fn test_known_states() {
        assert_eq!(
            status_for(Ok(CredentialState::Authorized)).await,
            AuthorizationStatus::Authorized
        );
        assert_eq!(
            status_for(Ok(CredentialState::Revoked)).await,
            AuthorizationStatus::Revoked
        );
        assert_eq!(
            status_for(Ok(CredentialState::NotFound)).await,
            AuthorizationStatus::NotFound
        );
        assert_eq!(
            status_for(Ok(CredentialState::Transferred)).await,
            AuthorizationStatus::Transferred
        );
    }

    #[tokio::test]
    async fn test_provider_error_is_unknown() {
        let status = status_for(Err("network down".to_string())).await;
        assert!(
            matches!(status, AuthorizationStatus::Unknown(ref r) if r.contains("network down"))
        );
        assert!(!status.requires_sign_out());
    }

    #[tokio::test]
    async fn test_future_state_is_unknown() {
        let status = status_for(Ok(CredentialState::Other(42))).await;
        assert!(matches!(status, AuthorizationStatus::Unknown(_)));
    }
}
