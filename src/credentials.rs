//! Session credentials exposed to the app's networking layer
//!
//! [`GenericCredentials`] is the interface any sign-in method hands to the
//! code that talks to the authentication server. [`AppleCredentials`] is the
//! Sign in with Apple implementation, a read-only view over the stored
//! [`CredentialRecord`].

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, error};

use crate::models::{CredentialRecord, SignInError};
use crate::utils::headers::{
    redacted_header_summary, ACCESS_TOKEN_HEADER, ACCOUNT_DETAILS_HEADER,
    APPLE_SIGN_IN_TOKEN_TYPE, AUTHORIZATION_CODE_HEADER, TOKEN_TYPE_HEADER,
};

/// Name of this sign-in method as shown to users and in logs
pub const APPLE_SIGN_IN_NAME: &str = "Apple";

/// Credentials produced by a sign-in method
#[async_trait]
pub trait GenericCredentials: Send + Sync {
    /// Headers to attach to requests against the authentication server
    fn http_request_headers(&self) -> HashMap<String, String>;

    /// Stable identifier of the user at the identity provider
    fn user_id(&self) -> &str;

    /// The user's name, when known
    fn username(&self) -> Option<&str>;

    /// Best label to show for the signed-in user
    fn display_name(&self) -> Option<&str>;

    /// Refresh short-lived credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh cannot be completed
    async fn refresh_credentials(&self) -> Result<(), SignInError>;
}

/// Sign in with Apple credentials built from the stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppleCredentials {
    record: CredentialRecord,
}

impl AppleCredentials {
    #[must_use]
    pub fn new(record: CredentialRecord) -> Self {
        Self { record }
    }

    #[must_use]
    pub fn record(&self) -> &CredentialRecord {
        &self.record
    }

    #[must_use]
    pub fn sign_in_name(&self) -> &'static str {
        APPLE_SIGN_IN_NAME
    }
}

impl From<CredentialRecord> for AppleCredentials {
    fn from(record: CredentialRecord) -> Self {
        Self::new(record)
    }
}

#[async_trait]
impl GenericCredentials for AppleCredentials {
    fn http_request_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::with_capacity(4);

        headers.insert(
            TOKEN_TYPE_HEADER.to_string(),
            APPLE_SIGN_IN_TOKEN_TYPE.to_string(),
        );
        headers.insert(
            ACCESS_TOKEN_HEADER.to_string(),
            self.record.identity_token().to_string(),
        );
        headers.insert(
            AUTHORIZATION_CODE_HEADER.to_string(),
            self.record.authorization_code().to_string(),
        );

        match self.record.account_details().to_json() {
            Ok(details) => {
                headers.insert(ACCOUNT_DETAILS_HEADER.to_string(), details);
            }
            Err(e) => error!("Failed to encode account details header: {e}"),
        }

        debug!("Apple request headers:\n{}", redacted_header_summary(&headers));
        headers
    }

    fn user_id(&self) -> &str {
        self.record.user_identifier()
    }

    fn username(&self) -> Option<&str> {
        self.record.full_name()
    }

    fn display_name(&self) -> Option<&str> {
        self.record.email().or_else(|| self.record.full_name())
    }

    /// Identity tokens cannot be refreshed on the client; a new token needs a
    /// full sign-in, so this always succeeds without doing anything.
    async fn refresh_credentials(&self) -> Result<(), SignInError> {
        Ok(())
    }
}
