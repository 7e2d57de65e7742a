use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::apple::{join_full_name, AppleUserInfo, AppleUserName};

pub mod auth;

pub use auth::{AuthorizationStatus, CredentialState, SignInError, StorageError};

/// Scopes requested from the identity provider on every sign-in
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationScope {
    FullName,
    Email,
}

/// Scopes used by the sign-in controller
pub const REQUESTED_SCOPES: [AuthorizationScope; 2] =
    [AuthorizationScope::FullName, AuthorizationScope::Email];

/// Name components as handed over by the provider
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// Raw Apple ID credential delivered by the provider after authorization
///
/// Token fields are bytes because that is how the platform hands them over;
/// they only become strings once validated by
/// [`CredentialRecord::from_apple_id_credential`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppleIdCredential {
    pub user: String,
    pub authorization_code: Option<Vec<u8>>,
    pub identity_token: Option<Vec<u8>>,
    pub full_name: Option<PersonName>,
    pub email: Option<String>,
}

/// Credential returned by a completed provider authorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderCredential {
    /// The only kind this crate accepts
    AppleId(AppleIdCredential),
    /// Any other credential kind (password, single sign-on, ...)
    Unsupported(String),
}

/// Fields of a successful Apple authorization that are kept in secure storage
/// once the user is signed in
///
/// A record always carries both one-time artifacts: the authorization code
/// (exchanged server side for tokens) and the identity token (primary
/// authentication on the server). The provider does not resupply them on
/// later callbacks, so a record is only ever built from a fresh sign-in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    authorization_code: String,
    identity_token: String,
    user_identifier: String,
    first_name: Option<String>,
    last_name: Option<String>,
    full_name: Option<String>,
    email: Option<String>,
    #[serde(default = "Utc::now")]
    authenticated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a record, deriving `full_name` from the name components
    #[must_use]
    pub fn new(
        authorization_code: String,
        identity_token: String,
        user_identifier: String,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    ) -> Self {
        let full_name = join_full_name(first_name.as_deref(), last_name.as_deref());
        Self {
            authorization_code,
            identity_token,
            user_identifier,
            first_name,
            last_name,
            full_name,
            email,
            authenticated_at: Utc::now(),
        }
    }

    /// Validate a provider credential and turn it into a record
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The authorization code is missing or not UTF-8 (`BadAuthorizationCode`)
    /// - The identity token is missing or not UTF-8 (`BadIdToken`)
    pub fn from_apple_id_credential(credential: &AppleIdCredential) -> Result<Self, SignInError> {
        let authorization_code = credential
            .authorization_code
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .ok_or(SignInError::BadAuthorizationCode)?;

        let identity_token = credential
            .identity_token
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .ok_or(SignInError::BadIdToken)?;

        let name = credential.full_name.clone().unwrap_or_default();

        Ok(Self::new(
            authorization_code.to_string(),
            identity_token.to_string(),
            credential.user.clone(),
            name.given_name,
            name.family_name,
            credential.email.clone(),
        ))
    }

    #[must_use]
    pub fn authorization_code(&self) -> &str {
        &self.authorization_code
    }

    #[must_use]
    pub fn identity_token(&self) -> &str {
        &self.identity_token
    }

    #[must_use]
    pub fn user_identifier(&self) -> &str {
        &self.user_identifier
    }

    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    /// Name and email details in the shape the server expects
    #[must_use]
    pub fn account_details(&self) -> AppleUserInfo {
        AppleUserInfo {
            name: AppleUserName {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                full_name: self.full_name.clone(),
            },
            email: self.email.clone(),
        }
    }
}
