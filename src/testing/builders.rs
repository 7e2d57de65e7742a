//! Fluent builder for provider credentials

use crate::models::{AppleIdCredential, PersonName, ProviderCredential};

use super::constants::{
    TEST_AUTHORIZATION_CODE, TEST_EMAIL, TEST_FIRST_NAME, TEST_IDENTITY_TOKEN, TEST_LAST_NAME,
    TEST_USER_IDENTIFIER,
};

/// Builder for Apple ID credentials as the provider would deliver them
pub struct TestCredentialBuilder {
    credential: AppleIdCredential,
}

impl TestCredentialBuilder {
    /// Create a builder for a complete first-time authorization
    #[must_use]
    pub fn new() -> Self {
        Self {
            credential: AppleIdCredential {
                user: TEST_USER_IDENTIFIER.to_string(),
                authorization_code: Some(TEST_AUTHORIZATION_CODE.as_bytes().to_vec()),
                identity_token: Some(TEST_IDENTITY_TOKEN.as_bytes().to_vec()),
                full_name: Some(PersonName {
                    given_name: Some(TEST_FIRST_NAME.to_string()),
                    family_name: Some(TEST_LAST_NAME.to_string()),
                }),
                email: Some(TEST_EMAIL.to_string()),
            },
        }
    }

    /// Create a builder for a repeat authorization (no name, no email)
    #[must_use]
    pub fn returning_user() -> Self {
        Self::new().without_name().without_email()
    }

    #[must_use]
    pub fn with_user(mut self, user: &str) -> Self {
        self.credential.user = user.to_string();
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.credential.email = Some(email.to_string());
        self
    }

    #[must_use]
    pub fn without_email(mut self) -> Self {
        self.credential.email = None;
        self
    }

    #[must_use]
    pub fn without_name(mut self) -> Self {
        self.credential.full_name = None;
        self
    }

    #[must_use]
    pub fn with_authorization_code(mut self, code: Option<&[u8]>) -> Self {
        self.credential.authorization_code = code.map(<[u8]>::to_vec);
        self
    }

    #[must_use]
    pub fn with_identity_token(mut self, token: Option<&[u8]>) -> Self {
        self.credential.identity_token = token.map(<[u8]>::to_vec);
        self
    }

    #[must_use]
    pub fn build(self) -> AppleIdCredential {
        self.credential
    }

    #[must_use]
    pub fn build_provider_credential(self) -> ProviderCredential {
        ProviderCredential::AppleId(self.credential)
    }
}

impl Default for TestCredentialBuilder {
    fn default() -> Self {
        Self::new()
    }
}
