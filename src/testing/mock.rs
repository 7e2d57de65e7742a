//! Mock objects and fake implementations for testing
//!
//! This module provides a scripted identity provider and a delegate that
//! records every notification, for isolated tests of the sign-in flow.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::credentials::GenericCredentials;
use crate::models::{AuthorizationScope, CredentialState, ProviderCredential, SignInError};
use crate::signin::{AuthorizationProvider, SignInDelegate};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identity provider answering from a script
///
/// Authorizations are consumed in push order; with nothing scripted,
/// `authorize` fails as if the user cancelled. The credential state answer
/// stays the same until changed and defaults to `Authorized`.
pub struct MockAuthorizationProvider {
    authorizations: Mutex<VecDeque<Result<ProviderCredential, String>>>,
    credential_state: Mutex<Result<CredentialState, String>>,
    requested_scopes: Mutex<Vec<AuthorizationScope>>,
    authorize_calls: AtomicUsize,
    state_calls: AtomicUsize,
}

impl MockAuthorizationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            authorizations: Mutex::new(VecDeque::new()),
            credential_state: Mutex::new(Ok(CredentialState::Authorized)),
            requested_scopes: Mutex::new(Vec::new()),
            authorize_calls: AtomicUsize::new(0),
            state_calls: AtomicUsize::new(0),
        }
    }

    /// Script a successful authorization
    pub fn push_authorization(&self, credential: ProviderCredential) {
        lock(&self.authorizations).push_back(Ok(credential));
    }

    /// Script a failed authorization (user cancel, platform error)
    pub fn push_failure(&self, message: &str) {
        lock(&self.authorizations).push_back(Err(message.to_string()));
    }

    /// Answer every status check with `state`
    pub fn set_credential_state(&self, state: CredentialState) {
        *lock(&self.credential_state) = Ok(state);
    }

    /// Fail every status check with `message`
    pub fn fail_credential_state(&self, message: &str) {
        *lock(&self.credential_state) = Err(message.to_string());
    }

    #[must_use]
    pub fn authorize_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn state_calls(&self) -> usize {
        self.state_calls.load(Ordering::SeqCst)
    }

    /// Scopes passed to the most recent `authorize` call
    #[must_use]
    pub fn requested_scopes(&self) -> Vec<AuthorizationScope> {
        lock(&self.requested_scopes).clone()
    }
}

impl Default for MockAuthorizationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthorizationProvider for MockAuthorizationProvider {
    async fn authorize(
        &self,
        scopes: &[AuthorizationScope],
    ) -> Result<ProviderCredential, SignInError> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.requested_scopes) = scopes.to_vec();

        let next = lock(&self.authorizations).pop_front();
        match next {
            Some(Ok(credential)) => Ok(credential),
            Some(Err(message)) => Err(SignInError::Provider(message)),
            None => Err(SignInError::Provider(
                "The user canceled the authorization attempt".to_string(),
            )),
        }
    }

    async fn credential_state(&self, _user_id: &str) -> Result<CredentialState, SignInError> {
        self.state_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.credential_state)
            .clone()
            .map_err(SignInError::Provider)
    }
}

/// A delegate notification, in the order received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegateEvent {
    HaveCredentials { user_id: String },
    SignInStarted,
    SignInCompleted { auto_sign_in: bool },
    SignInCancelled,
    UserIsSignedOut,
}

/// Delegate recording every notification
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<DelegateEvent>>,
}

impl RecordingDelegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<DelegateEvent> {
        lock(&self.events).clone()
    }

    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    fn record(&self, event: DelegateEvent) {
        lock(&self.events).push(event);
    }
}

impl SignInDelegate for RecordingDelegate {
    fn have_credentials(&self, credentials: &dyn GenericCredentials) {
        self.record(DelegateEvent::HaveCredentials {
            user_id: credentials.user_id().to_string(),
        });
    }

    fn sign_in_started(&self) {
        self.record(DelegateEvent::SignInStarted);
    }

    fn sign_in_completed(&self, auto_sign_in: bool) {
        self.record(DelegateEvent::SignInCompleted { auto_sign_in });
    }

    fn sign_in_cancelled(&self) {
        self.record(DelegateEvent::SignInCancelled);
    }

    fn user_is_signed_out(&self) {
        self.record(DelegateEvent::UserIsSignedOut);
    }
}
