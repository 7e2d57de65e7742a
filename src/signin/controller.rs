//! Sign-In Controller - Apple sign-in state machine
//!
//! The controller drives the whole credential lifecycle:
//!
//! - **Sign-in**: requests authorization from the provider, validates the
//!   returned credential, persists the record and notifies the delegate
//! - **Sign-out / cancel**: clears the stored record and notifies the delegate
//! - **Launch restore**: re-validates a stored identity with the status
//!   checker before reporting the user as signed in again
//! - **Monitoring**: optionally re-validates on a fixed interval
//!
//! ## States
//!
//! `SignedOut → SigningIn → SignedIn`, with both end states re-enterable.
//! Overlapping sign-in attempts are rejected, and any failed attempt reverts
//! to `SignedOut` explicitly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::credentials::{AppleCredentials, GenericCredentials};
use crate::models::{
    AuthorizationStatus, CredentialRecord, ProviderCredential, SignInError, REQUESTED_SCOPES,
};
use crate::signin::button::{self, ButtonEvent, ButtonRender, ButtonState};
use crate::signin::delegate::{NoopDelegate, SignInDelegate};
use crate::signin::provider::AuthorizationProvider;
use crate::signin::status::AuthorizationStatusChecker;
use crate::store::CredentialStore;
use crate::utils::logging::LoggingHelper;

/// Where the controller is in the sign-in lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignInState {
    #[default]
    SignedOut,
    SigningIn,
    SignedIn,
}

/// Lifecycle state plus a counter bumped by every sign-in start and sign-out
///
/// Work that awaits the provider captures the generation first and only
/// applies its result if nothing else moved the lifecycle meanwhile.
#[derive(Debug, Clone, Copy, Default)]
struct StateCell {
    state: SignInState,
    generation: u64,
}

impl StateCell {
    fn advance(&mut self, state: SignInState) -> u64 {
        self.state = state;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

// =============================================================================
// Controller Structure
// =============================================================================

pub struct SignInController {
    provider: Arc<dyn AuthorizationProvider>,
    store: CredentialStore,
    status_checker: AuthorizationStatusChecker,
    delegate: Arc<dyn SignInDelegate>,
    state: Mutex<StateCell>,
}

// =============================================================================
// 1. Construction
// =============================================================================

impl SignInController {
    /// Create a signed-out controller with a no-op delegate
    #[must_use]
    pub fn new(provider: Arc<dyn AuthorizationProvider>, store: CredentialStore) -> Self {
        Self {
            status_checker: AuthorizationStatusChecker::new(Arc::clone(&provider)),
            provider,
            store,
            delegate: Arc::new(NoopDelegate),
            state: Mutex::new(StateCell::default()),
        }
    }

    /// Register the listener for lifecycle notifications
    #[must_use]
    pub fn with_delegate(mut self, delegate: Arc<dyn SignInDelegate>) -> Self {
        self.delegate = delegate;
        self
    }
}

// =============================================================================
// 2. State Access
// =============================================================================

impl SignInController {
    #[must_use]
    pub fn state(&self) -> SignInState {
        self.lock_state().state
    }

    #[must_use]
    pub fn user_is_signed_in(&self) -> bool {
        self.state() == SignInState::SignedIn
    }

    /// Session credentials rebuilt from the stored record
    #[must_use]
    pub fn credentials(&self) -> Option<AppleCredentials> {
        self.store.get().map(AppleCredentials::new)
    }

    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    #[must_use]
    pub fn button_state(&self) -> ButtonState {
        ButtonState::from(self.state())
    }

    #[must_use]
    pub fn button_render(&self) -> ButtonRender {
        button::render(self.state())
    }

    fn lock_state(&self) -> MutexGuard<'_, StateCell> {
        // The guarded value is plain Copy data, always consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generation(&self) -> u64 {
        self.lock_state().generation
    }
}

// =============================================================================
// 3. Sign-In Flow
// =============================================================================

impl SignInController {
    /// Run a full sign-in against the provider
    ///
    /// On success the new record replaces any stored one and the delegate
    /// receives `have_credentials` then `sign_in_completed(false)`. On any
    /// failure the stored record is left alone, the state reverts to
    /// `SignedOut` and the delegate receives `sign_in_cancelled`.
    ///
    /// A sign-out or cancel while the provider is still working supersedes
    /// the attempt: its result is dropped without touching the store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another sign-in is already pending (`SignInInProgress`, no state change)
    /// - The provider fails or the user cancels
    /// - The provider returns a non Apple ID credential
    /// - The credential lacks a usable authorization code or identity token
    /// - The record cannot be written to secure storage
    /// - The attempt was superseded by a sign-out or cancel (`SignInAborted`)
    pub async fn start_sign_in(&self) -> Result<(), SignInError> {
        let generation = {
            let mut cell = self.lock_state();
            if cell.state == SignInState::SigningIn {
                LoggingHelper::log_sign_in_in_progress();
                return Err(SignInError::SignInInProgress);
            }
            cell.advance(SignInState::SigningIn)
        };

        LoggingHelper::log_sign_in_started();
        self.delegate.sign_in_started();

        let outcome = self
            .provider
            .authorize(&REQUESTED_SCOPES)
            .await
            .and_then(Self::record_from_provider)
            .and_then(|record| self.accept_record(generation, record));

        match outcome {
            Ok(credentials) => {
                self.delegate.have_credentials(&credentials);
                self.complete_sign_in_process(credentials.user_id(), false);
                Ok(())
            }
            Err(SignInError::SignInAborted) => {
                LoggingHelper::log_sign_in_aborted();
                Err(SignInError::SignInAborted)
            }
            Err(e) => {
                LoggingHelper::log_sign_in_failed(&e);
                if self.revert_attempt(generation) {
                    self.delegate.sign_in_cancelled();
                }
                Err(e)
            }
        }
    }

    fn record_from_provider(
        credential: ProviderCredential,
    ) -> Result<CredentialRecord, SignInError> {
        match credential {
            ProviderCredential::AppleId(apple_id) => {
                CredentialRecord::from_apple_id_credential(&apple_id)
            }
            ProviderCredential::Unsupported(kind) => Err(SignInError::UnsupportedCredential(kind)),
        }
    }

    /// Persist the record of attempt `generation` and enter `SignedIn`
    ///
    /// The credentials handed back wrap the record that was written, never a
    /// re-read of the store.
    fn accept_record(
        &self,
        generation: u64,
        record: CredentialRecord,
    ) -> Result<AppleCredentials, SignInError> {
        let mut cell = self.lock_state();
        if cell.generation != generation || cell.state != SignInState::SigningIn {
            return Err(SignInError::SignInAborted);
        }

        LoggingHelper::log_credential_received(&record);
        self.store.try_set(Some(&record))?;
        cell.state = SignInState::SignedIn;

        Ok(AppleCredentials::new(record))
    }

    /// Back to `SignedOut` if attempt `generation` is still the current one
    fn revert_attempt(&self, generation: u64) -> bool {
        let mut cell = self.lock_state();
        if cell.generation == generation && cell.state == SignInState::SigningIn {
            cell.state = SignInState::SignedOut;
            true
        } else {
            false
        }
    }

    fn complete_sign_in_process(&self, user_id: &str, auto_sign_in: bool) {
        LoggingHelper::log_sign_in_completed(user_id, auto_sign_in);
        self.delegate.sign_in_completed(auto_sign_in);
    }

    /// Dispatch a button tap
    ///
    /// # Errors
    ///
    /// Returns the sign-in error for `SignInTapped`; sign-out cannot fail
    pub async fn handle_button_event(&self, event: ButtonEvent) -> Result<(), SignInError> {
        match event {
            ButtonEvent::SignInTapped => self.start_sign_in().await,
            ButtonEvent::SignOutTapped => {
                self.sign_out();
                Ok(())
            }
        }
    }
}

// =============================================================================
// 4. Sign-Out
// =============================================================================

impl SignInController {
    /// Clear the stored record and notify `user_is_signed_out`
    pub fn sign_out(&self) {
        self.sign_user_out(false);
    }

    /// Clear the stored record and notify `sign_in_cancelled`
    ///
    /// Also supersedes a sign-in that is still waiting on the provider.
    pub fn cancel_sign_in(&self) {
        self.sign_user_out(true);
    }

    fn sign_user_out(&self, cancel_only: bool) {
        {
            let mut cell = self.lock_state();
            self.store.clear();
            cell.advance(SignInState::SignedOut);
        }
        LoggingHelper::log_signed_out(cancel_only);

        if cancel_only {
            self.delegate.sign_in_cancelled();
        } else {
            self.delegate.user_is_signed_out();
        }
    }

    /// Sign out after an invalidating verdict for `user_id`
    ///
    /// Skipped when the lifecycle moved since `generation` was read or the
    /// store no longer holds that user. `user_is_signed_out` fires when the
    /// user was signed in, or always with `notify_always`.
    fn sign_out_checked(&self, generation: u64, user_id: &str, notify_always: bool) -> bool {
        let was_signed_in = {
            let mut cell = self.lock_state();
            let still_current = cell.generation == generation
                && cell.state != SignInState::SigningIn
                && self
                    .store
                    .get()
                    .is_some_and(|record| record.user_identifier() == user_id);
            if !still_current {
                LoggingHelper::log_stale_status_check(user_id);
                return false;
            }

            self.store.clear();
            let was_signed_in = cell.state == SignInState::SignedIn;
            cell.advance(SignInState::SignedOut);
            was_signed_in
        };
        LoggingHelper::log_signed_out(false);

        if was_signed_in || notify_always {
            self.delegate.user_is_signed_out();
        }
        true
    }
}

// =============================================================================
// 5. Launch Restore & Re-validation
// =============================================================================

impl SignInController {
    /// Restore a previous sign-in at app launch
    ///
    /// `user_signed_in` is the app's own record of whether this method was
    /// signed in when it last ran. Nothing happens when it is false.
    pub async fn app_launch_setup(&self, user_signed_in: bool) -> SignInState {
        if !user_signed_in {
            return self.state();
        }

        let generation = self.generation();
        let Some(record) = self.store.get() else {
            // No point keeping a signed-in flag without credentials
            LoggingHelper::log_missing_credentials_at_launch();
            self.sign_user_out(false);
            return self.state();
        };

        let status = self
            .status_checker
            .check_status(record.user_identifier())
            .await;
        LoggingHelper::log_status_verdict(record.user_identifier(), &status);

        if status.requires_sign_out() {
            self.sign_out_checked(generation, record.user_identifier(), true);
            return self.state();
        }

        {
            let mut cell = self.lock_state();
            if cell.generation != generation {
                LoggingHelper::log_stale_status_check(record.user_identifier());
                return cell.state;
            }
            cell.state = SignInState::SignedIn;
        }

        let credentials = AppleCredentials::new(record);
        self.delegate.have_credentials(&credentials);
        self.complete_sign_in_process(credentials.user_id(), true);
        self.state()
    }

    /// Re-check the stored identity with the provider
    ///
    /// Signs out on `Revoked`, `NotFound` or `Transferred`, unless a sign-in
    /// or sign-out happened while the provider was answering. When the
    /// controller is not signed in the record is cleared without notifying
    /// the delegate. Returns `None` when no record is stored.
    pub async fn revalidate(&self) -> Option<AuthorizationStatus> {
        let generation = self.generation();
        let record = self.store.get()?;
        let status = self
            .status_checker
            .check_status(record.user_identifier())
            .await;
        LoggingHelper::log_status_verdict(record.user_identifier(), &status);

        if status.requires_sign_out() {
            self.sign_out_checked(generation, record.user_identifier(), false);
        }

        Some(status)
    }

    /// Re-validate every `interval` while signed in
    ///
    /// The task holds only a weak reference and ends once the controller is
    /// dropped.
    #[must_use]
    pub fn spawn_status_monitor(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let controller = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if controller.user_is_signed_in() {
                    controller.revalidate().await;
                }
            }
        })
    }
}

impl std::fmt::Debug for SignInController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInController")
            .field("state", &self.state())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
