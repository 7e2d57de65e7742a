// Centralized logging utilities for sign-in lifecycle events
use log::{debug, error, info, warn};

use crate::models::{AuthorizationStatus, CredentialRecord, SignInError};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a freshly built credential record; token values are never logged
    pub fn log_credential_received(record: &CredentialRecord) {
        info!("=== Apple ID Authorization Success ===");
        info!("User identifier: {}", record.user_identifier());
        info!("Email present: {}", record.email().is_some());
        info!("Full name present: {}", record.full_name().is_some());
        debug!(
            "Authorization code: {} bytes, identity token: {} bytes",
            record.authorization_code().len(),
            record.identity_token().len()
        );

        if record.account_details().is_empty() {
            warn!("Apple authorization returned no name or email");
            warn!("This is expected on subsequent sign-ins; Apple only sends them once");
        }
    }

    /// Log the start of an authorization request
    pub fn log_sign_in_started() {
        info!("🔄 Requesting Apple ID authorization (scopes: full name, email)");
    }

    /// Log a rejected overlapping sign-in attempt
    pub fn log_sign_in_in_progress() {
        warn!("⏭️  Sign-in already in progress, ignoring new request");
    }

    /// Log a failed or cancelled authorization
    pub fn log_sign_in_failed(err: &SignInError) {
        error!("❌ Apple sign-in failed: {err}");
    }

    /// Log a pending sign-in dropped after a sign-out or cancel
    pub fn log_sign_in_aborted() {
        info!("Apple sign-in superseded by sign-out, discarding provider result");
    }

    /// Log completion of sign-in
    pub fn log_sign_in_completed(user_id: &str, auto_sign_in: bool) {
        if auto_sign_in {
            info!("✅ Restored Apple sign-in for user: {user_id}");
        } else {
            info!("✅ Apple sign-in completed for user: {user_id}");
        }
    }

    /// Log sign-out or cancellation
    pub fn log_signed_out(cancel_only: bool) {
        if cancel_only {
            info!("Apple sign-in cancelled, stored credentials cleared");
        } else {
            info!("User signed out of Apple, stored credentials cleared");
        }
    }

    /// Log a launch-time sign-in flag without a stored credential
    pub fn log_missing_credentials_at_launch() {
        warn!("App reports a signed-in user but no Apple credentials are stored, signing out");
    }

    /// Log a status verdict dropped because the session changed meanwhile
    pub fn log_stale_status_check(user_id: &str) {
        debug!("Session changed during status check for {user_id}, verdict ignored");
    }

    /// Log the outcome of a status re-validation
    pub fn log_status_verdict(user_id: &str, status: &AuthorizationStatus) {
        if status.requires_sign_out() {
            warn!("🔒 Forcing sign-out of {user_id}: credential {status}");
        } else {
            debug!("Status check for {user_id}: {status}, no action");
        }
    }
}
