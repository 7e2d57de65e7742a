//! Sign-in lifecycle notifications

use crate::credentials::GenericCredentials;

/// Receives sign-in state transitions from the controller
///
/// Every method defaults to doing nothing so listeners only implement what
/// they care about.
pub trait SignInDelegate: Send + Sync {
    /// Credentials are available, either freshly signed in or restored
    fn have_credentials(&self, _credentials: &dyn GenericCredentials) {}

    /// An authorization request was issued
    fn sign_in_started(&self) {}

    /// Sign-in finished; `auto_sign_in` is true when restored at app launch
    fn sign_in_completed(&self, _auto_sign_in: bool) {}

    /// A sign-in attempt failed or was cancelled
    fn sign_in_cancelled(&self) {}

    /// The user was signed out
    fn user_is_signed_out(&self) {}
}

/// Delegate that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDelegate;

impl SignInDelegate for NoopDelegate {}
