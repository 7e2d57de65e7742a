//! Sign in with Apple flow
//!
//! # Modules
//!
//! - [`controller`] - Sign-in state machine and credential lifecycle
//! - [`provider`] - Identity provider abstraction
//! - [`delegate`] - Lifecycle notifications to the app
//! - [`status`] - Re-validation of stored identities
//! - [`button`] - Sign-in button state and rendering model

pub mod button;
pub mod controller;
pub mod delegate;
pub mod provider;
pub mod status;

pub use button::{ButtonEvent, ButtonRender, ButtonState};
pub use controller::{SignInController, SignInState};
pub use delegate::{NoopDelegate, SignInDelegate};
pub use provider::AuthorizationProvider;
pub use status::AuthorizationStatusChecker;
