//! Sign-in button model
//!
//! The button itself is drawn by the app. This module only decides what it
//! should show and which event a tap produces.

use crate::signin::controller::SignInState;

/// What the button offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    SignIn,
    SignOut,
}

/// UI-originated events forwarded to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    SignInTapped,
    SignOutTapped,
}

/// Everything the app needs to draw the button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonRender {
    pub label: &'static str,
    pub event: ButtonEvent,
    pub enabled: bool,
}

impl From<SignInState> for ButtonState {
    fn from(state: SignInState) -> Self {
        match state {
            SignInState::SignedIn => ButtonState::SignOut,
            SignInState::SignedOut | SignInState::SigningIn => ButtonState::SignIn,
        }
    }
}

/// Pure mapping from controller state to button appearance
#[must_use]
pub fn render(state: SignInState) -> ButtonRender {
    match ButtonState::from(state) {
        ButtonState::SignIn => ButtonRender {
            label: "Sign in with Apple",
            event: ButtonEvent::SignInTapped,
            // No second request while one is pending
            enabled: state != SignInState::SigningIn,
        },
        ButtonState::SignOut => ButtonRender {
            label: "Sign out",
            event: ButtonEvent::SignOutTapped,
            enabled: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_signed_out() {
        let render = render(SignInState::SignedOut);
        assert_eq!(render.event, ButtonEvent::SignInTapped);
        assert!(render.enabled);
    }

    #[test]
    fn test_render_signing_in_is_disabled() {
        let render = render(SignInState::SigningIn);
        assert_eq!(render.event, ButtonEvent::SignInTapped);
        assert!(!render.enabled);
    }

    #[test]
    fn test_render_signed_in() {
        let render = render(SignInState::SignedIn);
        assert_eq!(render.label, "Sign out");
        assert_eq!(render.event, ButtonEvent::SignOutTapped);
        assert_eq!(ButtonState::from(SignInState::SignedIn), ButtonState::SignOut);
    }
}
