//! HTTP header names shared with the authentication server
//!
//! The server picks its credential plugin from the token type header and
//! reads the remaining values by these fixed names.

use std::collections::HashMap;

// ===============================
// HEADER NAMES
// ===============================

/// Header naming the sign-in method that produced the token
pub const TOKEN_TYPE_HEADER: &str = "X-token-type";

/// Header carrying the identity token
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// Header carrying the one-time authorization code
pub const AUTHORIZATION_CODE_HEADER: &str = "X-authorization-code";

/// Header carrying the JSON-encoded account details
pub const ACCOUNT_DETAILS_HEADER: &str = "X-account-details";

/// Token type marker for Sign in with Apple
pub const APPLE_SIGN_IN_TOKEN_TYPE: &str = "AppleSignInToken";

// ===============================
// HEADER HELPERS
// ===============================

/// Render headers as `name: value` lines with secrets masked, for debug logs
#[must_use]
pub fn redacted_header_summary(headers: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = headers.keys().collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let value = &headers[name];
            if is_secret_header(name) {
                format!("{name}: <{} bytes>", value.len())
            } else {
                format!("{name}: {value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_secret_header(name: &str) -> bool {
    name == ACCESS_TOKEN_HEADER || name == AUTHORIZATION_CODE_HEADER
}
