//! Auth token and built-in credential types
//!
//! These types never print their secrets: `Debug` masks them.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant tag of an [`AuthToken`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// No credentials
    Anonymous,
    /// Access token sent as `Authorization: token <secret>`
    BearerToken,
    /// HTTP Basic credentials
    UserPassword,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthKind::Anonymous => "anonymous",
            AuthKind::BearerToken => "bearer_token",
            AuthKind::UserPassword => "user_password",
        };
        f.write_str(s)
    }
}

/// How a connection authenticates against the server
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub enum AuthToken {
    /// No authentication
    #[default]
    Anonymous,

    /// Personal access token
    BearerToken {
        /// The token value
        secret: String,
    },

    /// Username and password (or username and token) over HTTP Basic
    UserPassword {
        /// Username
        username: String,
        /// Password or token
        secret: String,
    },
}

impl AuthToken {
    /// Create an anonymous token
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Create a bearer token
    pub fn bearer(secret: impl Into<String>) -> Self {
        Self::BearerToken {
            secret: secret.into(),
        }
    }

    /// Create HTTP Basic credentials
    pub fn user_password(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::UserPassword {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Variant tag, safe to log
    pub fn kind(&self) -> AuthKind {
        match self {
            AuthToken::Anonymous => AuthKind::Anonymous,
            AuthToken::BearerToken { .. } => AuthKind::BearerToken,
            AuthToken::UserPassword { .. } => AuthKind::UserPassword,
        }
    }

    /// Check if this token carries no credentials
    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthToken::Anonymous)
    }

    /// Value of the `Authorization` header for this token, if any
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            AuthToken::Anonymous => None,
            AuthToken::BearerToken { secret } => Some(format!("token {secret}")),
            AuthToken::UserPassword { username, secret } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{secret}"));
                Some(format!("Basic {encoded}"))
            }
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthToken::Anonymous => f.write_str("Anonymous"),
            AuthToken::BearerToken { .. } => f
                .debug_struct("BearerToken")
                .field("secret", &"****")
                .finish(),
            AuthToken::UserPassword { username, .. } => f
                .debug_struct("UserPassword")
                .field("username", username)
                .field("secret", &"****")
                .finish(),
        }
    }
}

// ============================================================================
// Built-in credential shapes
// ============================================================================

/// A single secret, e.g. a personal access token
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SecretText {
    /// The secret value
    pub secret: String,
}

impl SecretText {
    /// Create a new secret text credential
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretText")
            .field("secret", &"****")
            .finish()
    }
}

/// A username and password pair
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct UsernamePassword {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl UsernamePassword {
    /// Create a new username/password credential
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for UsernamePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePassword")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_auth_token_default() {
        let token = AuthToken::default();
        assert!(token.is_anonymous());
        assert_eq!(token.kind(), AuthKind::Anonymous);
    }

    #[test]
    fn test_debug_masks_secrets() {
        let token = AuthToken::user_password("alice", "hunter2");
        let printed = format!("{token:?}");
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));

        let printed = format!("{:?}", AuthToken::bearer("abc123"));
        assert!(!printed.contains("abc123"));

        let printed = format!("{:?}", SecretText::new("abc123"));
        assert!(!printed.contains("abc123"));
    }

    #[test]
    fn test_tokens_compare_by_value() {
        assert_eq!(AuthToken::bearer("x"), AuthToken::bearer("x"));
        assert_ne!(AuthToken::bearer("x"), AuthToken::bearer("y"));
        assert_ne!(
            AuthToken::bearer("x"),
            AuthToken::user_password("x", "x")
        );
    }
}
