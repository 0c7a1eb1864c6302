//! Session-related types for admin authentication.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for the signed-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// Session-stored admin identity and the backend token issued at login.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct AdminSession {
    token: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AdminSession {
    #[must_use]
    pub const fn new(token: String, name: Option<String>, email: Option<String>) -> Self {
        Self { token, name, email }
    }

    /// Backend bearer token.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &"[REDACTED]")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let admin = AdminSession::new("tok_123".to_string(), Some("Ops".to_string()), None);
        assert!(!format!("{admin:?}").contains("tok_123"));
        assert_eq!(admin.token().expose_secret(), "tok_123");
    }
}
