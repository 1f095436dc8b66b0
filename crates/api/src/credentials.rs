use std::fmt;
use std::sync::{Arc, RwLock};

/// Bearer token issued by the auth endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value, sent as the `Authorization: Bearer` header.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

// Keeps the token out of debug logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Explicit credential handle shared between the auth service and the HTTP
/// gateway.
///
/// The caller constructs one and passes it to both sides; there is no ambient
/// token storage and no implicit request interceptor. Cloning yields another
/// handle to the same slot.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    slot: Arc<RwLock<Option<AuthToken>>>,
}

impl Credentials {
    /// An empty, unauthenticated handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle pre-seeded with a token, e.g. restored from app storage.
    #[must_use]
    pub fn with_token(token: AuthToken) -> Self {
        let credentials = Self::new();
        credentials.set(token);
        credentials
    }

    /// Store a token, replacing any previous one.
    pub fn set(&self, token: AuthToken) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = Some(token);
        }
    }

    /// Drop the stored token, returning the handle to the unauthenticated
    /// state.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
    }

    /// Snapshot of the current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_slot() {
        let credentials = Credentials::new();
        let other = credentials.clone();

        credentials.set(AuthToken::new("abc"));
        assert_eq!(other.token().map(|t| t.secret().to_owned()), Some("abc".into()));

        other.clear();
        assert!(!credentials.is_authenticated());
    }

    #[test]
    fn debug_does_not_leak_the_token() {
        let token = AuthToken::new("super-secret");
        assert_eq!(format!("{token:?}"), "AuthToken(..)");
    }
}
