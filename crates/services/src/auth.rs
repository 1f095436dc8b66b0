use std::sync::Arc;

use url::Url;

use api::{AuthGateway, Credentials, NewAccount};
use course_core::model::Account;

use crate::error::AuthError;

/// Client-side half of the Google OAuth flow.
///
/// The consent URL is built locally; the backend only sees the authorization
/// code via [`AuthService::complete_google_login`].
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub redirect_uri: Url,
}

impl OAuthConfig {
    /// Google consent screen URL for this client.
    #[must_use]
    pub fn google_auth_url(&self) -> Url {
        let mut url = Url::parse("https://accounts.google.com/o/oauth2/v2/auth")
            .expect("static url is valid");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile");
        url
    }
}

/// Login, registration, and password recovery on top of an explicit
/// credential handle.
///
/// Successful logins store the token in the shared [`Credentials`] so every
/// gateway holding the same handle starts sending it; logout clears it.
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthGateway>,
    credentials: Credentials,
}

impl AuthService {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthGateway>, credentials: Credentials) -> Self {
        Self { auth, credentials }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_authenticated()
    }

    /// Password login. Stores the token and returns the account profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a rejected login,
    /// `AuthError::Api` for transport or server failures.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let token = self.auth.login(email, password).await?;
        self.credentials.set(token);
        let account = self.auth.me().await?;
        tracing::info!(user = %account.username, "logged in");
        Ok(account)
    }

    /// Create a password account. Does not log the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` with a validation variant when the email or
    /// username is already taken.
    pub async fn register(&self, account: NewAccount) -> Result<Account, AuthError> {
        Ok(self.auth.register(account).await?)
    }

    /// Finish the Google OAuth flow with the code from the redirect.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` when the code is rejected.
    pub async fn complete_google_login(&self, code: &str) -> Result<Account, AuthError> {
        let token = self.auth.google_callback(code).await?;
        self.credentials.set(token);
        let account = self.auth.me().await?;
        tracing::info!(user = %account.username, "logged in via google");
        Ok(account)
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for transport or server failures.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        Ok(self.auth.forgot_password(email).await?)
    }

    /// Set a new password using an emailed reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` with a validation variant for an expired or
    /// unknown token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        Ok(self.auth.reset_password(token, new_password).await?)
    }

    /// Drop the stored token.
    pub fn logout(&self) {
        self.credentials.clear();
        tracing::info!("logged out");
    }
}
