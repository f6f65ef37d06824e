use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Error,
    user::{ProfileUpdate, User},
};

use super::{AccessToken, ApiClient};

const LOG_IN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const LOG_OUT: &str = "/auth/logout";
const RESET_PASSWORD: &str = "/auth/reset-password";
const REFRESH_TOKEN: &str = "/auth/refresh-token";
const CHANGE_PASSWORD: &str = "/auth/change-password";
const PROFILE: &str = "/auth/profile";

/// The email and password entered on the log-in page.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// The user's email address.
    pub email: String,
    /// The user's password in plain text.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The details entered on the registration page.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The user's full name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// The user's phone number, if they gave one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// The password that passed the strength check.
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The current and new password entered on the profile page.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    /// The password the user logged in with.
    pub current_password: String,
    /// The password that passed the strength check.
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange(<redacted>)")
    }
}

/// The tokens and user returned by a successful log in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// The bearer token for later calls.
    #[serde(alias = "token")]
    pub access_token: AccessToken,
    /// The token used to get a new access token before it expires.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// How many seconds the access token is valid for, if the backend says.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// The user who logged in.
    pub user: User,
}

/// The tokens returned when a session is refreshed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    /// The new bearer token.
    #[serde(alias = "token")]
    pub access_token: AccessToken,
    /// The new refresh token, if the backend rotates them.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// How many seconds the new access token is valid for, if the backend says.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Log in, registration and the logged in user's profile.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, Error>;

    /// Create an account that waits for an admin to grant portal access.
    async fn register(&self, registration: &Registration) -> Result<(), Error>;

    /// End the session on the backend.
    async fn logout(&self, token: &AccessToken) -> Result<(), Error>;

    /// Email the user a link to reset their password.
    async fn reset_password(&self, email: &str) -> Result<(), Error>;

    /// Get a new access token before the current one expires.
    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshedTokens, Error>;

    /// Replace the user's password.
    async fn change_password(
        &self,
        token: &AccessToken,
        change: &PasswordChange,
    ) -> Result<(), Error>;

    /// The logged in user.
    async fn profile(&self, token: &AccessToken) -> Result<User, Error>;

    /// Update the logged in user's name and phone number.
    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, Error>;
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        self.send(Method::POST, LOG_IN, None, Some(credentials)).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), Error> {
        self.send_without_reply(Method::POST, REGISTER, None, Some(registration))
            .await
    }

    async fn logout(&self, token: &AccessToken) -> Result<(), Error> {
        self.send_without_reply::<()>(Method::POST, LOG_OUT, Some(token), None)
            .await
    }

    async fn reset_password(&self, email: &str) -> Result<(), Error> {
        let body = json!({ "email": email });

        self.send_without_reply(Method::POST, RESET_PASSWORD, None, Some(&body))
            .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<RefreshedTokens, Error> {
        let body = json!({ "refreshToken": refresh_token });

        self.send(Method::POST, REFRESH_TOKEN, None, Some(&body)).await
    }

    async fn change_password(
        &self,
        token: &AccessToken,
        change: &PasswordChange,
    ) -> Result<(), Error> {
        self.send_without_reply(Method::POST, CHANGE_PASSWORD, Some(token), Some(change))
            .await
    }

    async fn profile(&self, token: &AccessToken) -> Result<User, Error> {
        self.fetch(PROFILE, Some(token)).await
    }

    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, Error> {
        self.send(Method::PUT, PROFILE, Some(token), Some(update)).await
    }
}
