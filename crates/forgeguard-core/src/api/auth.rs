//! Authentication endpoints.

use super::client::{ApiClient, FallbackMessages, RequestOptions};
use super::error::ApiResult;
use super::types::{LoginRequest, LoginResponse, MessageReply, RegisterRequest};

pub const LOGIN_FALLBACK: FallbackMessages = FallbackMessages {
    missing: "Invalid email or password",
    unparseable: "Login failed",
};

pub const REGISTER_FALLBACK: FallbackMessages = FallbackMessages {
    missing: "Registration failed",
    unparseable: "Registration failed",
};

impl ApiClient {
    /// `POST /api/auth/login`. Sent without credentials; a rejected login
    /// never touches the persisted session.
    ///
    /// # Errors
    /// Returns the backend's message, or a login-specific default.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let options = RequestOptions::post()
            .public(LOGIN_FALLBACK)
            .json(&LoginRequest { email, password })?;
        self.request_json("/api/auth/login", options).await
    }

    /// `POST /api/auth/register-admin`.
    ///
    /// # Errors
    /// Returns the backend's message, or "Registration failed".
    pub async fn register(&self, email: &str, password: &str, name: &str) -> ApiResult<MessageReply> {
        let options = RequestOptions::post()
            .public(REGISTER_FALLBACK)
            .json(&RegisterRequest {
                email,
                password,
                name,
            })?;
        self.request_or_default("/api/auth/register-admin", options)
            .await
    }

    /// `POST /api/auth/logout`. A 401 here means the token is already dead,
    /// so it is not treated as an expiry.
    ///
    /// # Errors
    /// Returns any classification error; callers treat it as best-effort.
    pub async fn logout(&self) -> ApiResult<MessageReply> {
        self.request_or_default("/api/auth/logout", RequestOptions::post().without_expiry())
            .await
    }
}
