//! Typed errors produced by the HTTP client.

use std::fmt;

use serde_json::Value;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection and try again.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Error category, selected from the response status (or its absence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response reached the client (DNS, refused connection, TLS, offline)
    Network,
    /// HTTP 401; the session has been torn down
    Unauthorized,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// HTTP 5xx
    Server,
    /// Any other non-2xx status
    Client,
    /// 2xx response whose body could not be decoded into the expected shape
    Decode,
}

impl ApiErrorKind {
    /// Title used when rendering an error of this kind.
    pub fn title(&self) -> &'static str {
        match self {
            ApiErrorKind::Network => "Connection Error",
            ApiErrorKind::Server => "Server Error",
            _ => "Error",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::Forbidden => write!(f, "forbidden"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::Server => write!(f, "server"),
            ApiErrorKind::Client => write!(f, "client"),
            ApiErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// Structured error from the backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status, absent for connectivity failures
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code,
        }
    }

    /// Connectivity failure: no status, fixed message.
    pub fn network() -> Self {
        Self::new(ApiErrorKind::Network, NETWORK_ERROR_MESSAGE, None)
    }

    pub fn unauthorized() -> Self {
        Self::new(ApiErrorKind::Unauthorized, SESSION_EXPIRED_MESSAGE, Some(401))
    }

    /// Classifies a non-2xx status that is not 401.
    ///
    /// 403, 404 and 5xx carry fixed messages; other statuses take the
    /// `message` field of a JSON body when there is one.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => Self::unauthorized(),
            403 => Self::new(ApiErrorKind::Forbidden, FORBIDDEN_MESSAGE, Some(status)),
            404 => Self::new(ApiErrorKind::NotFound, NOT_FOUND_MESSAGE, Some(status)),
            s if s >= 500 => Self::new(ApiErrorKind::Server, SERVER_ERROR_MESSAGE, Some(status)),
            _ => {
                let message = body_message(body).unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string());
                Self::new(ApiErrorKind::Client, message, Some(status))
            }
        }
    }

    /// Error for a public (unauthenticated) call such as login.
    ///
    /// Any non-2xx status, 401 included, takes the body's `message` field.
    /// `missing_message` is used when the body is JSON without a message and
    /// `unparseable` when it is not JSON at all.
    pub fn from_public_status(
        status: u16,
        body: &str,
        missing_message: &str,
        unparseable: &str,
    ) -> Self {
        let kind = match status {
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            s if s >= 500 => ApiErrorKind::Server,
            _ => ApiErrorKind::Client,
        };
        let message = match serde_json::from_str::<Value>(body) {
            Ok(json) => message_field(&json).unwrap_or_else(|| missing_message.to_string()),
            Err(_) => unparseable.to_string(),
        };
        Self::new(kind, message, Some(status))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message, None)
    }

    pub fn is_network_error(&self) -> bool {
        self.kind == ApiErrorKind::Network
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code.is_some_and(|s| s >= 500)
    }

    /// Whether re-issuing the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network | ApiErrorKind::Server)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn body_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    message_field(&json)
}

fn message_field(json: &Value) -> Option<String> {
    json.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages_by_status() {
        let forbidden = ApiError::from_status(403, r#"{"message":"nope"}"#);
        assert_eq!(forbidden.kind, ApiErrorKind::Forbidden);
        assert_eq!(forbidden.message, FORBIDDEN_MESSAGE);
        assert_eq!(forbidden.status_code, Some(403));

        let missing = ApiError::from_status(404, "");
        assert_eq!(missing.message, NOT_FOUND_MESSAGE);

        let server = ApiError::from_status(503, r#"{"message":"db down"}"#);
        assert_eq!(server.kind, ApiErrorKind::Server);
        assert_eq!(server.message, SERVER_ERROR_MESSAGE);
        assert_eq!(server.status_code, Some(503));
        assert!(!server.is_network_error());
        assert!(server.is_server_error());
    }

    #[test]
    fn test_client_error_uses_body_message() {
        let err = ApiError::from_status(422, r#"{"message":"Unsupported image format"}"#);
        assert_eq!(err.kind, ApiErrorKind::Client);
        assert_eq!(err.message, "Unsupported image format");
        assert_eq!(err.status_code, Some(422));
    }

    #[test]
    fn test_client_error_falls_back_to_generic_message() {
        assert_eq!(ApiError::from_status(400, "<html>").message, REQUEST_FAILED_MESSAGE);
        assert_eq!(ApiError::from_status(409, "{}").message, REQUEST_FAILED_MESSAGE);
        assert_eq!(
            ApiError::from_status(400, r#"{"message":"   "}"#).message,
            REQUEST_FAILED_MESSAGE
        );
    }

    #[test]
    fn test_network_error_has_no_status() {
        let err = ApiError::network();
        assert!(err.is_network_error());
        assert_eq!(err.status_code, None);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_public_status_message_selection() {
        let with_message = ApiError::from_public_status(
            401,
            r#"{"message":"Invalid credentials"}"#,
            "Invalid email or password",
            "Login failed",
        );
        assert_eq!(with_message.kind, ApiErrorKind::Unauthorized);
        assert_eq!(with_message.message, "Invalid credentials");
        assert_eq!(with_message.status_code, Some(401));

        let without = ApiError::from_public_status(401, "{}", "Invalid email or password", "Login failed");
        assert_eq!(without.message, "Invalid email or password");

        let garbage = ApiError::from_public_status(500, "oops", "Invalid email or password", "Login failed");
        assert_eq!(garbage.message, "Login failed");
        assert_eq!(garbage.kind, ApiErrorKind::Server);
    }

    #[test]
    fn test_error_titles() {
        assert_eq!(ApiErrorKind::Network.title(), "Connection Error");
        assert_eq!(ApiErrorKind::Server.title(), "Server Error");
        assert_eq!(ApiErrorKind::NotFound.title(), "Error");
    }

    #[test]
    fn test_display_is_message() {
        let err = ApiError::from_status(500, "");
        assert_eq!(err.to_string(), SERVER_ERROR_MESSAGE);
    }
}
