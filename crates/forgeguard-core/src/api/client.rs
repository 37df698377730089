//! The single chokepoint for backend calls.
//!
//! Every request goes through [`ApiClient::request`], which attaches
//! credentials, sets the content type, and classifies the outcome:
//!
//! 1. transport failure → network error
//! 2. 401 → persisted session cleared, expiry signalled, `Unauthorized`
//! 3. 403 / 404 / 5xx → fixed messages
//! 4. other non-2xx → body `message` or "Request failed"
//! 5. 2xx JSON → [`ApiResponse::Json`]
//! 6. 2xx other → [`ApiResponse::Raw`] for the caller to consume
//!
//! No retries and no timeouts; concurrency control is the caller's concern.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use crate::session::expiry::ExpirySender;
use crate::session::storage::{self, SessionStorage, TOKEN_KEY};

/// Standard User-Agent header for ForgeGuard requests.
pub const USER_AGENT: &str = concat!("forgeguard/", env!("CARGO_PKG_VERSION"));

const JSON_CONTENT_TYPE: &str = "application/json";

/// How the bearer token is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` when a token is stored
    Bearer,
    /// `?token=<token>`, for protected result images
    QueryToken,
    /// Nothing attached
    None,
}

/// Messages used when a public call fails without a usable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackMessages {
    /// Body is JSON but carries no `message`
    pub missing: &'static str,
    /// Body is not JSON
    pub unparseable: &'static str,
}

pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

/// Per-call options: method, body, extra headers and credential handling.
pub struct RequestOptions {
    method: Method,
    body: RequestBody,
    headers: Vec<(&'static str, String)>,
    query: Vec<(String, String)>,
    credentials: Credentials,
    expire_on_unauthorized: bool,
    fallback: Option<FallbackMessages>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: RequestBody::Empty,
            headers: Vec::new(),
            query: Vec::new(),
            credentials: Credentials::Bearer,
            expire_on_unauthorized: true,
            fallback: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Serializes `value` as the JSON body.
    ///
    /// # Errors
    /// Returns a `Decode` error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize>(self, value: &T) -> ApiResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| ApiError::decode(format!("Failed to encode request body: {e}")))?;
        Ok(self.body(RequestBody::Json(json)))
    }

    #[must_use]
    pub fn multipart(self, form: reqwest::multipart::Form) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Unauthenticated call (login, registration): no token, a 401 is an
    /// ordinary failure, and errors take the body message or `fallback`.
    #[must_use]
    pub fn public(mut self, fallback: FallbackMessages) -> Self {
        self.credentials = Credentials::None;
        self.expire_on_unauthorized = false;
        self.fallback = Some(fallback);
        self
    }

    /// A 401 on this call does not tear down the session.
    #[must_use]
    pub fn without_expiry(mut self) -> Self {
        self.expire_on_unauthorized = false;
        self
    }

    fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Successful outcome of a call.
#[derive(Debug)]
pub enum ApiResponse {
    /// 2xx with a JSON content type (`Null` for an empty body)
    Json(Value),
    /// 2xx with any other content type, body not yet read
    Raw(Response),
}

/// HTTP client for the analysis backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn SessionStorage>,
    expiry: ExpirySender,
}

impl ApiClient {
    /// Creates a client for `base_url`, reading tokens from `storage` and
    /// reporting expiry through `expiry`.
    pub fn new(
        base_url: impl Into<String>,
        storage: Arc<dyn SessionStorage>,
        expiry: ExpirySender,
    ) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            expiry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    /// Re-arms the expiry latch; called when a new session is adopted.
    pub fn rearm_expiry(&self) {
        self.expiry.rearm();
    }

    /// Current persisted token, if any. Storage errors read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted token");
                None
            }
        }
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Sends one request and classifies the outcome.
    ///
    /// # Errors
    /// Returns an [`ApiError`] for connectivity failures and non-2xx statuses.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> ApiResult<ApiResponse> {
        let multipart = options.is_multipart();
        let RequestOptions {
            method,
            body,
            headers,
            mut query,
            credentials,
            expire_on_unauthorized,
            fallback,
        } = options;

        let token = match credentials {
            Credentials::None => None,
            Credentials::Bearer | Credentials::QueryToken => self.token(),
        };
        if credentials == Credentials::QueryToken
            && let Some(token) = token.as_deref()
        {
            query.push(("token".to_string(), token.to_string()));
        }

        let mut builder = self.http.request(method.clone(), self.url(endpoint));
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if credentials == Credentials::Bearer
            && let Some(token) = token.as_deref()
        {
            builder = builder.bearer_auth(token);
        }
        if !multipart {
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        tracing::debug!(%method, endpoint, "sending request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%method, endpoint, error = %err, "request did not reach the server");
                return Err(ApiError::network());
            }
        };

        let status = response.status();
        tracing::debug!(%method, endpoint, status = status.as_u16(), "response received");

        if status.as_u16() == 401 && expire_on_unauthorized {
            self.expire_session();
            return Err(ApiError::unauthorized());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match fallback {
                Some(messages) => ApiError::from_public_status(
                    status.as_u16(),
                    &body,
                    messages.missing,
                    messages.unparseable,
                ),
                None => ApiError::from_status(status.as_u16(), &body),
            };
            return Err(error);
        }

        if is_json(&response) {
            let bytes = response.bytes().await.map_err(|err| {
                tracing::warn!(endpoint, error = %err, "response body interrupted");
                ApiError::network()
            })?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(ApiResponse::Json(Value::Null));
            }
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::decode(format!("Invalid JSON from {endpoint}: {e}")))?;
            return Ok(ApiResponse::Json(value));
        }

        Ok(ApiResponse::Raw(response))
    }

    /// Sends a request whose success body must be JSON of type `T`.
    ///
    /// # Errors
    /// As [`ApiClient::request`], plus `Decode` when the body does not fit `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        match self.request(endpoint, options).await? {
            ApiResponse::Json(value) => decode(endpoint, value),
            ApiResponse::Raw(_) => Err(ApiError::decode(format!(
                "Expected a JSON response from {endpoint}"
            ))),
        }
    }

    /// Like [`ApiClient::request_json`] but an empty or non-JSON success
    /// body yields `T::default()`.
    ///
    /// # Errors
    /// As [`ApiClient::request`].
    pub async fn request_or_default<T: DeserializeOwned + Default>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        match self.request(endpoint, options).await? {
            ApiResponse::Json(Value::Null) | ApiResponse::Raw(_) => Ok(T::default()),
            ApiResponse::Json(value) => decode(endpoint, value),
        }
    }

    /// Clears the persisted session and fires the (latched) expiry signal.
    fn expire_session(&self) {
        if let Err(err) = storage::clear_session(self.storage.as_ref()) {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        if self.expiry.notify() {
            tracing::info!("session expired");
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains(JSON_CONTENT_TYPE))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::decode(format!("Unexpected response from {endpoint}: {e}")))
}

/// Percent-encodes one path segment (ids, filenames).
pub(crate) fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
