//! Client for the ForgeGuard analysis backend.

mod admin;
mod analysis;
mod auth;
pub mod client;
mod download;
pub mod error;
mod images;
mod results;
pub mod types;

pub use admin::user_archive_name;
pub use auth::{LOGIN_FALLBACK, REGISTER_FALLBACK};
pub use client::{ApiClient, ApiResponse, Credentials, FallbackMessages, RequestBody, RequestOptions, USER_AGENT};
pub use download::Download;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use images::ImageUpload;
pub use types::*;
