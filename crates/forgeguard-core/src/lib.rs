//! Client library for the ForgeGuard image forgery detection service.
//!
//! - [`api`]: typed HTTP client and error classification
//! - [`session`]: persisted session, expiry signal and [`session::SessionStore`]
//! - [`pipeline`]: two-phase analysis gating
//! - [`navigation`]: active view and role-based menus

pub mod api;
pub mod config;
pub mod logging;
pub mod navigation;
pub mod pipeline;
pub mod session;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult};
pub use config::Config;
pub use session::{AuthState, SessionStore};
