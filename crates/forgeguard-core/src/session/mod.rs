//! Who is logged in: persisted session pair, expiry signal and the store
//! that ties them together.

pub mod expiry;
pub mod storage;
mod store;

pub use expiry::{ExpiryReceiver, ExpirySender, SessionExpired, expiry_channel};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY, clear_session};
pub use store::{AuthState, SessionStore};
