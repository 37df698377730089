use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use super::expiry::{ExpiryReceiver, expiry_channel};
use super::storage::{self, FileStorage, SessionStorage, TOKEN_KEY, USER_KEY};
use crate::api::{ApiClient, Role, SessionUser};
use crate::navigation::View;

/// Snapshot of the session as observed by the composition root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
    /// True until [`SessionStore::initialize`] has run
    pub loading: bool,
    pub view: View,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }

    fn signed_in(token: String, user: SessionUser) -> Self {
        let view = View::home_for(user.role);
        Self {
            token: Some(token),
            user: Some(user),
            loading: false,
            view,
        }
    }

    fn signed_out() -> Self {
        Self::default()
    }
}

/// Owns the current session and the receiving end of the expiry channel.
///
/// Mutations go through `&mut self`; observers hold a [`watch::Receiver`]
/// from [`SessionStore::subscribe`].
pub struct SessionStore {
    client: ApiClient,
    expiry: ExpiryReceiver,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    /// Wires a client and store around `storage`. The store starts in the
    /// loading state; call [`SessionStore::initialize`] before use.
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn SessionStorage>) -> Self {
        let (sender, receiver) = expiry_channel();
        let client = ApiClient::new(base_url, storage, sender);
        Self::with_client(client, receiver)
    }

    /// Store over the file-backed session at `<home>/session.json`.
    pub fn open(base_url: impl Into<String>) -> Self {
        Self::new(base_url, Arc::new(FileStorage::default_location()))
    }

    /// Store for an already-built client; `expiry` must be the receiver
    /// paired with the client's sender.
    pub fn with_client(client: ApiClient, expiry: ExpiryReceiver) -> Self {
        let (state, _) = watch::channel(AuthState {
            loading: true,
            ..AuthState::default()
        });
        Self {
            client,
            expiry,
            state,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Current snapshot.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    /// Rehydrates from storage without touching the network.
    ///
    /// A pair that is incomplete or whose user entry does not parse is
    /// removed from storage. Returns whether a session was adopted.
    pub fn initialize(&mut self) -> bool {
        let backing = self.client.storage();
        let token = read_entry(backing.as_ref(), TOKEN_KEY);
        let user = read_entry(backing.as_ref(), USER_KEY);

        let next = match (token, user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<SessionUser>(&raw_user) {
                Ok(user) => {
                    tracing::debug!(user_id = %user.id, "session restored");
                    Some(AuthState::signed_in(token, user))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "persisted user is corrupt, clearing session");
                    None
                }
            },
            (None, None) => {
                self.state.send_replace(AuthState::signed_out());
                return false;
            }
            _ => {
                tracing::warn!("persisted session is incomplete, clearing it");
                None
            }
        };

        let Some(next) = next else {
            if let Err(err) = storage::clear_session(backing.as_ref()) {
                tracing::warn!(error = %err, "failed to clear persisted session");
            }
            self.state.send_replace(AuthState::signed_out());
            return false;
        };

        self.client.rearm_expiry();
        self.state.send_replace(next);
        true
    }

    /// Logs in and adopts the returned session.
    ///
    /// On failure the existing session (in memory and on disk) is left as it
    /// was.
    ///
    /// # Errors
    /// Returns the [`ApiError`](crate::api::ApiError) from the backend, or a
    /// storage error if the new session cannot be persisted.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionUser> {
        let response = self.client.login(email, password).await?;
        self.adopt(response.token, response.user.clone())?;
        tracing::info!(user_id = %response.user.id, role = %response.user.role, "logged in");
        Ok(response.user)
    }

    /// Registers an account, then logs in with the same credentials.
    ///
    /// # Errors
    /// Returns the registration or login error.
    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<SessionUser> {
        self.client.register(email, password, name).await?;
        tracing::info!("account registered");
        self.login(email, password).await
    }

    /// Notifies the backend when a token is held, then clears the session
    /// unconditionally. Backend failures are logged and ignored.
    pub async fn logout(&mut self) {
        if self.client.token().is_some()
            && let Err(err) = self.client.logout().await
        {
            tracing::warn!(error = %err, status = ?err.status_code, "backend logout failed");
        }
        self.clear();
        tracing::info!("logged out");
    }

    /// Applies a pending expiry signal, if any. Returns whether one was
    /// applied.
    pub fn reconcile_expiry(&mut self) -> bool {
        if self.expiry.try_recv().is_none() {
            return false;
        }
        self.apply_expired();
        true
    }

    /// Waits for the session to expire and applies it.
    pub async fn expired(&mut self) {
        if self.expiry.recv().await.is_some() {
            self.apply_expired();
        }
    }

    fn adopt(&mut self, token: String, user: SessionUser) -> Result<()> {
        let backing = Arc::clone(self.client.storage());
        let user_json = serde_json::to_string(&user).context("Failed to serialize user")?;

        let persisted = backing
            .set(TOKEN_KEY, &token)
            .and_then(|()| backing.set(USER_KEY, &user_json));
        if let Err(err) = persisted {
            self.restore_persisted();
            return Err(err.context("Failed to persist session"));
        }

        // A signal left over from the previous session must not tear down
        // this one.
        while self.expiry.try_recv().is_some() {}
        self.client.rearm_expiry();
        self.state.send_replace(AuthState::signed_in(token, user));
        Ok(())
    }

    /// Writes the in-memory session back after a failed persist.
    fn restore_persisted(&self) {
        let current = self.state();
        let backing = self.client.storage();
        let restored = match (current.token, current.user) {
            (Some(token), Some(user)) => serde_json::to_string(&user)
                .map_err(anyhow::Error::from)
                .and_then(|json| {
                    backing.set(TOKEN_KEY, &token)?;
                    backing.set(USER_KEY, &json)
                }),
            _ => storage::clear_session(backing.as_ref()),
        };
        if let Err(err) = restored {
            tracing::warn!(error = %err, "failed to restore persisted session");
        }
    }

    fn apply_expired(&mut self) {
        tracing::info!("session expired, returning to login");
        self.clear();
    }

    fn clear(&mut self) {
        if let Err(err) = storage::clear_session(self.client.storage().as_ref()) {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.state.send_replace(AuthState::signed_out());
    }
}

fn read_entry(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read session entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;

    // Nothing listens here; any request would fail as a network error.
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn store_with(entries: &[(&str, &str)]) -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        for (key, value) in entries {
            storage.set(key, value).unwrap();
        }
        (SessionStore::new(UNREACHABLE, storage.clone()), storage)
    }

    #[test]
    fn test_new_store_is_loading() {
        let (store, _) = store_with(&[]);
        assert!(store.state().loading);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_initialize_adopts_valid_pair() {
        let (mut store, _) = store_with(&[
            (TOKEN_KEY, "tok"),
            (USER_KEY, r#"{"id":"7","email":"admin@forgeguard.io","role":"admin"}"#),
        ]);

        assert!(store.initialize());
        let state = store.state();
        assert!(!state.loading);
        assert!(state.is_authenticated());
        assert!(state.is_admin());
        assert_eq!(state.view, View::Admin);
    }

    #[test]
    fn test_initialize_clears_corrupt_user() {
        let (mut store, storage) = store_with(&[(TOKEN_KEY, "tok"), (USER_KEY, "{broken")]);

        assert!(!store.initialize());
        assert!(!store.is_authenticated());
        assert!(!store.state().loading);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_initialize_clears_partial_pair() {
        let (mut store, storage) = store_with(&[(TOKEN_KEY, "tok")]);

        assert!(!store.initialize());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.state().view, View::Login);
    }

    #[test]
    fn test_subscribers_observe_transitions() {
        let (mut store, _) = store_with(&[
            (TOKEN_KEY, "tok"),
            (USER_KEY, r#"{"id":"1","email":"u@x.io","role":"user"}"#),
        ]);
        let mut rx = store.subscribe();

        store.initialize();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().view, View::Dashboard);
    }

    #[tokio::test]
    async fn test_logout_without_backend_still_clears() {
        let (mut store, storage) = store_with(&[
            (TOKEN_KEY, "tok"),
            (USER_KEY, r#"{"id":"1","email":"u@x.io","role":"user"}"#),
        ]);
        store.initialize();

        store.logout().await;

        assert!(!store.is_authenticated());
        assert_eq!(store.state().view, View::Login);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
