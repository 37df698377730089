//! Composition root: owns the session store for one invocation and turns a
//! session expiry observed during the command into a distinct error.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, bail};
use forgeguard_core::api::ApiClient;
use forgeguard_core::{Config, SessionStore};

/// The backend rejected the stored session while a command was running.
#[derive(Debug)]
pub struct SessionExpiredError;

impl fmt::Display for SessionExpiredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session expired. Please log in again with `forgeguard login`."
        )
    }
}

impl std::error::Error for SessionExpiredError {}

pub struct App {
    config: Config,
    store: SessionStore,
}

impl App {
    /// Resolves the backend URL and restores the persisted session.
    pub fn open(config: Config, api_url: Option<&str>) -> Result<Self> {
        let base_url = config.resolve_api_url_with(api_url)?;
        tracing::debug!(%base_url, "opening session");

        let mut store = SessionStore::open(base_url);
        store.initialize();
        Ok(Self { config, store })
    }

    pub fn client(&self) -> &ApiClient {
        self.store.client()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Directory for downloads: `output` when given, else the configured one.
    pub fn download_dir(&self, output: Option<PathBuf>) -> PathBuf {
        output.unwrap_or_else(|| self.config.download_dir())
    }

    /// Fails when no session is stored.
    pub fn require_session(&self) -> Result<()> {
        if !self.store.is_authenticated() {
            bail!("Not logged in. Run `forgeguard login --email <EMAIL>` first.");
        }
        Ok(())
    }

    /// Applies an expiry observed while the command ran. An expiry wins over
    /// whatever the command returned.
    pub fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        if self.store.reconcile_expiry() {
            return Err(SessionExpiredError.into());
        }
        result
    }
}
