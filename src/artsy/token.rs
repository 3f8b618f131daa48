// XApp token cache.
// Lazily fetches the app-level token, coalesces concurrent refreshes, and persists it to disk.

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache;
use crate::error::{EmergenceError, Result};

use super::types::XAppTokenResponse;

/// Application-level credential sent as `X-Xapp-Token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XAppToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl XAppToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn from_response(response: XAppTokenResponse) -> Result<Self> {
        let expires_at = DateTime::parse_from_rfc3339(&response.expires_in)
            .map_err(|e| {
                EmergenceError::Decode(format!(
                    "invalid XApp token expiry {:?}: {}",
                    response.expires_in, e
                ))
            })?
            .with_timezone(&Utc);
        Ok(Self::new(response.xapp_token, expires_at))
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && self.expires_at > now
    }
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<XAppToken>,
    /// Whether the persisted token has been looked at yet.
    disk_checked: bool,
}

/// Holds the current XApp token.
///
/// The lock is held while a token is being fetched, so concurrent callers wait
/// for that one fetch instead of starting their own.
#[derive(Debug, Default)]
pub struct TokenStore {
    state: Mutex<TokenState>,
    persist_path: Option<PathBuf>,
}

impl TokenStore {
    /// In-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that reads and writes the token at `path`.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(TokenState::default()),
            persist_path: Some(path.into()),
        }
    }

    /// Return a valid token, calling `fetch` only when none is cached.
    ///
    /// Any failure to produce a valid token surfaces as `Unauthenticated`.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<XAppToken>>,
    {
        let mut state = self.state.lock().await;

        if !state.disk_checked {
            state.disk_checked = true;
            if state.token.is_none() {
                state.token = self.load_persisted();
            }
        }

        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.token.clone());
        }

        debug!("fetching new XApp token");
        let token = fetch().await.map_err(|err| {
            warn!(error = %err, "XApp token fetch failed");
            match err {
                err if err.is_unauthenticated() => err,
                other => EmergenceError::Unauthenticated(format!(
                    "could not obtain XApp token: {}",
                    other
                )),
            }
        })?;

        if !token.is_valid() {
            return Err(EmergenceError::Unauthenticated(
                "received an expired XApp token".to_string(),
            ));
        }

        info!(expires_at = %token.expires_at, "XApp token refreshed");
        self.persist(&token);
        let value = token.token.clone();
        state.token = Some(token);
        Ok(value)
    }

    /// Seed the store with a known token.
    pub async fn set(&self, token: XAppToken) {
        let mut state = self.state.lock().await;
        self.persist(&token);
        state.token = Some(token);
        state.disk_checked = true;
    }

    /// The cached token, valid or not.
    pub async fn current(&self) -> Option<XAppToken> {
        self.state.lock().await.token.clone()
    }

    /// Forget the token, on disk as well.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        self.clear(&mut state);
    }

    /// Forget the token only if it is still `token`.
    ///
    /// A rejection of an older token must not discard one fetched since.
    /// Returns whether the cached token was dropped.
    pub async fn invalidate_if(&self, token: &str) -> bool {
        let mut state = self.state.lock().await;
        let matches = state.token.as_ref().is_some_and(|t| t.token == token);
        if matches {
            self.clear(&mut state);
        } else {
            debug!("rejected XApp token was already replaced");
        }
        matches
    }

    fn clear(&self, state: &mut TokenState) {
        state.token = None;
        state.disk_checked = true;
        if let Some(path) = &self.persist_path {
            if let Err(err) = cache::delete(path) {
                warn!(path = %path.display(), error = %err, "failed to delete persisted XApp token");
            }
        }
        debug!("XApp token invalidated");
    }

    fn load_persisted(&self) -> Option<XAppToken> {
        let path = self.persist_path.as_ref()?;
        match cache::read_cached::<XAppToken>(path) {
            Ok(Some(cached)) if cached.data.is_valid() => {
                debug!(path = %path.display(), "using persisted XApp token");
                Some(cached.data)
            }
            Ok(_) => None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable XApp token cache");
                None
            }
        }
    }

    fn persist(&self, token: &XAppToken) {
        if let Some(path) = &self.persist_path {
            if let Err(err) = cache::write_cached(path, token) {
                warn!(path = %path.display(), error = %err, "failed to persist XApp token");
            }
        }
    }
}
