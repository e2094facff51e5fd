//! Session lifecycle: login, resume, logout.
//!
//! The session is an explicit value handed to command handlers; there is no
//! process-global user or token. `SessionStore` is the persistence side,
//! holding nothing but the bearer token on disk between runs (the browser
//! localStorage analogue).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::domain::User;

/// File-backed token persistence.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted token, if any. An empty file counts as no token.
    pub fn load(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write token to {}", self.path.display()))
    }

    /// Remove the persisted token. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }
}

/// An authenticated session: the current user plus the token already
/// attached to the client.
#[derive(Debug)]
pub struct Session {
    pub user: User,
}

impl Session {
    /// Authenticate against `POST /auth/login` and persist the token.
    pub async fn login(
        client: &mut ApiClient,
        store: &SessionStore,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let (token, user) = client.login(username, password).await?;
        if let Err(err) = store.save(&token) {
            // The session still works for this run; only persistence failed.
            tracing::warn!(error = %err, "could not persist session token");
        }
        client.set_token(token);
        debug!(username = %user.username, role = %user.role, "logged in");
        Ok(Session { user })
    }

    /// Resume from a persisted token via `GET /auth/me`.
    ///
    /// A missing token or a 401/403 clears the stored token and surfaces an
    /// auth error so the caller can tell the user to log in again.
    pub async fn resume(client: &mut ApiClient, store: &SessionStore) -> Result<Session, ApiError> {
        let token = store.load().ok_or(ApiError::Auth {
            status: 401,
            message: "no saved session; run `fixdesk login` first".to_string(),
        })?;
        client.set_token(token);

        match client.me().await {
            Ok(user) => {
                debug!(username = %user.username, role = %user.role, "session resumed");
                Ok(Session { user })
            }
            Err(err) => {
                if err.is_auth() {
                    let _ = store.clear();
                    client.clear_token();
                }
                Err(err)
            }
        }
    }

    /// Drop the persisted token and detach it from the client.
    pub fn logout(client: &mut ApiClient, store: &SessionStore) -> Result<()> {
        store.clear()?;
        client.clear_token();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load(), None);
        store.save("abc123").unwrap();
        assert_eq!(store.load(), Some("abc123".to_string()));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_resume_without_token_is_an_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("token"));
        let mut client = ApiClient::new(&crate::config::ApiConfig::default());

        // No network call is made when there is no token to resume from.
        let err = tokio_test::block_on(Session::resume(&mut client, &store)).unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_blank_token_file_counts_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        let store = SessionStore::new(&path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_token_whitespace_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "tok-1\n").unwrap();
        let store = SessionStore::new(&path);
        assert_eq!(store.load(), Some("tok-1".to_string()));
    }
}
