//! Login session persisted between CLI runs.
//!
//! The session is an explicit value: load it on start, hand it to
//! `ApiClient::with_session`, save it after login and clear it on logout
//! or when the server answers 401.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use famcal_core::User;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Session {
            token: token.into(),
            created_at: Utc::now(),
            user,
        }
    }
}

/// File-backed session storage (TOML, owner-only permissions).
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, or `None` when nobody is logged in.
    pub fn load(&self) -> ApiResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let session: Session = toml::from_str(&contents).map_err(|e| {
            ApiError::Session(format!(
                "Failed to parse session from {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("loaded session from {}", self.path.display());
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> ApiResult<()> {
        let contents = toml::to_string_pretty(session)
            .map_err(|e| ApiError::Session(format!("Failed to serialize session: {e}")))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, contents)?;

        // Owner-only (0600) since the file holds a bearer token:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!("saved session to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> ApiResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("cleared session at {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
