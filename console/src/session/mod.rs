//! Persisted session record and the file-backed store that owns it.
//!
//! The console keeps exactly one session on disk: the last successful login
//! response, stored verbatim under a well-known path so a restart can restore
//! the credential without asking the user to sign in again.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::auth::models::Role;
use crate::errors::ServiceResult;

/// The persisted login response plus a timestamp of when it was written.
///
/// Fields the console does not model (country and whatever the backend adds
/// later) ride along in `extras` and survive a save/load round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "savedAt", default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// File-backed store for the single session record.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    /// Reads the persisted record. A missing file means no session, not an
    /// error; an unreadable or malformed file is reported so the caller can
    /// decide to discard it.
    pub fn load(&self) -> ServiceResult<Option<SessionRecord>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!(
                        "could not read session file {}",
                        self.path.display()
                    ))
                    .into());
            }
        };

        let record = serde_json::from_str(&raw)
            .with_context(|| format!("session file {} holds invalid JSON", self.path.display()))?;
        Ok(Some(record))
    }

    pub fn save(&self, record: &SessionRecord) -> ServiceResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("could not create session directory {}", parent.display())
            })?;
        }

        let raw = serde_json::to_string_pretty(record)
            .context("session record could not be serialized")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("could not write session file {}", self.path.display()))?;
        Ok(())
    }

    /// Removes the persisted record. Clearing an already-absent session is a
    /// no-op.
    pub fn clear(&self) -> ServiceResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!(
                    "could not remove session file {}",
                    self.path.display()
                ))
                .into()),
        }
    }
}
