//! JSON-file session store.
//!
//! The whole collection lives in one JSON object keyed by session id. Every
//! process sharing the file sees the others' sessions after a `reload`, which
//! replaces the in-process copy with the file contents. Writes re-read the
//! file, apply their one change and rewrite it through a uniquely named
//! sibling plus a rename, so a reader never sees a half-written document and
//! another writer's sessions are carried over.
//!
//! There is no cross-process file lock: two processes writing within the
//! same read/rename window can still race, and the later rename wins.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use gatehouse_core::{Result, SessionBackend, SessionFilter, SessionRecord};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

pub const DEFAULT_SESSION_FILE: &str = ".db_UserSession.json";

type Collection = HashMap<String, SessionRecord>;

pub struct FileSessionStore {
    path: PathBuf,
    // Held across the file write so concurrent saves serialize
    sessions: Mutex<Collection>,
}

impl FileSessionStore {
    /// Open the store at `path`; a missing file is an empty store
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let sessions = read_collection(&path).await?;
        tracing::debug!(path = %path.display(), sessions = sessions.len(), "Session file opened");
        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_collection(path: &Path) -> anyhow::Result<Collection> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Collection::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Collection::new());
    }
    serde_json::from_slice(&raw).with_context(|| format!("Malformed session file {}", path.display()))
}

async fn write_collection(path: &Path, sessions: &Collection) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(sessions).context("Failed to serialize sessions")?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;
        tmp.write_all(&body)
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    })
    .await
    .context("Session file writer panicked")?
}

#[async_trait]
impl SessionBackend for FileSessionStore {
    async fn reload(&self) -> Result<()> {
        let fresh = read_collection(&self.path).await?;
        *self.sessions.lock().await = fresh;
        Ok(())
    }

    async fn search(&self, filter: &SessionFilter) -> Result<Vec<SessionRecord>> {
        let sessions = self.sessions.lock().await;
        let mut found: Vec<SessionRecord> = sessions
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        found.sort_by_key(|record| record.created_at);
        Ok(found)
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let mut fresh = read_collection(&self.path).await?;
        fresh.insert(record.session_id.clone(), record.clone());
        write_collection(&self.path, &fresh).await?;
        *sessions = fresh;
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        let mut fresh = read_collection(&self.path).await?;
        let removed = fresh.remove(session_id).is_some();
        if removed {
            write_collection(&self.path, &fresh).await?;
        }
        *sessions = fresh;
        Ok(removed)
    }
}
