// Session JSON adapter - Persists session contexts between rounds

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::SessionId;
use crate::domain::session::SessionContext;
use crate::ports::*;

const SESSION_FILE: &str = "session.json";
const STAGING_DIR: &str = "staging";

/// Session store keeping one directory per session under `<root>/sessions`
#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    root: PathBuf,
}

impl JsonSessionStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            root: state_dir.as_ref().join("sessions"),
        }
    }

    /// Directory holding everything a session owns
    pub fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn session_file(&self, id: &SessionId) -> PathBuf {
        self.session_dir(id).join(SESSION_FILE)
    }
}

#[async_trait]
impl SessionPort for JsonSessionStore {
    async fn load(&self, id: &SessionId) -> Result<SessionContext, DomainError> {
        let path = self.session_file(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let session: SessionContext = serde_json::from_slice(&bytes).map_err(|e| {
                    DomainError::Session(format!("Corrupt session file {}: {}", path.display(), e))
                })?;
                if &session.id != id {
                    return Err(DomainError::Session(format!(
                        "Session file {} belongs to session {}",
                        path.display(),
                        session.id
                    )));
                }
                debug!("Loaded session {}", id);
                Ok(session)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Starting new session {}", id);
                Ok(SessionContext::new(id.clone()))
            }
            Err(e) => Err(DomainError::Session(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn save(&self, session: &SessionContext) -> Result<(), DomainError> {
        let dir = self.session_dir(&session.id);
        tokio::fs::create_dir_all(&dir).await?;

        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| DomainError::Session(format!("Failed to serialize session: {}", e)))?;

        // Write then rename so an interrupted save never leaves half a file
        let path = dir.join(SESSION_FILE);
        let temp = dir.join(format!("{}.tmp", SESSION_FILE));
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &path).await?;

        debug!("Saved session {} to {}", session.id, path.display());
        Ok(())
    }

    fn staging_dir(&self, id: &SessionId) -> PathBuf {
        self.session_dir(id).join(STAGING_DIR)
    }

    async fn list(&self) -> Result<Vec<SessionId>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.path().join(SESSION_FILE).is_file() {
                continue;
            }
            if let Ok(id) = SessionId::parse(&entry.file_name().to_string_lossy()) {
                ids.push(id);
            }
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OperationMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_session_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(dir.path());
        let id = SessionId::parse("fresh").unwrap();

        let session = store.load(&id).await.unwrap();
        assert_eq!(session, SessionContext::new(id));
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_state() {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(dir.path());
        let mut session = SessionContext::new(SessionId::parse("alice").unwrap());
        let key = session.concat_mut().key.clone();

        store.save(&session).await.unwrap();
        let loaded = store.load(&session.id).await.unwrap();

        assert_eq!(loaded.concat().unwrap().key, key);
        assert_eq!(loaded.active_mode, Some(OperationMode::Concat));
    }

    #[tokio::test]
    async fn test_list_returns_saved_sessions() {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(dir.path());
        for name in ["bob", "alice"] {
            store
                .save(&SessionContext::new(SessionId::parse(name).unwrap()))
                .await
                .unwrap();
        }

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_sessions_have_separate_staging_dirs() {
        let store = JsonSessionStore::new("/state");
        let a = store.staging_dir(&SessionId::parse("a").unwrap());
        let b = store.staging_dir(&SessionId::parse("b").unwrap());
        assert_ne!(a, b);
        assert_eq!(a, PathBuf::from("/state/sessions/a/staging"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_session_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonSessionStore::new(dir.path());
        let id = SessionId::parse("broken").unwrap();
        std::fs::create_dir_all(store.session_dir(&id)).unwrap();
        std::fs::write(store.session_dir(&id).join(SESSION_FILE), b"{not json").unwrap();

        assert!(matches!(store.load(&id).await, Err(DomainError::Session(_))));
    }
}
