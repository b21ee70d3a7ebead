//! services/cli/src/adapters/local_store.rs
//!
//! Small files kept between invocations: the auth token and the search history.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use jobprep_core::search::SearchHistory;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::ClientError;

const TOKEN_FILE: &str = "auth_token";
const HISTORY_FILE: &str = "search_history.json";
#[cfg(unix)]
const TOKEN_MODE: u32 = 0o600;

#[derive(Clone, Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `None` when nobody is logged in on this machine.
    pub async fn read_token(&self) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(self.dir.join(TOKEN_FILE)).await {
            Ok(raw) => {
                let token = raw.trim().to_string();
                Ok((!token.is_empty()).then_some(token))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The token file is readable by its owner only.
    pub async fn write_token(&self, token: &str) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(TOKEN_MODE);

        let mut file = options.open(self.dir.join(TOKEN_FILE)).await?;
        // `mode` only applies on creation; tighten a file left by older runs.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(TOKEN_MODE))
                .await?;
        }
        file.write_all(token.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn clear_token(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(self.dir.join(TOKEN_FILE)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// A missing or unreadable history file yields an empty history.
    pub async fn load_history(&self) -> Result<SearchHistory, ClientError> {
        let raw = match tokio::fs::read_to_string(self.dir.join(HISTORY_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SearchHistory::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(history) => Ok(history),
            Err(e) => {
                warn!("Ignoring corrupt search history: {}", e);
                Ok(SearchHistory::default())
            }
        }
    }

    pub async fn save_history(&self, history: &SearchHistory) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_vec_pretty(history)
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        tokio::fs::write(self.dir.join(HISTORY_FILE), json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jobprep_core::search::SearchEntry;

    #[tokio::test]
    async fn token_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));

        assert_eq!(store.read_token().await.unwrap(), None);
        store.write_token("abc-123").await.unwrap();
        assert_eq!(store.read_token().await.unwrap().as_deref(), Some("abc-123"));

        store.clear_token().await.unwrap();
        assert_eq!(store.read_token().await.unwrap(), None);
        // Clearing twice is fine.
        store.clear_token().await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        std::fs::write(&path, "old-token").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = LocalStore::new(dir.path());
        store.write_token("new").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.read_token().await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn history_persists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let mut history = store.load_history().await.unwrap();
        assert!(history.is_empty());
        for position in ["first", "second"] {
            history.add(SearchEntry {
                position: position.into(),
                used_cv: false,
                result_count: 3,
                searched_at: Utc::now(),
            });
        }
        store.save_history(&history).await.unwrap();

        let loaded = store.load_history().await.unwrap();
        let positions: Vec<&str> = loaded.entries().map(|e| e.position.as_str()).collect();
        assert_eq!(positions, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn corrupt_history_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(HISTORY_FILE), "{not json").unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.load_history().await.unwrap().is_empty());
    }
}
