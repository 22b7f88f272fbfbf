//! Durable client-side storage of the selected conversation

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::conversation::ConversationId;
use crate::error::{Result, StoreError};

#[derive(Serialize, Deserialize, Debug, Default)]
struct StoredState {
    selected_conversation: Option<ConversationId>,
}

/// One-key store for the selected conversation id, kept as a JSON file
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/lugia/state.json`
    pub fn default_location() -> anyhow::Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(Self::new(data_dir.join("lugia").join("state.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<ConversationId>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(storage_error)?;
        let state: StoredState = serde_json::from_str(&content)
            .map_err(|e| StoreError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(state.selected_conversation)
    }

    pub fn save(&self, id: &ConversationId) -> Result<()> {
        self.write(&StoredState {
            selected_conversation: Some(id.clone()),
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&StoredState::default())
    }

    fn write(&self, state: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content).map_err(storage_error)
    }
}

fn storage_error(err: std::io::Error) -> StoreError {
    StoreError::Storage(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SelectionStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = SelectionStore::new(dir.path().join("nested").join("state.json"));

        let id = ConversationId::new("conversation_20240610_120000.json");
        store.save(&id).unwrap();
        assert_eq!(store.load().unwrap(), Some(id));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let err = SelectionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }
}
