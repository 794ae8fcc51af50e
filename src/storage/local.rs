//! Local filesystem state store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::SyncState;
use crate::storage::{StateStore, read_optional, write_atomic};

/// JSON state file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load(&self) -> Result<SyncState> {
        let bytes = read_optional(&self.path)
            .await
            .map_err(|e| AppError::state_io(&self.path, e))?;

        match bytes {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| AppError::state_io(&self.path, e))
            }
            None => {
                log::info!("No state at {}, starting fresh", self.path.display());
                Ok(SyncState::default())
            }
        }
    }

    async fn save(&self, state: &SyncState) -> Result<()> {
        let bytes =
            serde_json::to_vec_pretty(state).map_err(|e| AppError::state_io(&self.path, e))?;
        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| AppError::state_io(&self.path, e))
    }
}
