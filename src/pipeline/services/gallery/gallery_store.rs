use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::AppError;
use crate::pipeline::types::GalleryEntry;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GallerySnapshot {
    pub version: u32,
    pub entries: Vec<GalleryEntry>,
}

impl GallerySnapshot {
    pub fn new(entries: Vec<GalleryEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries,
        }
    }
}

/// Persistence seam for gallery entries.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn load(&self) -> Result<Vec<GalleryEntry>, AppError>;
    async fn save(&self, entries: &[GalleryEntry]) -> Result<(), AppError>;
}

/// Stores the whole gallery as one pretty-printed JSON document.
pub struct JsonFileGalleryStore {
    path: PathBuf,
}

impl JsonFileGalleryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GalleryStore for JsonFileGalleryStore {
    async fn load(&self) -> Result<Vec<GalleryEntry>, AppError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let snapshot: GallerySnapshot = serde_json::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AppError::InvalidInput(format!(
                "unsupported gallery snapshot version {}",
                snapshot.version
            )));
        }
        debug!(
            "Loaded {} gallery entries from {}",
            snapshot.entries.len(),
            self.path.display()
        );
        Ok(snapshot.entries)
    }

    async fn save(&self, entries: &[GalleryEntry]) -> Result<(), AppError> {
        let snapshot = GallerySnapshot::new(entries.to_vec());
        let json = serde_json::to_vec_pretty(&snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        debug!(
            "Saved {} gallery entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}
