/// Concurrent gallery ingestion: decode + extract reference images on a bounded worker pool
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::AppError;
use crate::pipeline::services::features::FeatureExtractor;
use crate::pipeline::types::{GalleryEntry, ImageDescriptor};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

/// Where a reference image's encoded bytes come from.
#[derive(Debug, Clone)]
pub enum SourceContent {
    Bytes(Vec<u8>),
    /// Read lazily by the worker that extracts it.
    File(PathBuf),
}

impl SourceContent {
    async fn load(self) -> Result<Vec<u8>, AppError> {
        match self {
            SourceContent::Bytes(bytes) => Ok(bytes),
            SourceContent::File(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

/// One reference image waiting to be ingested.
#[derive(Debug, Clone)]
pub struct IngestSource {
    /// Used only in log messages, usually the file path.
    pub label: String,
    pub category: String,
    pub content: SourceContent,
}

impl IngestSource {
    pub fn from_bytes(
        label: impl Into<String>,
        category: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            label: label.into(),
            category: category.into(),
            content: SourceContent::Bytes(bytes),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, category: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            category: category.into(),
            content: SourceContent::File(path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestReport {
    /// One entry per source, in input order. Failed sources have no descriptor.
    pub entries: Vec<GalleryEntry>,
    pub skipped: usize,
}

impl IngestReport {
    pub fn usable(&self) -> usize {
        self.entries.len() - self.skipped
    }
}

pub struct GalleryBuilder {
    extractor: Arc<FeatureExtractor>,
    workers: usize,
}

impl GalleryBuilder {
    pub fn new(extractor: FeatureExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            workers: 4,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Build descriptors for every source, at most `workers` at a time.
    ///
    /// A source that cannot be read or decoded is logged and kept as an
    /// entry without a descriptor; it never fails the batch.
    pub async fn ingest(&self, sources: Vec<IngestSource>) -> IngestReport {
        let start = Instant::now();
        let total = sources.len();

        let mut outcomes: Vec<_> = stream::iter(sources.into_iter().enumerate())
            .map(|(index, source)| {
                let extractor = Arc::clone(&self.extractor);
                async move {
                    let IngestSource {
                        label,
                        category,
                        content,
                    } = source;
                    let result = describe_source(extractor, content).await;
                    (index, label, category, result)
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;
        outcomes.sort_by_key(|(index, ..)| *index);

        let mut skipped = 0;
        let entries = outcomes
            .into_iter()
            .map(|(_, label, category, result)| match result {
                Ok(descriptor) => GalleryEntry::new(descriptor, category),
                Err(e) => {
                    warn!("Skipping reference image {}: {}", label, e);
                    skipped += 1;
                    GalleryEntry::without_descriptor(category)
                }
            })
            .collect();

        info!(
            "Ingested {} reference images ({} skipped) in {}ms",
            total,
            skipped,
            start.elapsed().as_millis()
        );

        IngestReport { entries, skipped }
    }

    /// Ingest every raster image directly inside `dir`.
    ///
    /// The category defaults to the directory name.
    pub async fn ingest_directory(
        &self,
        dir: &Path,
        category: Option<&str>,
    ) -> Result<IngestReport, AppError> {
        let category = match category {
            Some(category) => category.to_string(),
            None => dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "reference".to_string()),
        };

        let sources = list_images(dir)
            .await?
            .into_iter()
            .map(|path| IngestSource::from_path(path, category.clone()))
            .collect();

        Ok(self.ingest(sources).await)
    }
}

async fn describe_source(
    extractor: Arc<FeatureExtractor>,
    content: SourceContent,
) -> Result<ImageDescriptor, AppError> {
    let bytes = content.load().await?;
    tokio::task::spawn_blocking(move || extractor.extract_bytes(&bytes)).await?
}

/// Image files directly inside `dir`, symlinks followed, sorted by path.
async fn list_images(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_image_path(&path) {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
