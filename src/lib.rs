//! refscan: reference-gallery anomaly scoring for images.
//!
//! A query image is reduced to a color + texture descriptor, compared with
//! descriptors of known-normal reference images, and the similarities are
//! fused into an anomaly score, a status and a set of illustrative regions.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{AnalysisConfig, Configuration};
pub use error::{AppError, DescriptorPart};
pub use pipeline::services::orchestration::{AnalysisStage, NoProgress, ProgressObserver};
pub use pipeline::{
    AnalysisService, AnomalyOrchestrator, AnomalyReport, AnomalyStatus, FeatureExtractor,
    GalleryBuilder, GalleryEntry, ImageDescriptor, Region, Severity, SimilarityRecord,
};

/// Decode an encoded image and build its descriptor with default settings.
pub fn build_descriptor(bytes: &[u8]) -> Result<ImageDescriptor, AppError> {
    FeatureExtractor::default().extract_bytes(bytes)
}

/// Analyze an encoded query image against a gallery with default settings.
pub fn analyze(
    query: &[u8],
    gallery: &[GalleryEntry],
    progress: &mut dyn ProgressObserver,
) -> Result<AnomalyReport, AppError> {
    AnomalyOrchestrator::new(AnalysisConfig::default())?.analyze_bytes(query, gallery, progress)
}
