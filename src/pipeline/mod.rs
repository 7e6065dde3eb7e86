pub mod services;
pub mod types;

pub use services::{
    AnalysisService, AnomalyOrchestrator, AnomalyScorer, FeatureExtractor, GalleryBuilder,
    RegionSynthesizer, SimilarityEngine,
};
pub use types::{
    AnomalyReport, AnomalyStatus, GalleryEntry, ImageDescriptor, Region, Severity,
    SimilarityRecord,
};
