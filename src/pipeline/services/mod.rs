pub mod features;
pub mod gallery;
pub mod orchestration;
pub mod regions;
pub mod scoring;
pub mod similarity;

pub use features::FeatureExtractor;
pub use gallery::{GalleryBuilder, GalleryStore, JsonFileGalleryStore};
pub use orchestration::{AnalysisService, AnomalyOrchestrator, ProgressObserver};
pub use regions::{RandomSource, RegionSynthesizer};
pub use scoring::AnomalyScorer;
pub use similarity::SimilarityEngine;
