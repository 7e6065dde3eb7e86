/// Anomaly analysis orchestrator - sequences extraction, comparison, scoring and regions
use image::DynamicImage;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::analysis_stage::{AnalysisStage, ProgressObserver};
use crate::config::AnalysisConfig;
use crate::error::AppError;
use crate::pipeline::services::features::FeatureExtractor;
use crate::pipeline::services::regions::{RandomSource, RegionSynthesizer, RngSource};
use crate::pipeline::services::scoring::{AnomalyScorer, ScoreOutcome};
use crate::pipeline::services::similarity::SimilarityEngine;
use crate::pipeline::types::{AnomalyReport, GalleryEntry, ImageDescriptor, SimilarityRecord};

/// Cloning is cheap; clones share one random source.
#[derive(Clone)]
pub struct AnomalyOrchestrator {
    extractor: FeatureExtractor,
    engine: SimilarityEngine,
    scorer: AnomalyScorer,
    synthesizer: RegionSynthesizer,
    rng: Arc<Mutex<Box<dyn RandomSource>>>,
    config: AnalysisConfig,
}

impl AnomalyOrchestrator {
    pub fn new(config: AnalysisConfig) -> Result<Self, AppError> {
        config.validate()?;

        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(RngSource::seeded(seed)),
            None => Box::new(RngSource::from_entropy()),
        };

        Ok(Self {
            extractor: FeatureExtractor::new().with_grid_size(config.grid_size),
            engine: SimilarityEngine::from_config(&config),
            scorer: AnomalyScorer::from_config(&config),
            synthesizer: RegionSynthesizer::new().with_threshold(config.region_threshold),
            rng: Arc::new(Mutex::new(rng)),
            config,
        })
    }

    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Arc::new(Mutex::new(rng));
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Decode raw query bytes and analyze them. A decode failure is fatal.
    pub fn analyze_bytes(
        &self,
        bytes: &[u8],
        gallery: &[GalleryEntry],
        progress: &mut dyn ProgressObserver,
    ) -> Result<AnomalyReport, AppError> {
        progress.on_stage(AnalysisStage::ExtractingFeatures);
        let query = self.extractor.extract_bytes(bytes)?;
        Ok(self.analyze_descriptor(&query, gallery, progress))
    }

    pub fn analyze(
        &self,
        image: &DynamicImage,
        gallery: &[GalleryEntry],
        progress: &mut dyn ProgressObserver,
    ) -> Result<AnomalyReport, AppError> {
        progress.on_stage(AnalysisStage::ExtractingFeatures);
        let query = self.extractor.extract(image)?;
        Ok(self.analyze_descriptor(&query, gallery, progress))
    }

    /// Runs every stage after extraction against an already-built query descriptor.
    pub fn analyze_descriptor(
        &self,
        query: &ImageDescriptor,
        gallery: &[GalleryEntry],
        progress: &mut dyn ProgressObserver,
    ) -> AnomalyReport {
        let start = Instant::now();

        progress.on_stage(AnalysisStage::ComparingGallery);
        let mut records = self.compare_gallery(query, gallery);

        progress.on_stage(AnalysisStage::Scoring);
        let similarities: Vec<f32> = records.iter().map(|r| r.similarity).collect();
        let outcome = self.scorer.score(&similarities);

        progress.on_stage(AnalysisStage::SynthesizingRegions);
        let regions = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            self.synthesizer.synthesize(outcome.anomaly_score, rng.as_mut())
        };

        progress.on_stage(AnalysisStage::BuildingReport);
        let summary = Self::summarize(&outcome, records.len());

        // stable: ties keep gallery order
        records.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        records.truncate(self.config.top_similarities);

        info!(
            "Analysis completed in {}us: score {:.3} ({}) against {} references",
            start.elapsed().as_micros(),
            outcome.anomaly_score,
            outcome.status,
            similarities.len()
        );

        AnomalyReport {
            anomaly_score: outcome.anomaly_score,
            status: outcome.status,
            top_similarities: records,
            regions,
            summary,
        }
    }

    fn compare_gallery(
        &self,
        query: &ImageDescriptor,
        gallery: &[GalleryEntry],
    ) -> Vec<SimilarityRecord> {
        gallery
            .iter()
            .filter_map(|entry| {
                let Some(descriptor) = entry.descriptor.as_ref() else {
                    debug!("Skipping reference {}: no descriptor", entry.id);
                    return None;
                };
                if let Err(e) = descriptor.validate() {
                    warn!("Skipping reference {}: {}", entry.id, e);
                    return None;
                }
                Some(SimilarityRecord {
                    reference_id: entry.id,
                    similarity: self.engine.similarity(query, descriptor),
                })
            })
            .collect()
    }

    fn summarize(outcome: &ScoreOutcome, compared: usize) -> String {
        if compared == 0 {
            return "No reference images are available for comparison, so the image could not \
                    be checked against normal samples."
                .to_string();
        }
        format!(
            "Top similarity to the {} reference image{} is {:.1}%. Deviation from normal samples is {} ({}).",
            compared,
            if compared == 1 { "" } else { "s" },
            outcome.max_similarity * 100.0,
            outcome.status.deviation_level(),
            outcome.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::orchestration::NoProgress;
    use crate::pipeline::services::regions::SequenceSource;
    use crate::pipeline::types::AnomalyStatus;
    use image::{ImageBuffer, Rgb};

    fn textured_image(seed: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
            let v = (x * (11 + seed) + y * (5 + seed) + x * y) % 256;
            Rgb([v as u8, ((v + seed * 40) % 256) as u8, (255 - v) as u8])
        }))
    }

    fn orchestrator() -> AnomalyOrchestrator {
        AnomalyOrchestrator::new(AnalysisConfig::default().with_seed(3)).unwrap()
    }

    fn gallery_of(orchestrator: &AnomalyOrchestrator, seeds: &[u32]) -> Vec<GalleryEntry> {
        seeds
            .iter()
            .map(|&seed| {
                let descriptor = orchestrator.extractor().extract(&textured_image(seed)).unwrap();
                GalleryEntry::new(descriptor, "reference")
            })
            .collect()
    }

    #[test]
    fn test_empty_gallery_report() {
        let orchestrator = orchestrator();
        let report = orchestrator
            .analyze(&textured_image(1), &[], &mut NoProgress)
            .unwrap();

        assert_eq!(report.anomaly_score, 1.0);
        assert_eq!(report.status, AnomalyStatus::AnomalyDetected);
        assert!(report.top_similarities.is_empty());
        assert!(report.summary.contains("No reference images"));
        assert_eq!(report.regions.len(), 3);
    }

    #[test]
    fn test_identical_reference_is_normal() {
        let orchestrator = orchestrator();
        let gallery = gallery_of(&orchestrator, &[1]);
        let report = orchestrator
            .analyze(&textured_image(1), &gallery, &mut NoProgress)
            .unwrap();

        // 1 - (0.7 * 2.2 + 0.3 * 2.2)
        assert!((report.anomaly_score + 1.2).abs() < 1e-4);
        assert_eq!(report.status, AnomalyStatus::Normal);
        assert!(report.regions.is_empty());
        assert_eq!(report.top_similarities[0].reference_id, gallery[0].id);
        assert!(report.summary.contains("220.0%"));
    }

    #[test]
    fn test_top_similarities_sorted_and_truncated() {
        let orchestrator = orchestrator();
        let gallery = gallery_of(&orchestrator, &[1, 2, 3, 4, 5, 6, 7]);
        let report = orchestrator
            .analyze(&textured_image(4), &gallery, &mut NoProgress)
            .unwrap();

        assert_eq!(report.top_similarities.len(), 5);
        for pair in report.top_similarities.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert_eq!(report.top_similarities[0].reference_id, gallery[3].id);
    }

    #[test]
    fn test_skips_missing_and_corrupt_descriptors() {
        let orchestrator = orchestrator();
        let mut gallery = gallery_of(&orchestrator, &[1, 2]);
        gallery.push(GalleryEntry::without_descriptor("reference"));

        let corrupt: GalleryEntry = serde_json::from_value(serde_json::json!({
            "id": uuid::Uuid::new_v4(),
            "descriptor": { "colorHistogram": [1.0, 1.0], "textureFeatures": [0.5] },
            "category": "reference",
            "createdAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        gallery.push(corrupt);

        let report = orchestrator
            .analyze(&textured_image(2), &gallery, &mut NoProgress)
            .unwrap();

        assert_eq!(report.top_similarities.len(), 2);
        assert!(report.summary.contains("2 reference images"));
    }

    #[test]
    fn test_gallery_without_usable_descriptors_degrades() {
        let orchestrator = orchestrator();
        let gallery = vec![GalleryEntry::without_descriptor("reference")];
        let report = orchestrator
            .analyze(&textured_image(2), &gallery, &mut NoProgress)
            .unwrap();

        assert_eq!(report.anomaly_score, 1.0);
        assert!(report.top_similarities.is_empty());
    }

    #[test]
    fn test_progress_reports_every_stage_in_order() {
        let orchestrator = orchestrator();
        let gallery = gallery_of(&orchestrator, &[1]);
        let mut stages = Vec::new();
        let mut observer = |stage: AnalysisStage| stages.push(stage);

        orchestrator
            .analyze(&textured_image(2), &gallery, &mut observer)
            .unwrap();

        assert_eq!(stages, AnalysisStage::ALL.to_vec());
    }

    #[test]
    fn test_decode_failure_is_fatal() {
        let orchestrator = orchestrator();
        let gallery = gallery_of(&orchestrator, &[1]);
        let result = orchestrator.analyze_bytes(b"\x89PNG broken", &gallery, &mut NoProgress);
        assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[test]
    fn test_injected_random_source_fixes_regions() {
        let orchestrator =
            orchestrator().with_random_source(Box::new(SequenceSource::new(vec![0.5])));
        let report = orchestrator
            .analyze(&textured_image(1), &[], &mut NoProgress)
            .unwrap();

        for region in &report.regions {
            assert!((region.x - 0.4).abs() < 1e-6);
            assert!((region.width - 0.25).abs() < 1e-6);
            assert!((region.score - 0.85).abs() < 1e-6);
        }
    }

    #[test]
    fn test_clones_share_random_source() {
        // empty gallery: score 1.0, three regions of five draws each
        let mut values = vec![0.0; 15];
        values.extend(vec![0.5; 15]);
        let original =
            orchestrator().with_random_source(Box::new(SequenceSource::new(values)));
        let copy = original.clone();

        let first = original
            .analyze(&textured_image(1), &[], &mut NoProgress)
            .unwrap();
        let second = copy
            .analyze(&textured_image(1), &[], &mut NoProgress)
            .unwrap();

        assert!(first.regions.iter().all(|r| (r.x - 0.1).abs() < 1e-6));
        assert!(second.regions.iter().all(|r| (r.x - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            top_similarities: 0,
            ..AnalysisConfig::default()
        };
        assert!(AnomalyOrchestrator::new(config).is_err());
    }
}
