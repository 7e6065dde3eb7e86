use tracing::info;

/// Checkpoints of a single analysis call, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisStage {
    /// Decoding the query image and building its descriptor
    ExtractingFeatures,
    /// Comparing the query descriptor against every gallery descriptor
    ComparingGallery,
    Scoring,
    SynthesizingRegions,
    BuildingReport,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 5] = [
        AnalysisStage::ExtractingFeatures,
        AnalysisStage::ComparingGallery,
        AnalysisStage::Scoring,
        AnalysisStage::SynthesizingRegions,
        AnalysisStage::BuildingReport,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisStage::ExtractingFeatures => "extracting_features",
            AnalysisStage::ComparingGallery => "comparing_gallery",
            AnalysisStage::Scoring => "scoring",
            AnalysisStage::SynthesizingRegions => "synthesizing_regions",
            AnalysisStage::BuildingReport => "building_report",
        }
    }

    /// Fraction of the pipeline completed once this stage has started.
    pub fn progress(&self) -> f32 {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        index as f32 / Self::ALL.len() as f32
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Observer notified before each stage starts. Purely observational.
pub trait ProgressObserver {
    fn on_stage(&mut self, stage: AnalysisStage);
}

impl<F: FnMut(AnalysisStage)> ProgressObserver for F {
    fn on_stage(&mut self, stage: AnalysisStage) {
        self(stage)
    }
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_stage(&mut self, _stage: AnalysisStage) {}
}

/// Logs every stage at info level.
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_stage(&mut self, stage: AnalysisStage) {
        info!(
            "Analysis stage: {} ({:.0}%)",
            stage,
            stage.progress() * 100.0
        );
    }
}
