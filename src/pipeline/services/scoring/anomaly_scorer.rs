use crate::config::AnalysisConfig;
use crate::pipeline::types::AnomalyStatus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutcome {
    pub anomaly_score: f32,
    pub status: AnomalyStatus,
    pub max_similarity: f32,
    pub mean_similarity: f32,
}

/// Turns gallery similarities into a single anomaly score and status.
///
/// The score is `1 - (0.7 * max + 0.3 * mean)` and is not clamped: fused
/// similarities above 1 push it negative.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    max_weight: f32,
    mean_weight: f32,
    warning_threshold: f32,
    anomaly_threshold: f32,
}

impl AnomalyScorer {
    pub fn new() -> Self {
        Self {
            max_weight: 0.7,
            mean_weight: 0.3,
            warning_threshold: 0.3,
            anomaly_threshold: 0.6,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            max_weight: config.max_weight,
            mean_weight: config.mean_weight,
            warning_threshold: config.warning_threshold,
            anomaly_threshold: config.anomaly_threshold,
        }
    }

    pub fn score(&self, similarities: &[f32]) -> ScoreOutcome {
        let (max_similarity, mean_similarity) = if similarities.is_empty() {
            (0.0, 0.0)
        } else {
            let max = similarities.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let mean = similarities.iter().sum::<f32>() / similarities.len() as f32;
            (max, mean)
        };

        let anomaly_score =
            1.0 - (self.max_weight * max_similarity + self.mean_weight * mean_similarity);

        ScoreOutcome {
            anomaly_score,
            status: self.classify(anomaly_score),
            max_similarity,
            mean_similarity,
        }
    }

    /// Half-open bands: `< warning` is normal, `< anomaly` is warning.
    pub fn classify(&self, anomaly_score: f32) -> AnomalyStatus {
        if anomaly_score < self.warning_threshold {
            AnomalyStatus::Normal
        } else if anomaly_score < self.anomaly_threshold {
            AnomalyStatus::Warning
        } else {
            AnomalyStatus::AnomalyDetected
        }
    }
}

impl Default for AnomalyScorer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_boundaries() {
        let scorer = AnomalyScorer::new();
        assert_eq!(scorer.classify(0.3), AnomalyStatus::Warning);
        assert_eq!(scorer.classify(0.2999), AnomalyStatus::Normal);
        assert_eq!(scorer.classify(0.5999), AnomalyStatus::Warning);
        assert_eq!(scorer.classify(0.6), AnomalyStatus::AnomalyDetected);
        assert_eq!(scorer.classify(-0.5), AnomalyStatus::Normal);
        assert_eq!(scorer.classify(1.0), AnomalyStatus::AnomalyDetected);
    }

    #[test]
    fn test_empty_gallery_scores_one() {
        let outcome = AnomalyScorer::new().score(&[]);
        assert_eq!(outcome.anomaly_score, 1.0);
        assert_eq!(outcome.status, AnomalyStatus::AnomalyDetected);
        assert_eq!(outcome.max_similarity, 0.0);
        assert_eq!(outcome.mean_similarity, 0.0);
    }

    #[test]
    fn test_weighted_max_and_mean() {
        let outcome = AnomalyScorer::new().score(&[0.2, 0.8, 0.5]);
        assert!((outcome.max_similarity - 0.8).abs() < 1e-6);
        assert!((outcome.mean_similarity - 0.5).abs() < 1e-6);
        // 1 - (0.56 + 0.15)
        assert!((outcome.anomaly_score - 0.29).abs() < 1e-6);
        assert_eq!(outcome.status, AnomalyStatus::Normal);
    }

    #[test]
    fn test_unbounded_similarity_goes_negative() {
        let outcome = AnomalyScorer::new().score(&[2.2, 2.2]);
        assert!((outcome.anomaly_score + 1.2).abs() < 1e-5);
        assert_eq!(outcome.status, AnomalyStatus::Normal);
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = AnalysisConfig {
            warning_threshold: 0.1,
            anomaly_threshold: 0.2,
            ..AnalysisConfig::default()
        };
        let scorer = AnomalyScorer::from_config(&config);
        assert_eq!(scorer.classify(0.15), AnomalyStatus::Warning);
        assert_eq!(scorer.classify(0.25), AnomalyStatus::AnomalyDetected);
    }
}
