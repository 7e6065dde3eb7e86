use super::random_source::RandomSource;
use crate::pipeline::types::{Region, Severity};

const CENTER_RANGE: (f32, f32) = (0.1, 0.7);
const SIZE_RANGE: (f32, f32) = (0.15, 0.35);
/// Per-region score factor is `0.7 + uniform[0, 0.3)`.
const SCORE_FACTOR_BASE: f32 = 0.7;
const SCORE_FACTOR_SPREAD: f32 = 0.3;

/// Produces illustrative regions for a report overlay.
///
/// Placement is random; nothing here looks at pixels. The number of regions
/// and their shared severity follow from the anomaly score alone.
#[derive(Debug, Clone)]
pub struct RegionSynthesizer {
    threshold: f32,
}

impl RegionSynthesizer {
    pub fn new() -> Self {
        Self { threshold: 0.3 }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn synthesize(&self, anomaly_score: f32, rng: &mut dyn RandomSource) -> Vec<Region> {
        if anomaly_score <= self.threshold {
            return Vec::new();
        }

        let count = (anomaly_score * 3.0).ceil() as usize;
        let severity = Self::severity_for(anomaly_score);

        (0..count)
            .map(|_| Region {
                x: uniform(rng, CENTER_RANGE),
                y: uniform(rng, CENTER_RANGE),
                width: uniform(rng, SIZE_RANGE),
                height: uniform(rng, SIZE_RANGE),
                severity,
                score: anomaly_score * (SCORE_FACTOR_BASE + rng.next_float() * SCORE_FACTOR_SPREAD),
            })
            .collect()
    }

    pub fn severity_for(anomaly_score: f32) -> Severity {
        if anomaly_score > 0.7 {
            Severity::High
        } else if anomaly_score > 0.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl Default for RegionSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

fn uniform(rng: &mut dyn RandomSource, (low, high): (f32, f32)) -> f32 {
    low + rng.next_float() * (high - low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::regions::{RngSource, SequenceSource};

    #[test]
    fn test_no_regions_at_threshold() {
        let mut rng = RngSource::seeded(1);
        assert!(RegionSynthesizer::new().synthesize(0.3, &mut rng).is_empty());
        assert!(RegionSynthesizer::new().synthesize(-0.4, &mut rng).is_empty());
    }

    #[test]
    fn test_low_score_gives_two_low_regions() {
        let mut rng = RngSource::seeded(7);
        let regions = RegionSynthesizer::new().synthesize(0.35, &mut rng);
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.severity == Severity::Low));
    }

    #[test]
    fn test_high_score_gives_three_high_regions() {
        let mut rng = RngSource::seeded(7);
        let regions = RegionSynthesizer::new().synthesize(0.75, &mut rng);
        assert_eq!(regions.len(), 3);
        assert!(regions.iter().all(|r| r.severity == Severity::High));
    }

    #[test]
    fn test_medium_band() {
        assert_eq!(RegionSynthesizer::severity_for(0.6), Severity::Medium);
        assert_eq!(RegionSynthesizer::severity_for(0.5), Severity::Low);
        assert_eq!(RegionSynthesizer::severity_for(0.7), Severity::Medium);
    }

    #[test]
    fn test_exact_placement_from_scripted_source() {
        let mut rng = SequenceSource::new(vec![0.0, 0.5, 0.25, 0.75, 0.5]);
        let regions = RegionSynthesizer::new().synthesize(0.35, &mut rng);

        let first = regions[0];
        assert!((first.x - 0.1).abs() < 1e-6);
        assert!((first.y - 0.4).abs() < 1e-6);
        assert!((first.width - 0.2).abs() < 1e-6);
        assert!((first.height - 0.3).abs() < 1e-6);
        assert!((first.score - 0.35 * 0.85).abs() < 1e-6);
        assert_eq!(regions[1], first);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut rng = RngSource::seeded(99);
        let synthesizer = RegionSynthesizer::new();
        for step in 31..=100 {
            let score = step as f32 / 100.0;
            for region in synthesizer.synthesize(score, &mut rng) {
                assert!((0.1..=0.7).contains(&region.x));
                assert!((0.1..=0.7).contains(&region.y));
                assert!((0.15..=0.35).contains(&region.width));
                assert!((0.15..=0.35).contains(&region.height));
                assert!(region.score >= score * 0.7 - 1e-6);
                assert!(region.score <= score + 1e-6);
            }
        }
    }
}
