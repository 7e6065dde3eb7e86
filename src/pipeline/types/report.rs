use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Region;
use crate::error::AppError;

/// Categorical reading of an anomaly score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Normal,
    Warning,
    AnomalyDetected,
}

impl AnomalyStatus {
    pub fn name(&self) -> &'static str {
        match self {
            AnomalyStatus::Normal => "normal",
            AnomalyStatus::Warning => "warning",
            AnomalyStatus::AnomalyDetected => "anomaly_detected",
        }
    }

    /// Qualitative deviation wording used in report summaries.
    pub fn deviation_level(&self) -> &'static str {
        match self {
            AnomalyStatus::Normal => "low",
            AnomalyStatus::Warning => "moderate",
            AnomalyStatus::AnomalyDetected => "high",
        }
    }
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityRecord {
    pub reference_id: Uuid,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub anomaly_score: f32,
    pub status: AnomalyStatus,
    /// Best gallery matches, highest similarity first.
    pub top_similarities: Vec<SimilarityRecord>,
    pub regions: Vec<Region>,
    pub summary: String,
}

impl AnomalyReport {
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Severity;

    #[test]
    fn test_report_serializes_flat_json() {
        let id = Uuid::new_v4();
        let report = AnomalyReport {
            anomaly_score: 0.75,
            status: AnomalyStatus::AnomalyDetected,
            top_similarities: vec![SimilarityRecord {
                reference_id: id,
                similarity: 0.25,
            }],
            regions: vec![Region {
                x: 0.2,
                y: 0.3,
                width: 0.2,
                height: 0.2,
                severity: Severity::High,
                score: 0.6,
            }],
            summary: "test".to_string(),
        };

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["status"], "anomaly_detected");
        assert_eq!(value["anomalyScore"], 0.75);
        assert_eq!(value["topSimilarities"][0]["referenceId"], id.to_string());
        assert_eq!(value["regions"][0]["severity"], "high");

        let parsed: AnomalyReport = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, report);
    }
}
