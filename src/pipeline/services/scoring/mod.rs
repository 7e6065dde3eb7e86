pub mod anomaly_scorer;

pub use anomaly_scorer::{AnomalyScorer, ScoreOutcome};
