pub mod analysis_service;
pub mod analysis_stage;
pub mod anomaly_orchestrator;

pub use analysis_service::{AnalysisRequest, AnalysisService, QueryImage};
pub use analysis_stage::{AnalysisStage, NoProgress, ProgressObserver, TracingProgress};
pub use anomaly_orchestrator::AnomalyOrchestrator;
