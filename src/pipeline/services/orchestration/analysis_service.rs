use image::DynamicImage;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

use super::analysis_stage::TracingProgress;
use super::anomaly_orchestrator::AnomalyOrchestrator;
use crate::error::AppError;
use crate::pipeline::types::{AnomalyReport, GalleryEntry};

#[derive(Debug, Clone)]
pub enum QueryImage {
    Encoded(Arc<Vec<u8>>),
    Decoded(Arc<DynamicImage>),
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub query: QueryImage,
    pub gallery: Arc<Vec<GalleryEntry>>,
}

impl AnalysisRequest {
    pub fn from_bytes(bytes: Vec<u8>, gallery: Arc<Vec<GalleryEntry>>) -> Self {
        Self {
            query: QueryImage::Encoded(Arc::new(bytes)),
            gallery,
        }
    }

    pub fn from_image(image: DynamicImage, gallery: Arc<Vec<GalleryEntry>>) -> Self {
        Self {
            query: QueryImage::Decoded(Arc::new(image)),
            gallery,
        }
    }
}

/// Tower adapter so callers can wrap analyses in layers (timeouts,
/// concurrency limits) without this crate imposing any.
///
/// Each call runs on the blocking pool, so the returned future stays
/// pending until the analysis finishes and outer layers can time it out.
#[derive(Clone)]
pub struct AnalysisService {
    orchestrator: AnomalyOrchestrator,
}

impl AnalysisService {
    pub fn new(orchestrator: AnomalyOrchestrator) -> Self {
        Self { orchestrator }
    }
}

impl Service<AnalysisRequest> for AnalysisService {
    type Response = AnomalyReport;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: AnalysisRequest) -> Self::Future {
        let orchestrator = self.orchestrator.clone();

        Box::pin(async move {
            // extraction and comparison are CPU-bound; keep them off the async workers
            let result = tokio::task::spawn_blocking(move || {
                let mut progress = TracingProgress;
                match &request.query {
                    QueryImage::Encoded(bytes) => {
                        orchestrator.analyze_bytes(bytes, &request.gallery, &mut progress)
                    }
                    QueryImage::Decoded(image) => {
                        orchestrator.analyze(image, &request.gallery, &mut progress)
                    }
                }
            })
            .await
            .map_err(AppError::from)
            .and_then(|r| r);

            if let Err(e) = &result {
                tracing::error!("Anomaly analysis failed: {}", e);
            }
            result
        })
    }
}
