use crate::config::AnalysisConfig;
use crate::pipeline::types::ImageDescriptor;

/// Breakdown of one descriptor comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityBreakdown {
    /// Histogram intersection over all three channels, in `[0, 3]`.
    pub color: f32,
    /// Cosine similarity of the texture vectors, in `[0, 1]`.
    pub texture: f32,
    pub combined: f32,
}

/// Fuses color histogram intersection with texture cosine similarity.
///
/// The color term is not normalized by the channel count, so `combined`
/// reaches 2.2 for identical descriptors with the default weights.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    color_weight: f32,
    texture_weight: f32,
}

impl SimilarityEngine {
    pub fn new() -> Self {
        Self {
            color_weight: 0.6,
            texture_weight: 0.4,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            color_weight: config.color_weight,
            texture_weight: config.texture_weight,
        }
    }

    pub fn similarity(&self, a: &ImageDescriptor, b: &ImageDescriptor) -> f32 {
        self.compare(a, b).combined
    }

    pub fn compare(&self, a: &ImageDescriptor, b: &ImageDescriptor) -> SimilarityBreakdown {
        let color = histogram_intersection(a.color_histogram(), b.color_histogram());
        let texture = texture_similarity(a, b);
        SimilarityBreakdown {
            color,
            texture,
            combined: self.color_weight * color + self.texture_weight * texture,
        }
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of element-wise minimums.
pub fn histogram_intersection(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x.min(*y)).sum()
}

/// Cosine similarity, defined as 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Texture term of the fused similarity.
///
/// An image with no gradient at all still puts every edge sample in the
/// first histogram bin, so its texture vector is not the zero vector. It is
/// treated as carrying no texture information and scores 0 against anything.
pub fn texture_similarity(a: &ImageDescriptor, b: &ImageDescriptor) -> f32 {
    if is_flat(a) || is_flat(b) {
        return 0.0;
    }
    cosine_similarity(a.texture_features(), b.texture_features())
}

fn is_flat(descriptor: &ImageDescriptor) -> bool {
    descriptor.mean_edge_magnitude() == 0.0
}
