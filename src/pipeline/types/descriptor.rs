use serde::{Deserialize, Serialize};

use crate::error::{AppError, DescriptorPart};

pub const COLOR_BINS_PER_CHANNEL: usize = 16;
pub const COLOR_CHANNELS: usize = 3;
pub const COLOR_HISTOGRAM_LEN: usize = COLOR_BINS_PER_CHANNEL * COLOR_CHANNELS;
pub const EDGE_HISTOGRAM_BINS: usize = 8;
/// Mean and standard deviation of edge magnitude, then the edge histogram.
pub const TEXTURE_FEATURES_LEN: usize = 2 + EDGE_HISTOGRAM_BINS;
pub const DESCRIPTOR_LEN: usize = COLOR_HISTOGRAM_LEN + TEXTURE_FEATURES_LEN;

/// Fixed-length color + texture summary of one image.
///
/// The two halves are kept as separate named fields so a change to either
/// length can never shift the boundary between them. Values are immutable
/// once built; a descriptor read back from storage should go through
/// [`ImageDescriptor::validate`] before it is compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    color_histogram: Vec<f32>,
    texture_features: Vec<f32>,
}

impl ImageDescriptor {
    pub fn new(color_histogram: Vec<f32>, texture_features: Vec<f32>) -> Result<Self, AppError> {
        let descriptor = Self {
            color_histogram,
            texture_features,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Splits a flat 58-value vector at the color/texture boundary.
    pub fn from_flat(values: &[f32]) -> Result<Self, AppError> {
        if values.len() != DESCRIPTOR_LEN {
            return Err(AppError::InvalidDescriptor {
                part: DescriptorPart::Flat,
                expected: DESCRIPTOR_LEN,
                found: values.len(),
            });
        }
        let (color, texture) = values.split_at(COLOR_HISTOGRAM_LEN);
        Self::new(color.to_vec(), texture.to_vec())
    }

    pub fn to_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(DESCRIPTOR_LEN);
        flat.extend_from_slice(&self.color_histogram);
        flat.extend_from_slice(&self.texture_features);
        flat
    }

    pub fn validate(&self) -> Result<(), AppError> {
        check_part(
            &self.color_histogram,
            COLOR_HISTOGRAM_LEN,
            DescriptorPart::ColorHistogram,
        )?;
        check_part(
            &self.texture_features,
            TEXTURE_FEATURES_LEN,
            DescriptorPart::TextureFeatures,
        )
    }

    pub fn color_histogram(&self) -> &[f32] {
        &self.color_histogram
    }

    /// One 16-bin sub-histogram; channels are ordered R, G, B.
    /// `None` for a channel index past B.
    pub fn channel_histogram(&self, channel: usize) -> Option<&[f32]> {
        if channel >= COLOR_CHANNELS {
            return None;
        }
        let start = channel * COLOR_BINS_PER_CHANNEL;
        self.color_histogram.get(start..start + COLOR_BINS_PER_CHANNEL)
    }

    pub fn texture_features(&self) -> &[f32] {
        &self.texture_features
    }

    pub fn mean_edge_magnitude(&self) -> f32 {
        self.texture_features[0]
    }

    pub fn std_edge_magnitude(&self) -> f32 {
        self.texture_features[1]
    }

    pub fn edge_histogram(&self) -> &[f32] {
        &self.texture_features[2..]
    }
}

fn check_part(values: &[f32], expected: usize, part: DescriptorPart) -> Result<(), AppError> {
    if values.len() != expected {
        return Err(AppError::InvalidDescriptor {
            part,
            expected,
            found: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::NonFiniteDescriptor(part));
    }
    Ok(())
}
