/// Color + texture descriptor extraction on a fixed resampling grid
use image::{imageops::FilterType, DynamicImage, RgbImage};
use std::time::Instant;
use tracing::debug;

use crate::error::AppError;
use crate::pipeline::types::{
    ImageDescriptor, COLOR_BINS_PER_CHANNEL, COLOR_CHANNELS, COLOR_HISTOGRAM_LEN,
    EDGE_HISTOGRAM_BINS,
};

const CHANNEL_BIN_WIDTH: usize = 256 / COLOR_BINS_PER_CHANNEL;
const EDGE_BIN_WIDTH: f32 = 32.0;

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    grid_size: u32,
    filter: FilterType,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self {
            grid_size: 64,
            filter: FilterType::Triangle,
        }
    }

    pub fn with_grid_size(mut self, grid_size: u32) -> Self {
        self.grid_size = grid_size.max(3);
        self
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Decode raw image bytes and extract their descriptor.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<ImageDescriptor, AppError> {
        let image = image::load_from_memory(bytes)?;
        self.extract(&image)
    }

    pub fn extract(&self, image: &DynamicImage) -> Result<ImageDescriptor, AppError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(AppError::InvalidInput(format!(
                "image has zero size ({}x{})",
                image.width(),
                image.height()
            )));
        }

        let start = Instant::now();
        let canonical = image
            .resize_exact(self.grid_size, self.grid_size, self.filter)
            .to_rgb8();

        let color = self.color_histogram(&canonical);
        let texture = self.texture_features(&canonical);

        debug!(
            "Extracted descriptor from {}x{} image in {}us",
            image.width(),
            image.height(),
            start.elapsed().as_micros()
        );

        ImageDescriptor::new(color, texture)
    }

    /// Three concatenated 16-bin channel histograms (R, G, B), each
    /// normalized by the pixel count.
    fn color_histogram(&self, image: &RgbImage) -> Vec<f32> {
        let mut counts = [0u32; COLOR_HISTOGRAM_LEN];

        for pixel in image.pixels() {
            for channel in 0..COLOR_CHANNELS {
                let bin = pixel[channel] as usize / CHANNEL_BIN_WIDTH;
                counts[channel * COLOR_BINS_PER_CHANNEL + bin] += 1;
            }
        }

        let total = (image.width() * image.height()) as f32;
        counts.iter().map(|&c| c as f32 / total).collect()
    }

    fn rgb_to_luma(&self, r: u8, g: u8, b: u8) -> f32 {
        // Rec. 601 luma
        0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
    }

    /// `[mean/255, std/255, 8 edge-magnitude bins]` over interior pixels.
    fn texture_features(&self, image: &RgbImage) -> Vec<f32> {
        let (width, height) = image.dimensions();
        let luma: Vec<f32> = image
            .pixels()
            .map(|p| self.rgb_to_luma(p[0], p[1], p[2]))
            .collect();
        let at = |x: u32, y: u32| luma[(y * width + x) as usize];

        let mut magnitudes = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let gx = at(x + 1, y) - at(x - 1, y);
                let gy = at(x, y + 1) - at(x, y - 1);
                magnitudes.push((gx * gx + gy * gy).sqrt());
            }
        }

        let n = magnitudes.len() as f32;
        let mean = magnitudes.iter().sum::<f32>() / n;
        let variance = magnitudes.iter().map(|m| (m - mean) * (m - mean)).sum::<f32>() / n;

        let mut bins = [0u32; EDGE_HISTOGRAM_BINS];
        for m in &magnitudes {
            let bin = ((m / EDGE_BIN_WIDTH) as usize).min(EDGE_HISTOGRAM_BINS - 1);
            bins[bin] += 1;
        }

        let mut features = Vec::with_capacity(2 + EDGE_HISTOGRAM_BINS);
        features.push(mean / 255.0);
        features.push(variance.sqrt() / 255.0);
        features.extend(bins.iter().map(|&c| c as f32 / n));
        features
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
