use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid descriptor: {part} has {found} values, expected {expected}")]
    InvalidDescriptor {
        part: DescriptorPart,
        expected: usize,
        found: usize,
    },
    #[error("Descriptor contains a non-finite value in {0}")]
    NonFiniteDescriptor(DescriptorPart),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Worker Error: {0}")]
    Worker(String),
}

/// Which half of an image descriptor a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorPart {
    ColorHistogram,
    TextureFeatures,
    Flat,
}

impl std::fmt::Display for DescriptorPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DescriptorPart::ColorHistogram => "color histogram",
            DescriptorPart::TextureFeatures => "texture features",
            DescriptorPart::Flat => "flat descriptor",
        };
        f.write_str(name)
    }
}

impl From<image::ImageError> for AppError {
    fn from(error: image::ImageError) -> Self {
        AppError::Decode(error.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        AppError::Worker(error.to_string())
    }
}
