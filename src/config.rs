use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::Level;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub log_level: String,
    pub ingest_workers: usize,
    pub analysis: AnalysisConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ingest_workers: 4,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Configuration {
    /// Layers an optional TOML file and `REFSCAN_*` environment variables
    /// over the built-in defaults. Nested keys use `__`, e.g.
    /// `REFSCAN_ANALYSIS__SEED=7`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("refscan").required(false)),
        };
        let configuration: Configuration = builder
            .add_source(
                Environment::with_prefix("REFSCAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.ingest_workers == 0 {
            return Err(AppError::InvalidConfig(
                "ingest_workers must be greater than 0".to_string(),
            ));
        }
        self.max_log_level()?;
        self.analysis.validate()
    }

    /// One of `trace`, `debug`, `info`, `warn`, `error` (any case).
    pub fn max_log_level(&self) -> Result<Level, AppError> {
        self.log_level.parse().map_err(|_| {
            AppError::InvalidConfig(format!("unknown log_level '{}'", self.log_level))
        })
    }
}

/// Tunable constants of the descriptor comparison pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Side length of the square grid every image is resampled to.
    pub grid_size: u32,
    pub color_weight: f32,
    pub texture_weight: f32,
    /// Weight of the best gallery match in the fused score.
    pub max_weight: f32,
    /// Weight of the mean gallery similarity in the fused score.
    pub mean_weight: f32,
    pub warning_threshold: f32,
    pub anomaly_threshold: f32,
    /// Scores at or below this produce no regions.
    pub region_threshold: f32,
    pub top_similarities: usize,
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grid_size: 64,
            color_weight: 0.6,
            texture_weight: 0.4,
            max_weight: 0.7,
            mean_weight: 0.3,
            warning_threshold: 0.3,
            anomaly_threshold: 0.6,
            region_threshold: 0.3,
            top_similarities: 5,
            seed: None,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.grid_size < 3 {
            return Err(AppError::InvalidConfig(
                "grid_size must be at least 3 to leave interior pixels".to_string(),
            ));
        }

        let weights = [
            self.color_weight,
            self.texture_weight,
            self.max_weight,
            self.mean_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AppError::InvalidConfig(
                "weights must be finite and non-negative".to_string(),
            ));
        }

        if self.warning_threshold >= self.anomaly_threshold {
            return Err(AppError::InvalidConfig(format!(
                "warning_threshold ({}) must be below anomaly_threshold ({})",
                self.warning_threshold, self.anomaly_threshold
            )));
        }

        if self.top_similarities == 0 {
            return Err(AppError::InvalidConfig(
                "top_similarities must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.analysis.grid_size, 64);
        assert_eq!(configuration.max_log_level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let configuration = Configuration {
            log_level: "chatty".to_string(),
            ..Configuration::default()
        };
        assert!(matches!(
            configuration.validate(),
            Err(AppError::InvalidConfig(_))
        ));
        assert!(configuration.max_log_level().is_err());
    }

    #[test]
    fn test_load_rejects_unknown_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refscan.toml");
        std::fs::write(&path, "log_level = \"loud\"\n").unwrap();

        let result = Configuration::load(Some(&path));
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let analysis = AnalysisConfig {
            warning_threshold: 0.7,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analysis.validate(),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let analysis = AnalysisConfig {
            grid_size: 2,
            ..AnalysisConfig::default()
        };
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refscan.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\ningest_workers = 2\n\n[analysis]\nseed = 11\n",
        )
        .unwrap();

        let configuration = Configuration::load(Some(&path)).unwrap();
        assert_eq!(configuration.ingest_workers, 2);
        assert_eq!(configuration.analysis.seed, Some(11));
        assert_eq!(configuration.analysis.top_similarities, 5);
        assert_eq!(configuration.max_log_level().unwrap(), Level::DEBUG);
    }
}
