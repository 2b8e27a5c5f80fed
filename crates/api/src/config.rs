//! Application Configuration

use data_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use verdict::VerdictConfig;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CARDIO_RISK_CONFIG";

/// Prefix for environment overrides, e.g. `CARDIO_RISK__MODEL__MODEL_PATH`
pub const ENV_PREFIX: &str = "CARDIO_RISK";

/// Model and scaler artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Classifier artifact (`.json` or `.onnx`)
    pub model_path: PathBuf,
    /// Optional fitted scaler artifact
    pub scaler_path: Option<PathBuf>,
    /// Prepend a constant `id = 0` column to the schema
    pub include_id_placeholder: bool,
    /// Explicit column order; defaults to the model's declared names or the clinical fields
    pub schema_fields: Option<Vec<String>>,
    /// Explicit scaled fields; defaults to the scaler's declared names or the fallback subset
    pub scaled_fields: Option<Vec<String>>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/heart_model.json"),
            scaler_path: None,
            include_id_placeholder: false,
            schema_fields: None,
            scaled_fields: None,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listen address
    pub bind_addr: String,
    /// Tracing level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    pub model: ModelConfig,
    pub validation: ValidationConfig,
    pub verdict: VerdictConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            model: ModelConfig::default(),
            validation: ValidationConfig::default(),
            verdict: VerdictConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `CARDIO_RISK_CONFIG` (default `cardio-risk`)
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "cardio-risk".to_string());
        Self::load_from(&path)
    }

    /// Load from an optional file, overlaid with environment variables
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from("/nonexistent/cardio-risk").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.model.model_path, PathBuf::from("models/heart_model.json"));
        assert!(!config.model.include_id_placeholder);
        assert_eq!(config.validation.age_range, (1.0, 120.0));
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardio-risk.toml");
        std::fs::write(
            &path,
            r#"
bind_addr = "127.0.0.1:9000"

[model]
model_path = "artifacts/model.onnx"
scaler_path = "artifacts/scaler.json"
include_id_placeholder = true
scaled_fields = ["age", "chol"]

[verdict]
use_probability = true
probability_threshold = 0.6
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(
            config.model.scaler_path,
            Some(PathBuf::from("artifacts/scaler.json"))
        );
        assert!(config.model.include_id_placeholder);
        assert_eq!(
            config.model.scaled_fields,
            Some(vec!["age".to_string(), "chol".to_string()])
        );
        assert!(config.verdict.use_probability);
        assert_eq!(config.verdict.probability_threshold, 0.6);
        assert_eq!(config.log_level, "info");
    }
}
