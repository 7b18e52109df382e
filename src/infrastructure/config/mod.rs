// ============================================================
// APPLICATION CONFIGURATION
// ============================================================
// Defaults, then an optional TOML file, then TABULA_* environment
// variables (nested keys split on `__`)

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::dataset::IngestConfig;
use crate::domain::error::{AppError, Result};

pub const CONFIG_PATH_ENV: &str = "TABULA_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tabula.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    /// `tracing_subscriber` env-filter directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ingest: IngestConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `.env`, the TOML file named by `TABULA_CONFIG` (default
    /// `tabula.toml`, optional) and the environment
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_figment(Self::figment(Path::new(&path)))
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TABULA_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        config.ingest.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DecimalHint;

    fn with_toml(toml: &str) -> Result<AppConfig> {
        AppConfig::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(toml)),
        )
    }

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::from_figment(AppConfig::figment(Path::new(
            "definitely/not/here/tabula.toml",
        )))
        .unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.ingest, IngestConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let config = with_toml(
            r#"
            log_filter = "debug"

            [server]
            port = 8080

            [ingest]
            decimal_separator = ","
            strict_row_length = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ingest.decimal_separator, DecimalHint::Comma);
        assert!(config.ingest.strict_row_length);
        assert_eq!(config.ingest.sample_lines_for_detection, 5);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let result = with_toml("[ingest]\nsample_lines_for_detection = 0\n");
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let result = with_toml("[ingest]\ndecimal_separator = \";\"\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
