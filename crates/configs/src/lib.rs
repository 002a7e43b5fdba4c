use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_recency_window")]
    pub recency_window_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { recency_window_secs: default_recency_window() }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_recency_window() -> u64 { 60 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `CONFIG_PATH`/`config.toml`, falling back to defaults when
    /// no file is present, then normalize and validate.
    pub fn load_or_default() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.logging.normalize_from_env();
        self.validation.validate()?;
        Ok(())
    }
}

impl LoggingConfig {
    /// `LOG_LEVEL` overrides whatever the TOML provided.
    pub fn normalize_from_env(&mut self) {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if self.level.trim().is_empty() {
            self.level = default_log_level();
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.recency_window_secs == 0 {
            return Err(anyhow!("validation.recency_window_secs must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.json);
        assert_eq!(cfg.validation.recency_window_secs, 60);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AppConfig = toml::from_str("[logging]\njson = true\n").unwrap();
        assert!(cfg.logging.json);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.validation.recency_window_secs, 60);
    }

    #[test]
    fn zero_recency_window_is_rejected() {
        let mut cfg: AppConfig =
            toml::from_str("[validation]\nrecency_window_secs = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }
}
