use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const CONFIG_ENV: &str = "PROMREPORT_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Monitored environments, keyed by platform name.
    pub prometheus: BTreeMap<String, PrometheusConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-query HTTP timeout
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrometheusConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for log files; stderr only when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Days to keep old log files; 0 keeps everything.
    #[serde(default)]
    pub max_age: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            path: None,
            max_age: 0,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_query_timeout_secs() -> u64 {
    30
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file does not exist: {0}")]
    Missing(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.prometheus.is_empty() {
            return Err(ConfigError::Invalid(
                "no prometheus instances configured".to_string(),
            ));
        }
        for (name, instance) in &self.prometheus {
            if instance.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "prometheus URL for '{name}' is empty"
                )));
            }
        }
        if self.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "query_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.logging.path.as_deref() == Some(Path::new("")) {
            return Err(ConfigError::Invalid("logging path is empty".to_string()));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("promreport").join(DEFAULT_CONFIG_FILE))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Explicit path, then `PROMREPORT_CONFIG`, then the default locations.
pub fn resolve_config_path(config_path: Option<&Path>) -> PathBuf {
    if let Some(path) = config_path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if let Some(stripped) = env_path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        return PathBuf::from(env_path);
    }
    default_config_path()
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_yaml(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
prometheus:
  production:
    url: http://prom-prod:9090
  staging:
    url: http://prom-staging:9090
logging:
  level: debug
  path: ./logs
  max_age: 7
"#;

    #[test]
    fn parses_sources_and_logging() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        let names: Vec<&str> = config.prometheus.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["production", "staging"]);
        assert_eq!(config.prometheus["staging"].url, "http://prom-staging:9090");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.path.as_deref(), Some(Path::new("./logs")));
        assert_eq!(config.logging.max_age, 7);
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn logging_section_is_optional() {
        let config = Config::from_yaml("prometheus:\n  lab:\n    url: http://lab:9090\n").unwrap();
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn retired_compress_key_is_ignored() {
        let yaml = "prometheus:\n  lab:\n    url: http://lab:9090\nlogging:\n  max_age: 3\n  compress: true\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.logging,
            LoggingConfig {
                max_age: 3,
                ..LoggingConfig::default()
            }
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = Config::from_yaml("prometheus:\n  lab:\n    url: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("'lab'")));
    }

    #[test]
    fn no_sources_is_rejected() {
        let err = Config::from_yaml("prometheus: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = Config::from_yaml("prometheus: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.yaml");
        assert!(matches!(load_config(&path), Err(ConfigError::Missing(_))));

        let present = tmp.path().join("config.yaml");
        fs::write(&present, SAMPLE).unwrap();
        assert_eq!(load_config(&present).unwrap().prometheus.len(), 2);
    }

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(Path::new("/etc/promreport.yaml")));
        assert_eq!(path, PathBuf::from("/etc/promreport.yaml"));
    }
}
