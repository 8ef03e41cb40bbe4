// src/config/mod.rs
mod models;

pub use models::*;

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.yaml` and `.yml` are YAML, anything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    parse_config(&contents, ConfigFormat::from_path(path))
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let config: Config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_yaml_with_defaults() {
        let config = parse_config(
            "endpoint: http://localhost:8081/health\n",
            ConfigFormat::Yaml,
        )
        .unwrap();

        assert_eq!(config.endpoint.as_str(), "http://localhost:8081/health");
        assert_eq!(config.polling.interval(), Duration::from_secs(5));
        assert_eq!(config.polling.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.polling.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.tray.title, "Ping");
        assert_eq!(config.tray.tooltip, "util");
    }

    #[test]
    fn test_json_overrides() {
        let config = parse_config(
            r#"{
                "endpoint": "https://status.example.com/health",
                "polling": { "interval_ms": 250, "read_timeout_ms": 1000 },
                "tray": { "title": "Status" }
            }"#,
            ConfigFormat::Json,
        )
        .unwrap();

        assert_eq!(config.endpoint.host_str(), Some("status.example.com"));
        assert_eq!(config.polling.interval(), Duration::from_millis(250));
        assert_eq!(config.polling.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.polling.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.tray.title, "Status");
        assert_eq!(config.tray.tooltip, "util");
    }

    #[test]
    fn test_endpoint_is_required() {
        let err = parse_config("polling:\n  interval_ms: 1000\n", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_malformed_url_rejected() {
        let err = parse_config(r#"{"endpoint": "not a url"}"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let err = parse_config("endpoint: ftp://localhost/health\n", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_durations_rejected() {
        for field in ["interval_ms", "connect_timeout_ms", "read_timeout_ms"] {
            let yaml = format!("endpoint: http://localhost/health\npolling:\n  {}: 0\n", field);
            let err = parse_config(&yaml, ConfigFormat::Yaml).unwrap_err();
            match err {
                ConfigError::Invalid(msg) => assert!(msg.contains(field), "{}", msg),
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("config.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_config("does/not/exist.yaml").await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_shipped_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yaml");
        let config = load_config(path).await.unwrap();
        assert_eq!(config.endpoint.as_str(), "http://localhost:8081/health");
        assert_eq!(config.polling.interval(), Duration::from_secs(5));
    }
}
