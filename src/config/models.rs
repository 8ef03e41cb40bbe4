// src/config/models.rs
use super::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Health-check target. Required; there is no compiled-in default.
    pub endpoint: Url,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub tray: TrayConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.endpoint.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::Invalid(format!(
                    "endpoint scheme must be http or https, got {}",
                    other
                )))
            }
        }

        if self.endpoint.host_str().is_none() {
            return Err(ConfigError::Invalid("endpoint has no host".to_string()));
        }

        self.polling.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("interval_ms", self.interval_ms),
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("read_timeout_ms", self.read_timeout_ms),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "polling.{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Title used for notification popups.
    pub title: String,
    pub tooltip: String,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: "Ping".to_string(),
            tooltip: "util".to_string(),
        }
    }
}
