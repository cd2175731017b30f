// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! YAML configuration of the exporter.
//!
//! ```yaml
//! logstash:
//!   servers:
//!     - url: "http://localhost:9600"
//!   httpTimeout: 2s
//! server:
//!   host: "0.0.0.0"
//!   port: 9198
//! logging:
//!   level: "info"
//!   format: "text"
//! ```

pub(crate) mod duration;
mod flags;

pub use duration::parse_duration;
pub use flags::{DEFAULT_CONFIG_LOCATION, Flags};

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_LOGSTASH_URL: &str = "http://localhost:9600";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9198;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub logstash: LogstashConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogstashConfig {
    pub servers: Vec<LogstashServer>,
    /// Deadline of one collection cycle, shared by every node.
    #[serde(with = "duration")]
    pub http_timeout: Duration,
}

impl Default for LogstashConfig {
    fn default() -> Self {
        Self {
            servers: vec![LogstashServer {
                url: DEFAULT_LOGSTASH_URL.to_string(),
            }],
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogstashServer {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error. `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ExporterConfig {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logstash.servers.is_empty() {
            return Err(ConfigError::invalid("logstash.servers must list at least one server"));
        }
        let mut seen = HashSet::with_capacity(self.logstash.servers.len());
        for server in &self.logstash.servers {
            if !seen.insert(server.url.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "logstash server url {:?} is listed more than once",
                    server.url
                )));
            }
            let url = Url::parse(server.url.trim())
                .map_err(|err| ConfigError::invalid(format!("logstash server url {:?}: {err}", server.url)))?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(ConfigError::invalid(format!(
                    "logstash server url {:?} must be an http(s) url with a host",
                    server.url
                )));
            }
        }
        if self.logstash.http_timeout.is_zero() {
            return Err(ConfigError::invalid("logstash.httpTimeout must be greater than zero"));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host must not be empty"));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::invalid(format!(
                "logging.level {:?} is not one of trace, debug, info, warn, error",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Node URLs in configuration order.
    pub fn node_urls(&self) -> Vec<String> {
        self.logstash.servers.iter().map(|server| server.url.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExporterConfig::default();
        assert_eq!(config.node_urls(), vec![DEFAULT_LOGSTASH_URL.to_string()]);
        assert_eq!(config.logstash.http_timeout, Duration::from_secs(2));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9198);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let example = ExporterConfig::from_yaml(include_str!("../../config.example.yml")).expect("example config");
        assert_eq!(example, ExporterConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = ExporterConfig::from_yaml(
            r#"
logstash:
  servers:
    - url: "http://logstash-a:9600"
    - url: "https://logstash-b:9600"
  httpTimeout: 1500ms
server:
  host: "127.0.0.1"
  port: 9999
logging:
  level: debug
  format: json
"#,
        )
        .unwrap();

        assert_eq!(config.node_urls(), vec!["http://logstash-a:9600", "https://logstash-b:9600"]);
        assert_eq!(config.logstash.http_timeout, Duration::from_millis(1500));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = ExporterConfig::from_yaml("server:\n  port: 9200\n").unwrap();
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.logstash, LogstashConfig::default());

        assert_eq!(ExporterConfig::from_yaml("").unwrap(), ExporterConfig::default());
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            "logstash:\n  servers: []\n",
            "logstash:\n  servers:\n    - url: \"localhost\"\n",
            "logstash:\n  servers:\n    - url: \"ftp://localhost:9600\"\n",
            "logstash:\n  httpTimeout: 0s\n",
            "logging:\n  level: loud\n",
            "server:\n  host: \"\"\n",
            "logstash:\n  servers:\n    - url: \"http://a:9600\"\n    - url: \"http://a:9600\"\n",
        ];
        for yaml in cases {
            let err = ExporterConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{yaml}: {err}");
        }
    }

    #[test]
    fn test_parse_errors() {
        let err = ExporterConfig::from_yaml("logging:\n  format: xml\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");

        let err = ExporterConfig::from_yaml("logstash:\n  httpTimeout: soon\n").unwrap_err();
        assert!(err.to_string().contains("soon"), "{err}");

        let err = ExporterConfig::from_yaml("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logstash:\n  servers:\n    - url: \"http://10.0.0.7:9600\"\n  httpTimeout: 5s").unwrap();

        let config = ExporterConfig::load(file.path()).unwrap();
        assert_eq!(config.node_urls(), vec!["http://10.0.0.7:9600"]);
        assert_eq!(config.logstash.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExporterConfig::load(dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }

    #[test]
    fn test_serialized_timeout_is_human_readable() {
        let yaml = serde_yaml::to_string(&ExporterConfig::default()).unwrap();
        assert!(yaml.contains("httpTimeout: 2s"), "{yaml}");
    }
}
