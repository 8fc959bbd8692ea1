use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::relay::RelayConfig;
use super::server::ServerConfig;
use super::tunnel::{TunnelConfig, MAX_TXT_STRING_LEN};
use crate::LoopGuard;

/// Main configuration structure for dohtunnel
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// HTTP listener (bind address, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Query name layout, alphabets and chunking
    #[serde(default)]
    pub tunnel: TunnelConfig,

    /// Outbound HTTP limits
    #[serde(default)]
    pub relay: RelayConfig,

    /// Answers for non-tunnel queries
    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dohtunnel.toml in current directory
    /// 3. /etc/dohtunnel/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(path) = Self::get_config_path() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(domain) = overrides.own_domain {
            self.tunnel.own_domain = domain;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        let own_domain = self.tunnel.own_domain.trim().trim_end_matches('.');
        if own_domain.is_empty() {
            return Err(ConfigError::Validation(
                "tunnel.own_domain cannot be empty".to_string(),
            ));
        }
        if own_domain.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(ConfigError::Validation(format!(
                "tunnel.own_domain '{}' is not a domain name",
                own_domain
            )));
        }

        if self.tunnel.data_label.is_empty() || self.tunnel.data_label.contains('.') {
            return Err(ConfigError::Validation(
                "tunnel.data_label must be a single non-empty label".to_string(),
            ));
        }

        if self.tunnel.max_chunk_size == 0 || self.tunnel.max_chunk_size > MAX_TXT_STRING_LEN {
            return Err(ConfigError::Validation(format!(
                "tunnel.max_chunk_size must be between 1 and {}",
                MAX_TXT_STRING_LEN
            )));
        }

        if self.relay.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "relay.timeout_secs cannot be 0".to_string(),
            ));
        }

        if self.relay.max_body_bytes == 0 {
            return Err(ConfigError::Validation(
                "relay.max_body_bytes cannot be 0".to_string(),
            ));
        }

        self.dns.dummy_address.parse::<IpAddr>().map_err(|_| {
            ConfigError::Validation(format!(
                "dns.dummy_address '{}' is not an IP address",
                self.dns.dummy_address
            ))
        })?;

        if let Some(upstream) = &self.dns.passthrough_upstream {
            LoopGuard::new(own_domain)
                .check_target(upstream)
                .map_err(|e| {
                    ConfigError::Validation(format!(
                        "dns.passthrough_upstream '{}' rejected: {}",
                        upstream, e
                    ))
                })?;
        }

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("dohtunnel.toml").exists() {
            Some("dohtunnel.toml".to_string())
        } else if std::path::Path::new("/etc/dohtunnel/config.toml").exists() {
            Some("/etc/dohtunnel/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub own_domain: Option<String>,
    pub log_level: Option<String>,
}
