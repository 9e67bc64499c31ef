use serde::{Deserialize, Serialize};

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::rate_limit::RateLimitConfig;
use super::resolver::ResolverConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure for emberdns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line flags that win over values from the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. emberdns.toml in current directory
    /// 3. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("emberdns.toml").exists() {
            Self::from_file("emberdns.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.server = upstream;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.upstream.server.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid upstream server address: {}",
                self.upstream.server
            )));
        }

        if self.rate_limit.enabled {
            if self.rate_limit.max_queries_per_window == 0 {
                return Err(ConfigError::Validation(
                    "rate_limit.max_queries_per_window cannot be 0".to_string(),
                ));
            }
            if self.rate_limit.window_seconds == 0 {
                return Err(ConfigError::Validation(
                    "rate_limit.window_seconds cannot be 0".to_string(),
                ));
            }
        }

        if self.cache.min_ttl > self.cache.max_ttl {
            return Err(ConfigError::Validation(format!(
                "cache.min_ttl ({}) exceeds cache.max_ttl ({})",
                self.cache.min_ttl, self.cache.max_ttl
            )));
        }

        if self.resolver.max_cname_chain == 0 {
            return Err(ConfigError::Validation(
                "resolver.max_cname_chain cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.dns_port, 2053);
        assert_eq!(config.upstream.server, "8.8.8.8:53");
        assert_eq!(config.rate_limit.max_queries_per_window, 250);
        assert_eq!(config.rate_limit.window_seconds, 1);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            dns_port = 5353

            [rate_limit]
            max_queries_per_window = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.server.dns_port, 5353);
        assert_eq!(config.rate_limit.max_queries_per_window, 100);
        // untouched sections fall back to defaults
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.upstream.timeout_ms, 2000);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        config.apply_cli_overrides(CliOverrides {
            dns_port: Some(9953),
            bind_address: Some("127.0.0.1".to_string()),
            upstream: Some("1.1.1.1:53".to_string()),
            log_level: Some("debug".to_string()),
        });
        assert_eq!(config.server.dns_port, 9953);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.upstream.server, "1.1.1.1:53");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.server.dns_port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.server = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.window_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.min_ttl = 100;
        config.cache.max_ttl = 10;
        assert!(config.validate().is_err());
    }
}
