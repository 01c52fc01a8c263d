use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port, shared by the HTTP API and the realtime channel
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated. Unset means any origin.
    pub cors_origins: Option<String>,

    /// Public base URL used when building shareable session links
    pub public_url: Option<String>,

    /// Outbound messages queued per connection before new ones are dropped
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Evict sessions without participants after this many idle seconds
    pub session_idle_ttl_secs: Option<u64>,

    /// How often the retention sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub session_sweep_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        Self::from_vars(std::env::vars())
    }

    /// Build the configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        match envy::from_iter::<_, Config>(vars) {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "prod" || self.environment.to_lowercase() == "production"
    }

    /// Parsed CORS allow-list, `None` when every origin is allowed
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() {
            None
        } else {
            Some(origins)
        }
    }

    /// Idle time after which an empty session may be evicted
    pub fn session_idle_ttl(&self) -> Option<Duration> {
        self.session_idle_ttl_secs.map(Duration::from_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            public_url: None,
            outbound_buffer: default_outbound_buffer(),
            session_idle_ttl_secs: None,
            session_sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_sweep_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:5000");
        assert!(config.is_development());
        assert_eq!(config.outbound_buffer, 256);
        assert!(config.session_idle_ttl().is_none());
        assert!(config.cors_origin_list().is_none());
    }

    #[test]
    fn reads_overrides_from_variables() {
        let config = Config::from_vars(vars(&[
            ("PORT", "8080"),
            ("ENVIRONMENT", "Production"),
            ("CORS_ORIGINS", "http://localhost:3000, https://code.example.com ,"),
            ("SESSION_IDLE_TTL_SECS", "3600"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.is_production());
        assert_eq!(
            config.cors_origin_list().unwrap(),
            vec!["http://localhost:3000", "https://code.example.com"]
        );
        assert_eq!(config.session_idle_ttl(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let result = Config::from_vars(vars(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    }

    #[test]
    fn sweep_interval_is_never_zero() {
        let config = Config::from_vars(vars(&[("SESSION_SWEEP_INTERVAL_SECS", "0")])).unwrap();
        assert_eq!(config.session_sweep_interval(), Duration::from_secs(1));
    }
}
