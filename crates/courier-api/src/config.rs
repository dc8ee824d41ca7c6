//! Configuration management for the courier relay service.

use std::{collections::HashMap, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use courier_delivery::{ClientConfig, EngineConfig, RetryPolicy, RouteTable};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box with defaults matching the relay's
/// documented behavior: 3 attempts, 1s retry delay, 600s per-attempt
/// timeout. The type-to-destination route table can only be expressed in
/// the configuration file.
///
/// # Example
///
/// ```no_run
/// use courier_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// Inbound HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Routing
    /// Destination URL used when a payload's type matches no route.
    ///
    /// Environment variable: `DEFAULT_URL`
    #[serde(default = "default_consumer_url", alias = "DEFAULT_URL")]
    pub default_url: String,
    /// Type-to-destination mapping, configuration file only.
    #[serde(default)]
    pub routes: HashMap<String, String>,

    // Retry
    /// Maximum delivery attempts per message.
    ///
    /// Environment variable: `MAX_ATTEMPTS`
    #[serde(default = "default_max_attempts", alias = "MAX_ATTEMPTS")]
    pub max_attempts: u32,
    /// Delay before a failed message is re-queued, in milliseconds.
    ///
    /// Environment variable: `RETRY_DELAY_MS`
    #[serde(default = "default_retry_delay_ms", alias = "RETRY_DELAY_MS")]
    pub retry_delay_ms: u64,

    // Delivery client
    /// Per-attempt HTTP timeout in seconds.
    ///
    /// Environment variable: `DELIVERY_TIMEOUT_SECONDS`
    #[serde(default = "default_delivery_timeout", alias = "DELIVERY_TIMEOUT_SECONDS")]
    pub delivery_timeout_seconds: u64,

    // Queue
    /// Admission bound on the queue; 0 keeps it unbounded.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[serde(default, alias = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the delivery crate's engine configuration.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: self.to_client_config(),
            retry: self.to_retry_policy(),
            routes: self.to_route_table(),
            queue_capacity: (self.queue_capacity > 0).then_some(self.queue_capacity),
        }
    }

    /// Convert to delivery client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.delivery_timeout_seconds),
            ..ClientConfig::default()
        }
    }

    /// Convert to retry policy.
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Convert to the routing table.
    pub fn to_route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.clone(), self.default_url.clone())
    }

    /// Inbound request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.delivery_timeout_seconds == 0 {
            anyhow::bail!("delivery_timeout_seconds must be greater than 0");
        }

        if self.default_url.is_empty() {
            anyhow::bail!("default_url must not be empty");
        }

        for (kind, url) in &self.routes {
            if url.is_empty() {
                anyhow::bail!("route for type '{kind}' has an empty URL");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            default_url: default_consumer_url(),
            routes: HashMap::new(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            delivery_timeout_seconds: default_delivery_timeout(),
            queue_capacity: 0,
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_consumer_url() -> String {
    courier_delivery::DEFAULT_CONSUMER_URL.to_string()
}

fn default_max_attempts() -> u32 {
    courier_delivery::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    courier_delivery::DEFAULT_RETRY_DELAY_MS
}

fn default_delivery_timeout() -> u64 {
    courier_delivery::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}
