// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_health_path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Per-check deadline. Left unset, checks may run indefinitely.
    #[serde(default)]
    pub check_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentConfig {
    Http(HttpComponentConfig),
    Tcp(TcpComponentConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpComponentConfig {
    pub name: String,
    pub url: Url,
    #[serde(default = "default_health_path")]
    pub path: String,
    #[serde(default = "default_component_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TcpComponentConfig {
    pub name: String,
    pub address: String,
    #[serde(default = "default_component_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Component at position {0} has an empty name")]
    EmptyComponentName(usize),

    #[error("Component name `{0}` is configured more than once")]
    DuplicateComponent(String),

    #[error("Timeout `{0}` must be greater than zero")]
    ZeroTimeout(String),

    #[error("Path `{0}` must start with '/'")]
    InvalidPath(String),

    #[error("Metrics port {0} clashes with the health listener")]
    MetricsPortConflict(u16),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_path(&self.server.path)?;

        if self.aggregator.check_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout(
                "aggregator.check_timeout_ms".to_string(),
            ));
        }

        if self.metrics.enabled {
            check_path(&self.metrics.path)?;
            if self.metrics.port == self.server.listen_addr.port() {
                return Err(ConfigError::MetricsPortConflict(self.metrics.port));
            }
        }

        let mut seen = HashSet::new();
        for (index, component) in self.components.iter().enumerate() {
            let name = component.name();
            if name.is_empty() {
                return Err(ConfigError::EmptyComponentName(index));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateComponent(name.to_string()));
            }
            if component.timeout_ms() == 0 {
                return Err(ConfigError::ZeroTimeout(format!("{}.timeout_ms", name)));
            }
            if let ComponentConfig::Http(http) = component {
                check_path(&http.path)?;
            }
        }

        Ok(())
    }
}

impl AggregatorConfig {
    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }
}

impl ComponentConfig {
    pub fn name(&self) -> &str {
        match self {
            ComponentConfig::Http(http) => &http.name,
            ComponentConfig::Tcp(tcp) => &tcp.name,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        match self {
            ComponentConfig::Http(http) => http.timeout_ms,
            ComponentConfig::Tcp(tcp) => tcp.timeout_ms,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            path: default_health_path(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

fn check_path(path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath(path.to_string()))
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_component_timeout_ms() -> u64 {
    1000
}
