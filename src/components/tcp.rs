// src/components/tcp.rs
use crate::config::TcpComponentConfig;
use crate::health::{ComponentError, HealthComponent, HealthStatus};
use anyhow::anyhow;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

/// Healthy when a TCP connection to `address` can be opened.
pub struct TcpComponent {
    name: String,
    address: String,
    connect_timeout: Duration,
}

impl TcpComponent {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &TcpComponentConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.address.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }
}

#[async_trait]
impl HealthComponent for TcpComponent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health(&self) -> Result<HealthStatus, ComponentError> {
        let addr = match self.address.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                let (host, port) = split_host_port(&self.address)?;
                match lookup_host((host, port)).await.map(|mut addrs| addrs.next()) {
                    Ok(Some(addr)) => addr,
                    Ok(None) => {
                        return Ok(HealthStatus::unhealthy(format!(
                            "{} did not resolve to any address",
                            self.address
                        )))
                    }
                    Err(e) => return Ok(HealthStatus::unhealthy(e.to_string())),
                }
            }
        };

        let status = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => HealthStatus::Healthy,
            Ok(Err(e)) => HealthStatus::unhealthy(e.to_string()),
            Err(_) => HealthStatus::unhealthy("connect timeout"),
        };

        debug!("TCP check {} against {}: {}", self.name, addr, status);
        Ok(status)
    }
}

/// `host:port`; only the shape is checked here, resolution happens per check.
fn split_host_port(address: &str) -> Result<(&str, u16), ComponentError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("{} is not a host:port address", address))?;
    if host.is_empty() {
        return Err(anyhow!("{} has no host", address));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| anyhow!("{} has an invalid port: {}", address, e))?;
    Ok((host.trim_start_matches('[').trim_end_matches(']'), port))
}
