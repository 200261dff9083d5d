// src/components/mod.rs
mod http;
mod tcp;

pub use http::HttpComponent;
pub use tcp::TcpComponent;

use crate::config::ComponentConfig;
use crate::health::HealthComponent;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Instantiate the configured components, keeping their configured order.
pub fn build_components(configs: &[ComponentConfig]) -> Result<Vec<Arc<dyn HealthComponent>>> {
    configs
        .iter()
        .map(|config| -> Result<Arc<dyn HealthComponent>> {
            let component: Arc<dyn HealthComponent> = match config {
                ComponentConfig::Http(http) => Arc::new(
                    HttpComponent::from_config(http)
                        .with_context(|| format!("Invalid http component {}", http.name))?,
                ),
                ComponentConfig::Tcp(tcp) => Arc::new(TcpComponent::from_config(tcp)),
            };
            tracing::info!("Registered {} component {}", kind(config), config.name());
            Ok(component)
        })
        .collect()
}

fn kind(config: &ComponentConfig) -> &'static str {
    match config {
        ComponentConfig::Http(_) => "http",
        ComponentConfig::Tcp(_) => "tcp",
    }
}
