// src/health/component.rs
use super::HealthStatus;
use async_trait::async_trait;

/// Error returned by a component whose check could not be carried out.
pub type ComponentError = anyhow::Error;

/// A named subsystem that can report its own health.
///
/// Implementations decide how the check is done and may suspend for as long
/// as they need; the aggregator imposes no deadline unless one is configured.
#[async_trait]
pub trait HealthComponent: Send + Sync {
    fn name(&self) -> &str;

    async fn health(&self) -> Result<HealthStatus, ComponentError>;
}
