// src/health/mod.rs
mod aggregator;
mod component;
mod error;
mod status;

pub use aggregator::{AggregatedHealth, HealthAggregator};
pub use component::{ComponentError, HealthComponent};
pub use error::{AggregateError, AggregatorError};
pub use status::HealthStatus;
