// src/lib.rs
pub mod components;
pub mod config;
pub mod health;
pub mod metrics;
pub mod server;

pub use health::{
    AggregateError, AggregatedHealth, AggregatorError, ComponentError, HealthAggregator,
    HealthComponent, HealthStatus,
};
