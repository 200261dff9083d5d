// src/metrics/mod.rs
mod collector;

pub use collector::{AggregationOutcome, MetricsCollector, MetricsRegistry};
