// src/metrics/collector.rs
use crate::health::AggregatedHealth;
use anyhow::{Context, Result};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, StatusCode};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("Failed to encode metrics")?;
        Ok(buffer)
    }

    /// Answer a scrape: the text exposition on `path`, 404 anywhere else.
    pub fn response(&self, req: &Request<Body>, path: &str) -> Response<Body> {
        if req.uri().path() != path {
            return status_response(StatusCode::NOT_FOUND, "Not Found");
        }

        match self.gather() {
            Ok(metrics) => {
                let mut response = Response::new(Body::from(metrics));
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; version=0.0.4"),
                );
                response
            }
            Err(e) => {
                error!("Failed to gather metrics: {}", e);
                status_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }
}

fn status_response(code: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = code;
    response
}

/// Label value of `ha_aggregations_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationOutcome {
    Healthy,
    Unhealthy,
    Error,
}

impl AggregationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationOutcome::Healthy => "healthy",
            AggregationOutcome::Unhealthy => "unhealthy",
            AggregationOutcome::Error => "error",
        }
    }
}

pub struct MetricsCollector {
    pub aggregations_total: IntCounterVec,
    pub aggregation_duration_seconds: Histogram,
    pub component_health_status: IntGaugeVec,
    pub registered_components: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let aggregations_total = IntCounterVec::new(
            Opts::new("ha_aggregations_total", "Total number of aggregation runs"),
            &["outcome"],
        )?;
        registry.register(Box::new(aggregations_total.clone()))?;

        let aggregation_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "ha_aggregation_duration_seconds",
            "Wall-clock duration of an aggregation run in seconds",
        ))?;
        registry.register(Box::new(aggregation_duration_seconds.clone()))?;

        let component_health_status = IntGaugeVec::new(
            Opts::new(
                "ha_component_health_status",
                "Component health status (1=healthy, 0=unhealthy)",
            ),
            &["component"],
        )?;
        registry.register(Box::new(component_health_status.clone()))?;

        let registered_components = IntGauge::new(
            "ha_registered_components",
            "Number of components registered with the aggregator",
        )?;
        registry.register(Box::new(registered_components.clone()))?;

        Ok(Self {
            aggregations_total,
            aggregation_duration_seconds,
            component_health_status,
            registered_components,
        })
    }

    pub fn record_aggregation(&self, outcome: AggregationOutcome, duration: Duration) {
        self.aggregations_total
            .with_label_values(&[outcome.as_str()])
            .inc();
        self.aggregation_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Update the per-component gauges from a completed aggregation.
    pub fn update_component_health(&self, results: &AggregatedHealth) {
        for (name, status) in results {
            let value = if status.is_healthy() { 1 } else { 0 };
            self.component_health_status
                .with_label_values(&[name.as_str()])
                .set(value);
        }
    }

    /// A component whose check failed counts as unhealthy until it next succeeds.
    pub fn mark_component_failed(&self, component: &str) {
        self.component_health_status
            .with_label_values(&[component])
            .set(0);
    }

    pub fn set_registered_components(&self, count: usize) {
        self.registered_components.set(count as i64);
    }
}
