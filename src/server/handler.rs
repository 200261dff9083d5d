// src/server/handler.rs
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tower::Service;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::health::{AggregateError, AggregatedHealth, HealthAggregator, HealthStatus};
use crate::metrics::{AggregationOutcome, MetricsCollector};

#[derive(Serialize)]
struct HealthReport<'a> {
    status: &'static str,
    checked_at: String,
    components: BTreeMap<&'a str, &'a HealthStatus>,
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    status: &'static str,
    checked_at: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    component: Option<&'a str>,
}

/// Serves the aggregated health of every registered component as JSON.
///
/// 200 when every component is healthy, 503 when any reports unhealthy and
/// 500 when the aggregation itself failed.
#[derive(Clone)]
pub struct HealthHandler {
    aggregator: HealthAggregator,
    path: Arc<str>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HealthHandler {
    pub fn new(aggregator: HealthAggregator, path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self {
            aggregator,
            path: path.into(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        metrics.set_registered_components(self.aggregator.len());
        self.metrics = Some(metrics);
        self
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        if req.uri().path() != &*self.path {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }

        if req.method() != Method::GET {
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let request_id = Uuid::new_v4();
        self.report()
            .instrument(info_span!("health_request", %request_id))
            .await
    }

    async fn report(&self) -> Response<Body> {
        let start = Instant::now();
        let result = self.aggregator.aggregate().await;
        let checked_at = chrono::Utc::now().to_rfc3339();

        let (outcome, response) = match &result {
            Ok(results) => self.render_results(results, checked_at),
            Err(e) => render_error(e, checked_at),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_aggregation(outcome, start.elapsed());
            match &result {
                Ok(results) => metrics.update_component_health(results),
                Err(e) => {
                    if let Some(component) = e.component() {
                        metrics.mark_component_failed(component);
                    }
                }
            }
        }

        response
    }

    fn render_results(
        &self,
        results: &AggregatedHealth,
        checked_at: String,
    ) -> (AggregationOutcome, Response<Body>) {
        let unhealthy: Vec<&str> = results
            .iter()
            .filter(|(_, status)| !status.is_healthy())
            .map(|(name, _)| name.as_str())
            .collect();

        let (outcome, status, code) = if unhealthy.is_empty() {
            info!("All {} components healthy", results.len());
            (AggregationOutcome::Healthy, "HEALTHY", StatusCode::OK)
        } else {
            warn!(
                "{}/{} components unhealthy: {:?}",
                unhealthy.len(),
                results.len(),
                unhealthy
            );
            (
                AggregationOutcome::Unhealthy,
                "UNHEALTHY",
                StatusCode::SERVICE_UNAVAILABLE,
            )
        };

        let report = HealthReport {
            status,
            checked_at,
            components: results
                .iter()
                .map(|(name, status)| (name.as_str(), status))
                .collect(),
        };

        (outcome, json_response(code, &report))
    }
}

fn render_error(e: &AggregateError, checked_at: String) -> (AggregationOutcome, Response<Body>) {
    error!("Health aggregation failed: {}", e);

    let report = ErrorReport {
        status: "ERROR",
        checked_at,
        error: e.to_string(),
        component: e.component(),
    };

    (
        AggregationOutcome::Error,
        json_response(StatusCode::INTERNAL_SERVER_ERROR, &report),
    )
}

fn json_response<T: Serialize>(code: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = code;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            error!("Failed to serialize health report: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(code: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = code;
    response
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}
