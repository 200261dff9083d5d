// src/components/http.rs
use crate::config::HttpComponentConfig;
use crate::health::{ComponentError, HealthComponent, HealthStatus};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Checks a downstream service with a GET request; any 2xx counts as healthy.
pub struct HttpComponent {
    name: String,
    url: Url,
    client: Client,
}

impl HttpComponent {
    pub fn new(
        name: impl Into<String>,
        base_url: &Url,
        path: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let url = base_url
            .join(path)
            .with_context(|| format!("Failed to join {} onto {}", path, base_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            name: name.into(),
            url,
            client,
        })
    }

    pub fn from_config(config: &HttpComponentConfig) -> anyhow::Result<Self> {
        Self::new(
            config.name.clone(),
            &config.url,
            &config.path,
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthComponent for HttpComponent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health(&self) -> Result<HealthStatus, ComponentError> {
        let start = Instant::now();
        let result = self.client.get(self.url.as_str()).send().await;

        let status = match result {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => HealthStatus::unhealthy(format!("HTTP {}", response.status())),
            Err(e) if e.is_timeout() => HealthStatus::unhealthy("Request timeout"),
            Err(e) => HealthStatus::unhealthy(e.to_string()),
        };

        debug!(
            "HTTP check {} against {} took {}ms: {}",
            self.name,
            self.url,
            start.elapsed().as_millis(),
            status
        );

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(server: &mockito::ServerGuard) -> HttpComponent {
        let base = Url::parse(&server.url()).unwrap();
        HttpComponent::new("api", &base, "/health", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_success_status_is_healthy() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let status = component(&server).health().await.unwrap();

        assert_eq!(status, HealthStatus::Healthy);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let status = component(&server).health().await.unwrap();

        assert_eq!(
            status,
            HealthStatus::unhealthy("HTTP 503 Service Unavailable")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unhealthy() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}", addr)).unwrap();
        let component =
            HttpComponent::new("api", &base, "/health", Duration::from_secs(2)).unwrap();

        let status = component.health().await.unwrap();

        assert!(!status.is_healthy());
    }

    #[test]
    fn test_path_is_joined_onto_base_url() {
        let base = Url::parse("http://localhost:8001/").unwrap();
        let component =
            HttpComponent::new("api", &base, "/status/ready", Duration::from_secs(1)).unwrap();

        assert_eq!(component.url().as_str(), "http://localhost:8001/status/ready");
        assert_eq!(component.name(), "api");
    }

    #[test]
    fn test_unjoinable_base_url_is_rejected_at_construction() {
        let base = Url::parse("mailto:ops@example.com").unwrap();
        let result = HttpComponent::new("api", &base, "/health", Duration::from_secs(1));

        assert!(result.is_err());
    }
}
