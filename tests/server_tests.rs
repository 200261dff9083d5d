// tests/server_tests.rs
use health_aggregator::{
    components::build_components,
    config::Config,
    server::{listener::bind_tcp, HealthHandler, ServerBuilder},
    HealthAggregator,
};
use std::net::SocketAddr;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_serves_configured_components_over_http() {
    let mut backend = mockito::Server::new_async().await;
    let _healthy = backend
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    // A listener that stays open makes the tcp component healthy.
    let (_db, db_addr) = bind_tcp(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();

    let config: Config = serde_yaml::from_str(&format!(
        r#"
components:
  - name: api
    kind: http
    url: "{}"
  - name: db
    kind: tcp
    address: "{}"
"#,
        backend.url(),
        db_addr
    ))
    .unwrap();
    config.validate().unwrap();

    let aggregator = HealthAggregator::new(build_components(&config.components).unwrap()).unwrap();
    let handler = HealthHandler::new(aggregator, config.server.path.clone());

    let (listener, addr) = bind_tcp(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        ServerBuilder::new(addr)
            .with_handler(handler)
            .serve_listener(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "HEALTHY");
    assert_eq!(body["components"]["api"]["status"], "HEALTHY");
    assert_eq!(body["components"]["db"]["status"], "HEALTHY");

    let missing = reqwest::get(format!("http://{}/other", addr)).await.unwrap();
    assert_eq!(missing.status(), 404);

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_handler_is_an_error() {
    let (listener, addr) = bind_tcp(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();

    let result = ServerBuilder::<HealthHandler>::new(addr)
        .serve_listener(listener, std::future::pending())
        .await;

    assert!(result.is_err());
}
