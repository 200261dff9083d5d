// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&contents, is_yaml(path))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn parse_config(contents: &str, yaml: bool) -> Result<Config> {
    let config = if yaml {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const YAML: &str = r#"
server:
  listen_addr: "127.0.0.1:8080"
aggregator:
  check_timeout_ms: 2000
metrics:
  enabled: true
  port: 9100
components:
  - name: api
    kind: http
    url: "http://localhost:8001"
  - name: db
    kind: tcp
    address: "localhost:5432"
    timeout_ms: 250
"#;

    async fn write_temp(extension: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "health-aggregator-{}.{}",
            uuid::Uuid::new_v4(),
            extension
        ));
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = parse_config(YAML, true).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.path, "/health");
        assert_eq!(config.aggregator.check_timeout(), Some(Duration::from_millis(2000)));
        assert_eq!(config.metrics.path, "/metrics");
        assert_eq!(config.components.len(), 2);

        match &config.components[0] {
            ComponentConfig::Http(http) => {
                assert_eq!(http.name, "api");
                assert_eq!(http.path, "/health");
                assert_eq!(http.timeout_ms, 1000);
            }
            other => panic!("expected http component, got {:?}", other),
        }
        assert_eq!(config.components[1].name(), "db");
        assert_eq!(config.components[1].timeout_ms(), 250);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("{}", false).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(!config.metrics.enabled);
        assert_eq!(config.aggregator.check_timeout(), None);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = parse_config(YAML, true).unwrap();
        let duplicate = config.components[1].clone();
        config.components.push(duplicate);

        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateComponent("db".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let mut config = parse_config(YAML, true).unwrap();
        config.aggregator.check_timeout_ms = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout(_))));

        let mut config = parse_config(YAML, true).unwrap();
        if let ComponentConfig::Tcp(tcp) = &mut config.components[1] {
            tcp.timeout_ms = 0;
        }
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("db.timeout_ms".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_paths_and_ports() {
        let mut config = parse_config(YAML, true).unwrap();
        config.server.path = "health".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPath("health".to_string()))
        );

        let mut config = parse_config(YAML, true).unwrap();
        config.metrics.port = 8080;
        assert_eq!(config.validate(), Err(ConfigError::MetricsPortConflict(8080)));
    }

    #[test]
    fn test_unknown_component_kind_is_rejected() {
        let result = parse_config(
            r#"{"components": [{"name": "x", "kind": "carrier-pigeon"}]}"#,
            false,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_config_by_extension() {
        let yaml = write_temp("yml", YAML).await;
        let config = load_config(&yaml).await.unwrap();
        assert_eq!(config.components.len(), 2);

        let json = write_temp(
            "json",
            r#"{"components": [{"name": "db", "kind": "tcp", "address": "localhost:5432"}]}"#,
        )
        .await;
        let config = load_config(&json).await.unwrap();
        assert_eq!(config.components[0].name(), "db");

        tokio::fs::remove_file(yaml).await.unwrap();
        tokio::fs::remove_file(json).await.unwrap();
    }

    #[tokio::test]
    async fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.yaml");
        let config = load_config(path).await.unwrap();

        assert!(config.metrics.enabled);
        assert_eq!(config.components.len(), 2);
    }

    #[tokio::test]
    async fn test_load_config_reports_validation_errors() {
        let path = write_temp("json", r#"{"server": {"path": "nope"}}"#).await;
        let err = load_config(&path).await.unwrap_err();

        assert!(err.to_string().contains("Invalid configuration"));
        tokio::fs::remove_file(path).await.unwrap();
    }
}
