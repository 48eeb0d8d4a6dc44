//! Leadline server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use leadline_core::config::AppConfig;
use leadline_server::{AppState, create_router};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Leadline - contact lead API server
#[derive(Parser, Debug)]
#[command(name = "leadlined")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "LEADLINE_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

/// Load configuration: optional TOML file, then `LEADLINE_*` env overrides.
fn load_config(config_path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();

    if Path::new(config_path).exists() {
        tracing::info!(config_path = %config_path, "Loading configuration from file");
        figment = figment.merge(Toml::file(config_path));
    } else {
        tracing::info!(
            config_path = %config_path,
            "No config file found, using defaults and environment"
        );
    }

    // A bare `LEADLINE_SERVER` is not a config section.
    let config: AppConfig = figment
        .merge(
            Env::prefixed("LEADLINE_")
                .split("__")
                .ignore(&["config", "server"]),
        )
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Leadline v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;

    // Initialize file store
    let files = leadline_storage::file_store_from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    files
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = files.backend().backend_name(), "File store initialized");

    // Initialize metadata store (runs the idempotent schema)
    let metadata = leadline_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata health check failed")?;
    tracing::info!("Metadata store initialized");

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, metadata, files);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadline_core::config::{MetadataConfig, StorageConfig};
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("absent.toml");

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.api_prefix, "/api");
        assert!(matches!(config.metadata, MetadataConfig::Sqlite { .. }));
    }

    #[test]
    fn file_values_are_applied() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "0.0.0.0:9000"
cors_allowed_origins = ["*"]

[storage]
type = "filesystem"
path = "/srv/leads"
public_base_url = "https://leads.example.com"

[metadata]
type = "sqlite"
path = "/srv/leads.db"
"#,
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(
            config.storage.public_base_url(),
            Some("https://leads.example.com")
        );
        let StorageConfig::Filesystem { path, .. } = &config.storage;
        assert_eq!(path, Path::new("/srv/leads"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("server.toml");
        std::fs::write(&path, "[server]\napi_prefix = \"api/\"\n").unwrap();

        let err = load_config(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn environment_overrides_and_stray_server_variable() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LEADLINE_SERVER", "http://localhost:8000/api");
            jail.set_env("LEADLINE_SERVER__MAX_UPLOAD_BYTES", 1_048_576);
            jail.set_env("LEADLINE_SERVER__METRICS_ENABLED", false);

            let path = jail.directory().join("absent.toml");
            let config = load_config(path.to_str().unwrap()).map_err(|e| e.to_string())?;
            assert_eq!(config.server.max_upload_bytes, 1_048_576);
            assert!(!config.server.metrics_enabled);
            assert_eq!(config.server.api_prefix, "/api");
            Ok(())
        });
    }
}
