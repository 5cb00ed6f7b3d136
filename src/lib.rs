pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use state::SharedState;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    for warning in config.warnings() {
        warn!("{warning}");
    }

    if prometheus_handle.is_some() {
        info!("Prometheus metrics recorder initialized");
    }

    match cli.command() {
        Commands::Serve => run_server(config, prometheus_handle).await,
        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }
        Commands::SeedAdmin => cmd_seed_admin(config).await,
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = if config.general.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder.build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("devcore v{} starting...", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let seed_on_startup = config.bootstrap.seed_on_startup;

    let shared = Arc::new(SharedState::new(config).await?);

    if seed_on_startup && shared.auth_service.seed_admin().await? {
        info!("Bootstrap admin created on startup");
    }

    let state = api::create_app_state(shared, prometheus_handle);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web API running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

async fn cmd_seed_admin(config: Config) -> anyhow::Result<()> {
    let username = config.bootstrap.admin_username.clone();
    let shared = SharedState::new(config).await?;

    if shared.auth_service.seed_admin().await? {
        println!("✓ Admin identity '{username}' created.");
    } else {
        println!("Admin identity '{username}' already exists.");
    }

    Ok(())
}
