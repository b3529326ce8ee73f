use anyhow::{Context, Result};
use clap::Parser;
use sgconfig::Config;
use sgquery::api_rest::{SequencesState, create_router};
use sgquery::{SequenceAggregator, ShotGridConfigExt, open_configured_connection};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Filter used until the configuration is loaded
const STARTUP_LOG_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[derive(Parser, Debug)]
#[command(name = "sgsequences")]
#[command(about = "Lists the sequences and shots of a ShotGrid project with their query fields")]
#[command(version)]
struct Args {
    /// Configuration directory (default: $SGSEQ_CONFIG, ./.sgsequences or ~/.sgsequences)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<String>,

    /// Project to aggregate (default: query.project_id from the configuration)
    #[arg(short, long)]
    project: Option<i64>,

    /// Serve the aggregation over HTTP instead of printing it once
    #[arg(long)]
    serve: bool,
}

/// Installs the subscriber before anything logs; `RUST_LOG` wins when set
fn init_logging() -> FilterHandle {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(STARTUP_LOG_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    handle
}

/// Switches the running filter to `host.logger.min_level`
fn apply_log_level(handle: &FilterHandle, config: &Config) {
    let level = config.get_log_min_level();
    if let Err(e) = handle.reload(EnvFilter::new(&level)) {
        warn!("Failed to apply log level {}: {}", level, e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Ctrl+C received, shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = init_logging();
    let config = Config::load_config(args.config_dir.as_deref().unwrap_or(""))
        .context("Failed to load configuration")?;
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        apply_log_level(&log_filter, &config);
    }
    info!("Configuration loaded from {}", config.directory());

    let project_id = match args.project {
        Some(id) => id,
        None => config.get_default_project_id()?,
    };
    let query_fields = config.get_query_fields()?;

    let (_connector, client) = open_configured_connection(&config).await?;

    if !args.serve {
        let aggregator = SequenceAggregator::with_query_fields(client.as_ref(), query_fields);
        let sequences = aggregator.get_sequence_query_results(project_id).await?;
        println!("{}", serde_json::to_string_pretty(&sequences)?);
        return Ok(());
    }

    let state = SequencesState::new(client, project_id).with_query_fields(query_fields);
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.get_http_port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving sequences of project {} on http://{}", project_id, addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_configured_level_replaces_startup_filter() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new(STARTUP_LOG_LEVEL));
        let subscriber = tracing_subscriber::registry().with(filter);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));

            let dir = tempfile::tempdir().unwrap();
            let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
            config.set_log_min_level("debug".into()).unwrap();
            apply_log_level(&handle, &config);

            assert!(tracing::enabled!(Level::DEBUG));
        });
    }
}
