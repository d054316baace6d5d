mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use flock_api::{EngineAdapter, HttpApi};
use flock_core::{Engine, EngineContext, RuntimeHandle};
use flock_exec::{
    docker::DockerRuntime,
    memory::{MemoryRuntime, STATS_COMMAND, stats_handler},
};
use flock_observe::{FileActivityLog, init_local_offset, init_logger};
use flock_prometheus::PrometheusMetrics;

use crate::config::{AgentConfig, RuntimeKind};

/// Images the in-memory runtime starts with.
const MEMORY_IMAGES: [&str; 3] = ["alpine", "python:3.8", "tensorflow:my"];

#[derive(Parser, Debug)]
#[command(name = "flock-agentd")]
#[command(version, about = "Cluster orchestration agent", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address.
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Override the container runtime.
    #[arg(short, long, value_enum)]
    runtime: Option<RuntimeKind>,
}

fn main() -> anyhow::Result<()> {
    // local offset must be read while the process is still single-threaded
    init_local_offset();

    let args = Args::parse();
    let mut cfg = AgentConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        cfg.listen = listen;
    }
    if let Some(runtime) = args.runtime {
        cfg.runtime = runtime;
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(cfg))
}

async fn run(mut cfg: AgentConfig) -> anyhow::Result<()> {
    // 1) logger
    cfg.logger = cfg.logger.clone().with_env_overrides()?;
    init_logger(&cfg.logger)?;
    info!(runtime = %cfg.runtime, listen = %cfg.listen, "logger initialized");

    // 2) runtime
    let runtime: RuntimeHandle = match cfg.runtime {
        RuntimeKind::Docker => Arc::new(DockerRuntime::new(cfg.docker.clone())?),
        RuntimeKind::Memory => {
            if cfg.engine.workload.command == flock_core::config::DEFAULT_STATS_COMMAND {
                cfg.engine.workload.command = STATS_COMMAND.into();
            }
            Arc::new(
                MemoryRuntime::new()
                    .with_images(MEMORY_IMAGES)
                    .with_handler(stats_handler()),
            )
        }
    };
    cfg.validate()?;

    // 3) engine
    let metrics = Arc::new(PrometheusMetrics::new().context("failed to register metrics")?);
    let activity =
        Arc::new(FileActivityLog::new(&cfg.activity_log).with_time_zone(cfg.logger.tz));
    let engine = Engine::new(runtime, activity)
        .with_context(EngineContext::new(cfg.engine.clone(), metrics.clone()));
    info!(activity_log = %cfg.activity_log.display(), "engine ready");

    // 4) http
    let app = HttpApi::new(Arc::new(EngineAdapter::new(engine)))
        .router()
        .merge(metrics_router(metrics));

    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen))?;
    info!(addr = %cfg.listen, "http api listening");

    // 5) shutdown
    let token = CancellationToken::new();
    tokio::spawn(watch_signals(token.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(token.cancelled_owned())
        .await
        .context("http server failed")?;

    info!("agent stopped");
    Ok(())
}

fn metrics_router(metrics: Arc<PrometheusMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<PrometheusMetrics>>) -> Response {
    match metrics.encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn watch_signals(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => warn!(error = %e, "failed to listen for ctrl-c; shutting down"),
    }
    token.cancel();
}
