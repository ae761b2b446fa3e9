mod api;
mod cli;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use sg_domain::config::Config;
use sg_modelclient::{HttpModelServiceConnection, ModelServiceConnection};
use sg_sessions::SessionStore;

use crate::cli::{Cli, Command};
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let forced_shutdown = tokio::runtime::Runtime::new()?.block_on(run_server())?;
            if forced_shutdown {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Version => {
            println!("voicegate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Runs the server to completion. Returns whether any session had to be
/// force-closed at shutdown, so `main` can exit 1 instead of 0.
async fn run_server() -> anyhow::Result<bool> {
    let config = Config::from_env().context("loading configuration")?;
    init_tracing(&config.observability);

    let issues = config.validate();
    for issue in &issues {
        tracing::warn!(%issue, "configuration issue");
    }

    let config = Arc::new(config);
    let sessions = Arc::new(SessionStore::new());
    let tool_registry = Arc::new(sg_tools::default_registry());
    let model_client: Arc<dyn ModelServiceConnection> =
        Arc::new(HttpModelServiceConnection::new(config.model_service.clone())?);

    let state = AppState::new(config.clone(), sessions.clone(), tool_registry, model_client);

    spawn_sweeper(sessions.clone(), config.clone());

    let app = api::router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    tracing::info!(%addr, "voicegate listening");

    let forced_shutdown = Arc::new(AtomicBool::new(false));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions, config, forced_shutdown.clone()))
        .await
        .context("running http server")?;

    Ok(forced_shutdown.load(Ordering::SeqCst))
}

/// C9: a single background task that force-closes sessions idle past
/// `sweeper.idle_timeout_secs`, ticking every `sweeper.period_secs`.
fn spawn_sweeper(sessions: Arc<SessionStore>, config: Arc<Config>) {
    tokio::spawn(async move {
        let period = Duration::from_secs(config.sweeper.period_secs);
        let idle_timeout = Duration::from_secs(config.sweeper.idle_timeout_secs.max(0) as u64);
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            interval.tick().await;
            sessions.sweep_idle(idle_timeout).await;
        }
    });
}

/// Waits for Ctrl-C, then drives C9's shutdown path: graceful close of
/// every open session in parallel, bounded by `shutdown_deadline_secs`.
/// Records into `forced_shutdown` whether any session missed the
/// deadline, so the process can exit 1 instead of 0.
async fn shutdown_signal(
    sessions: Arc<SessionStore>,
    config: Arc<Config>,
    forced_shutdown: Arc<AtomicBool>,
) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("shutdown signal received, draining sessions");

    let deadline = Duration::from_secs(config.sweeper.shutdown_deadline_secs);
    let forced = sessions.shutdown_all(deadline).await;
    forced_shutdown.store(forced, Ordering::SeqCst);
}

fn init_tracing(observability: &sg_domain::config::ObservabilityConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&observability.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if observability.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
