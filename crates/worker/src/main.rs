//! Worker Host entry point (§4.6, §10.4, §6.5).

mod error;
mod host;
mod http;
mod profile_loader;
mod provider_factory;
mod transport;

use std::net::SocketAddr;
use std::process::ExitCode as ProcessExitCode;
use std::sync::Arc;

use interlingo_config::{RuntimeEnvironment, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::ExitCode;
use crate::host::WorkerHost;
use crate::profile_loader::PersistentProfileLoader;
use crate::provider_factory::HttpProviderFactory;

#[tokio::main]
async fn main() -> ProcessExitCode {
    let env = std::env::var("INTERLINGO_ENV")
        .ok()
        .and_then(|raw| match raw.as_str() {
            "production" => Some(RuntimeEnvironment::Production),
            "staging" => Some(RuntimeEnvironment::Staging),
            _ => Some(RuntimeEnvironment::Development),
        })
        .unwrap_or_default();

    let settings = match Settings::load(env) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("fatal configuration error: {err}");
            return to_process_code(ExitCode::FatalConfig);
        }
    };

    init_tracing(&settings);
    tracing::info!(environment = %settings.environment, "starting interlingo worker host");

    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(error = %err, "failed to install Prometheus recorder");
            return to_process_code(ExitCode::FatalConfig);
        }
    };

    let provider_factory = match HttpProviderFactory::new(&settings.providers) {
        Ok(factory) => Arc::new(factory),
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize provider adapters");
            return to_process_code(ExitCode::FatalConfig);
        }
    };

    let scylla_config = interlingo_persistence::ScyllaConfig {
        hosts: settings.persistence.scylla_nodes.clone(),
        keyspace: settings.persistence.keyspace.clone(),
        replication_factor: 1,
    };

    let (host, persistence) = match interlingo_persistence::init(scylla_config).await {
        Ok(layer) => {
            tracing::info!(keyspace = %settings.persistence.keyspace, "ScyllaDB persistence initialized");
            let layer = Arc::new(layer);
            let loader = Arc::new(PersistentProfileLoader::new((*layer).clone()));
            let host = Arc::new(WorkerHost::new(
                loader,
                provider_factory,
                settings.coordinator.clone(),
                settings.buffer.clone(),
            ));
            (host, Some(layer))
        }
        Err(err) => {
            tracing::warn!(error = %err, "persistence unreachable at startup, falling back to in-memory profile store");
            let host = Arc::new(WorkerHost::without_persistence(
                provider_factory,
                settings.coordinator.clone(),
                settings.buffer.clone(),
            ));
            (host, None)
        }
    };

    let app_state = http::AppState { host: host.clone(), metrics_handle, persistence };
    let app = http::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind listener");
            return to_process_code(ExitCode::FatalConfig);
        }
    };
    tracing::info!(%addr, "listening");

    if let Err(err) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        tracing::error!(error = %err, "server exited with an error");
        return to_process_code(ExitCode::FatalConfig);
    }

    tracing::info!("draining active room coordinators");
    host.shutdown_all().await;
    tracing::info!("worker host shutdown complete");
    to_process_code(ExitCode::Clean)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => tracing::info!("received SIGTERM, initiating graceful shutdown"),
    }
}

fn init_tracing(settings: &Settings) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.observability.log_filter.clone().into());

    let fmt_layer = if settings.observability.log_format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}

fn to_process_code(code: ExitCode) -> ProcessExitCode {
    ProcessExitCode::from(code as u8)
}
