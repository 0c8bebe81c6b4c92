use std::sync::Arc;
use std::time::Duration;

use figaro_app::app::api::routes;
use figaro_app::config::ConfigHandler;
use figaro_app::services_handler::ServicesHandler;
use figaro_core::config::{Settings, load_config};
use figaro_db::db::connection::create_pool;
use figaro_db::db::migrate::run_pending_migrations;
use figaro_service::services::Services;
use salvo::conn::TcpListener;
use salvo::logging::Logger;
use salvo::server::ServerHandle;
use salvo::{Listener, Router, Server};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

/// Time in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = init_tracing();

    let config = load_config()?;
    apply_log_level(&filter, &config);
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        data_dir = %config.storage.data_dir,
        oauth_enabled = config.oauth.enabled,
        "Starting Figaro gateway"
    );

    let database_url = config.database.url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url)).await??;
    tracing::info!(applied, "Database migrations applied");

    let pool = create_pool(&config.database.url, u32::from(config.database.max_connections)).await?;
    let services = Arc::new(Services::with_provider(pool, &config));

    let router = Router::new()
        .hoop(Logger::new())
        .hoop(ConfigHandler::new(config.clone()))
        .hoop(ServicesHandler { services })
        .push(routes());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;
    let server = Server::new(acceptor);
    tokio::spawn(stop_on_signal(server.handle()));

    tracing::info!(%bind_addr, "Listening");
    server.serve(router).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Starts at `debug` until the configured level is known.
fn init_tracing() -> Handle<EnvFilter, Registry> {
    let (filter_layer, handle) = reload::Layer::new(EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
        .init();
    handle
}

fn apply_log_level(handle: &Handle<EnvFilter, Registry>, config: &Settings) {
    let level = config.logging.level.as_str();
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.modify(|current| *current = filter) {
                tracing::warn!(error = %e, "Failed to apply configured log level");
            }
        }
        Err(e) => tracing::warn!(level, error = %e, "Invalid log level, keeping debug"),
    }
}

async fn stop_on_signal(handle: ServerHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown requested, draining connections");
    handle.stop_graceful(SHUTDOWN_GRACE);
}
