use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::serve;
use cropsense_site_api::{build_state, create_router, SiteConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SiteConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config);

    let host = config.server_host.clone();
    let port = config.server_port;

    info!(
        host = %host,
        port,
        store = ?config.store,
        data_dir = %config.data_dir.display(),
        inference_url = %config.inference_url,
        "starting site-api service"
    );

    let state = Arc::new(build_state(config).context("failed to build application state")?);

    if !state.config.privileged_identities.is_empty() {
        match state.seed_privileged_identities() {
            Ok(seeded) => info!(seeded, "marked privileged identities"),
            Err(err) => warn!(error = %err, "failed to seed privileged identities"),
        }
    }

    let router = create_router(Arc::clone(&state));
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("invalid server bind address")?;

    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;
    info!(local_addr = %listener.local_addr()?, "site-api listening");

    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server encountered an unrecoverable error")?;

    info!("site-api service shutting down");
    Ok(())
}

fn init_tracing(config: &SiteConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    fmt().with_env_filter(filter).with_target(false).compact().init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
