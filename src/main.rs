//! Trivia Hub Back binary entrypoint wiring the RPC routes, the message channel and the snapshot store.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_hub_back::{
    build_router,
    config::AppConfig,
    dao::{
        snapshot_store::{SnapshotStore, file::FileSnapshotStore},
        storage::StorageError,
        standings::{HttpStandingsSource, StandingsSource},
    },
    services::{scheduler, storage_supervisor},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let save_dir = config.save_dir().clone();
    let standings = standings_source(&config);
    let app_state = AppState::new(config);

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        let dir = save_dir.clone();
        async move {
            let store = FileSnapshotStore::open(dir).await?;
            Ok::<Arc<dyn SnapshotStore>, StorageError>(Arc::new(store))
        }
    }));
    tokio::spawn(scheduler::run(app_state.clone(), standings));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Standings poll source, when a base URL is configured and the client can be built.
fn standings_source(config: &AppConfig) -> Option<Arc<dyn StandingsSource>> {
    let base_url = config.standings_base_url()?;
    match HttpStandingsSource::new(base_url) {
        Ok(source) => {
            info!(base_url, "standings poll enabled");
            Some(Arc::new(source))
        }
        Err(err) => {
            warn!(error = %err, "standings poll disabled");
            None
        }
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
