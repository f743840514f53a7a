//! Shiai Back binary entrypoint wiring the REST API, SSE stream and the
//! selected storage backend.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use shiai_back::config::AppConfig;
use shiai_back::dao::{storage::StorageError, store::TournamentStore};
use shiai_back::services::storage_supervisor;
use shiai_back::state::{AppState, SharedState};

/// Environment variable selecting the persistence backend (`json` or `mongo`).
const BACKEND_ENV: &str = "STORAGE_BACKEND";
/// Environment variable pointing the flat-file backend at its data directory.
const DATA_DIR_ENV: &str = "SHIAI_BACK_DATA_DIR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let state = AppState::new(config);

    spawn_storage_supervisor(state.clone())?;

    let app = build_router(state);

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

/// Pick the storage backend from the environment and hand it to the
/// supervisor, which owns connection retries and degraded-mode flips.
fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    let backend = env::var(BACKEND_ENV).unwrap_or_else(|_| "json".into());

    match backend.as_str() {
        #[cfg(feature = "json-store")]
        "json" => {
            let data_dir: PathBuf = env::var(DATA_DIR_ENV)
                .unwrap_or_else(|_| "data".into())
                .into();
            info!(dir = %data_dir.display(), "using flat-file storage backend");
            let connect = move || {
                let dir = data_dir.clone();
                async move {
                    let store = shiai_back::dao::store::jsonfile::JsonFileStore::open(dir).await?;
                    Ok(Arc::new(store) as Arc<dyn TournamentStore>)
                }
            };
            tokio::spawn(storage_supervisor::run(state, connect));
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            info!("using MongoDB storage backend");
            let connect = || async {
                use shiai_back::dao::store::mongodb::{MongoConfig, MongoTournamentStore};

                let config = MongoConfig::from_env().await?;
                let store = MongoTournamentStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn TournamentStore>)
            };
            tokio::spawn(storage_supervisor::run(state, connect));
        }
        other => anyhow::bail!("unsupported storage backend {other:?}"),
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    shiai_back::routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
