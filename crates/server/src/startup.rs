use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use common::{env::ensure_parent_dir, utils::logging::init_logging_from_env};
use configs::{AppConfig, StorageBackend};
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::repository::{MemoryResourceRepository, ResourceRepository, SeaOrmResourceRepository};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the configured repository backend into the handler state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let repo: Arc<dyn ResourceRepository> = match cfg.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryResourceRepository::new()),
        StorageBackend::File => {
            ensure_parent_dir(&cfg.storage.snapshot_path).await?;
            let repo = MemoryResourceRepository::open(&cfg.storage.snapshot_path)
                .await
                .with_context(|| format!("opening snapshot {}", cfg.storage.snapshot_path))?;
            Arc::new(repo)
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None).await.context("running migrations")?;
            Arc::new(SeaOrmResourceRepository::new(db, models::project::ENTITY))
        }
    };
    info!(backend = ?cfg.storage.backend, unique_title_per_owner = cfg.resource.unique_title_per_owner, "repository ready");
    Ok(AppState::new(repo, cfg.resource.unique_title_per_owner))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_or_default()?;
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting project server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
