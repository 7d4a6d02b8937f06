use anyhow::Result;
use pet_registry::{
    config::AppConfig,
    routes::routes::build_router,
    services::{
        record_service::RecordService,
        store::{MEMORY_URL, RecordStore, memory::MemoryRecordStore, sqlite::SqliteRecordStore},
    },
};
use std::{fs, io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting pet-registry with config: {:?}", cfg);

    // --- Initialize record store ---
    let store: Arc<dyn RecordStore> = if cfg.database_url == MEMORY_URL {
        if migrate {
            tracing::info!("In-memory store has no schema; nothing to migrate.");
            return Ok(());
        }
        tracing::warn!("Using in-memory store; records are lost on shutdown");
        Arc::new(MemoryRecordStore::new())
    } else {
        // Create parent directory if needed
        if let Some(parent) = cfg.sqlite_path().as_deref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }

        tracing::debug!("Connecting using raw URL => {}", cfg.database_url);
        let sqlite = SqliteRecordStore::connect(&cfg.database_url, 5).await?;
        sqlite.migrate().await?;

        // --- Handle migration mode ---
        if migrate {
            tracing::info!("Database migration complete.");
            return Ok(());
        }
        Arc::new(sqlite)
    };

    // --- Initialize core service ---
    let service = RecordService::new(store);

    // --- Build router ---
    let app = build_router(service, &cfg.route_prefix, cfg.max_upload_bytes);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        "Server listening on http://{}{}/register",
        listener.local_addr()?,
        cfg.route_prefix
    );
    axum::serve(listener, app).await?;

    Ok(())
}
