use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use life_manager_api::data::memory::InMemoryKeyValueStore;
use life_manager_api::data::sled_store::SledKeyValueStore;
use life_manager_api::data::uploads::{FsUploadStore, InMemoryUploadStore};
use life_manager_api::domain::repository::{KeyValueStore, UploadStore};
use life_manager_api::infrastructure::config::Config;
use life_manager_api::infrastructure::logging::init_logging;
use life_manager_api::presentation::handlers::AppContext;
use life_manager_api::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use life_manager_api::presentation::routes::configure;
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn cors(origin: Option<&str>) -> Cors {
    match origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[tokio::main]
#[instrument]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_logging(&config.log_filter);
    info!("Logging initialized successfully");

    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the development secret");
    }

    let store: Arc<dyn KeyValueStore> = match &config.data_dir {
        Some(dir) => {
            info!(path = %dir.display(), "Using sled storage");
            Arc::new(SledKeyValueStore::open(dir.join("db"))?)
        }
        None => {
            warn!("DATA_DIR is not set; data will not survive a restart");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };

    let uploads: Arc<dyn UploadStore> = match &config.upload_dir {
        Some(dir) => Arc::new(FsUploadStore::open(dir).await?),
        None => Arc::new(InMemoryUploadStore::new()),
    };

    info!("Initializing application state");
    let ctx = AppContext::new(store, uploads, &config);
    let cors_origin = config.cors_origin.clone();

    info!("Configuring HTTP server");
    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors(cors_origin.as_deref()))
            .configure(|cfg| configure(cfg, &ctx))
    });

    let (host, port) = config.bind_address();
    let bind_addr = format!("{}:{}", host, port);
    info!(address = %bind_addr, "Binding server to address");
    let server = server
        .bind((host, port))
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!(address = %bind_addr, "Starting HTTP server");
    server.run().await?;
    Ok(())
}
