mod community;
mod config;
mod db;
mod error;
mod http;
mod kafka;
mod models;
mod panels;
mod processor;
mod services;
mod sos;
mod state;

use std::sync::Arc;

use chrono::Utc;
use community::CommunityBoard;
use config::{AppConfig, StoreBackend};
use db::memory::MemoryStore;
use db::postgres::PgStore;
use db::Store;
use state::AppState;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting TourGuard service...");

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::init_pool(&config.database_url).await?;
            info!("Connected to database");
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; records are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(
        store,
        config.service.clone(),
        CommunityBoard::seeded(Utc::now()),
    ));

    if config.kafka_enabled {
        let kafka_config = config.clone();
        let kafka_state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = kafka::start_kafka_consumer(&kafka_config, kafka_state).await {
                error!("Kafka consumer stopped: {}", e);
            }
        });
    } else {
        info!("Kafka disabled; device SOS triggers are not consumed");
    }

    http::serve(config.http_port, state).await?;

    Ok(())
}
