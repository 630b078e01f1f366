mod config;
mod criteria;
mod db;
mod errors;
mod filter;
mod handlers;
mod models;
mod query;
mod repository;
mod utils;

use std::io;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{info, warn};

use config::{AppConfig, StorageBackend};
use handlers::AppState;
use repository::Storage;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let storage = match (&config.storage, &config.database_url) {
        (StorageBackend::Postgres, Some(database_url)) => {
            let pool = db::create_pool(database_url, config.max_connections)
                .await
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            db::run_migrations(&pool)
                .await
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            Storage::Postgres(pool)
        }
        (StorageBackend::Postgres, None) => {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "DATABASE_URL must be set"));
        }
        (StorageBackend::Memory, _) => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Storage::memory()
        }
    };

    let state = web::Data::new(AppState::new(storage, config.app_name.clone()));

    info!("Starting server at {}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
