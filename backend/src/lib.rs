//! Student achievement tracking backend.
//!
//! Reference rows (status, ownership, verification stamps) live in SQLite;
//! achievement documents live in MongoDB. The [`orchestrator`] is the only
//! place the two meet.

pub mod access;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod store;
pub mod uploads;

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use crate::access::TokenVerifier;
use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::state::AppState;
use crate::store::memory::MemoryDocuments;
use crate::store::mongo::MongoDocuments;
use crate::store::sqlite::SqliteStore;
use crate::store::{DirectoryStore, DocumentStore};
use crate::uploads::LocalUploads;

fn to_io<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> io::Error + '_ {
    move |e| io::Error::other(format!("{context}: {e}"))
}

async fn documents(config: &Config) -> io::Result<Arc<dyn DocumentStore>> {
    match &config.mongodb_uri {
        Some(uri) => {
            let store = MongoDocuments::connect(uri, &config.mongodb_db)
                .await
                .map_err(to_io("MongoDB connection failed"))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("Using the in-process document store");
            Ok(Arc::new(MemoryDocuments::new()))
        }
    }
}

/// Wires the stores together and builds the shared handler state.
pub async fn build_state(config: &Config) -> io::Result<AppState> {
    let sqlite = SqliteStore::open(&config.database_path).map_err(to_io("SQLite open failed"))?;
    info!("Relational store ready at {}", config.database_path.display());

    let directory: Arc<dyn DirectoryStore> = Arc::new(sqlite.clone());
    let uploads = Arc::new(LocalUploads::new(&config.upload_dir, &config.upload_url_prefix));
    let orchestrator = Orchestrator::new(
        Arc::new(sqlite),
        documents(config).await?,
        directory.clone(),
        uploads,
    );

    Ok(AppState {
        orchestrator,
        directory,
        max_upload_bytes: config.max_upload_bytes,
    })
}

pub async fn start_server() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {e}");
        io::Error::other(e.to_string())
    })?;

    let state = web::Data::new(build_state(&config).await?);
    let verifier = web::Data::new(TokenVerifier::new(&config.jwt_secret));
    let (host, port) = config.address();

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(verifier.clone())
            .configure(services::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
