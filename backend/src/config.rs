//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.
//! Only `JWT_SECRET` is mandatory; everything else falls back to a default
//! that is logged at startup.

use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use log::{info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the relational store.
    pub database_path: PathBuf,
    /// When unset, documents are kept in process memory.
    pub mongodb_uri: Option<String>,
    pub mongodb_db: String,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    /// Public prefix of attachment URLs; the file name is appended.
    pub upload_url_prefix: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded variables from .env");
        }

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        let mongodb_uri = env::var("MONGODB_URI").ok().filter(|uri| !uri.trim().is_empty());
        if mongodb_uri.is_none() {
            warn!("MONGODB_URI not set, achievement documents will only live in memory");
        }

        Ok(Self {
            host: try_load("HOST", "127.0.0.1")?,
            port: try_load("PORT", "8080")?,
            database_path: try_load("DATABASE_PATH", "achievements.sqlite")?,
            mongodb_uri,
            mongodb_db: try_load("MONGODB_DB", "achievements")?,
            jwt_secret,
            upload_dir: try_load("UPLOAD_DIR", "./uploads")?,
            upload_url_prefix: try_load("UPLOAD_URL_PREFIX", "/uploads")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
        })
    }

    pub fn address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}
