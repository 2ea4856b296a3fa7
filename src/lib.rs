//! Encrypted paste exchange.
//!
//! Content is encrypted on the client with a key that only ever travels in
//! the locator's fragment; the server stores ciphertext and enforces
//! expiration, the password gate, view counting and burn-after-reading.

use axum::extract::FromRef;
use tracing::info;

pub mod client;
pub mod clock;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod crypto;
pub mod db;
pub mod error;
pub mod expiration;
pub mod locator;
pub mod markdown;
pub mod models;
pub mod password;
pub mod render;
pub mod store;
pub mod types;

pub use error::{ApiError, ApiResult};

use config::{Config, StorageKind};
use db::Database;
use store::{AnyStore, MemoryStore};

/// Shared state of the paste server.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub store: AnyStore,
}

impl App {
    /// Open the configured store.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let store = match config.storage.kind {
            StorageKind::Database => {
                info!("using database storage");
                Database::connect(&config.database.url, config.database.max_connections)
                    .await?
                    .into()
            }
            StorageKind::Memory => {
                info!("using in-memory storage");
                MemoryStore::new().into()
            }
        };
        Ok(App { config, store })
    }
}
