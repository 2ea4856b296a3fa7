//! Table storage for pastes.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{Format, NewPaste, Paste, Visibility};

pub mod memory;

pub use memory::MemoryStore;

/// Row filter for [`PasteStore::select`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PasteFilter {
    pub visibility: Option<Visibility>,
    pub format: Option<Format>,
    /// Literal substring of the title, ignoring ASCII case.
    pub search: Option<String>,
}

impl PasteFilter {
    pub fn matches(&self, paste: &Paste) -> bool {
        self.visibility.map_or(true, |v| paste.visibility == v)
            && self.format.map_or(true, |f| paste.format == f)
            && self.search.as_deref().map_or(true, |q| {
                paste
                    .title
                    .to_ascii_lowercase()
                    .contains(&q.to_ascii_lowercase())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PasteOrder {
    #[default]
    Newest,
    Oldest,
    MostViewed,
}

pub trait PasteStore {
    /// Insert a new paste.
    async fn insert(&self, paste: NewPaste) -> crate::ApiResult<Paste>;

    /// Get a paste by id.
    async fn get(&self, id: &str) -> crate::ApiResult<Option<Paste>>;

    /// Get all pastes matching `filter`, sorted by `order`.
    async fn select(&self, filter: &PasteFilter, order: PasteOrder)
        -> crate::ApiResult<Vec<Paste>>;

    /// Atomically bump the view counter, returning the new count.
    async fn increment_views(&self, id: &str, now: DateTime<Utc>)
        -> crate::ApiResult<Option<i64>>;

    /// Delete a paste by id, returning whether it existed.
    async fn delete(&self, id: &str) -> crate::ApiResult<bool>;
}

#[derive(Clone)]
pub enum AnyStore {
    Database(Database),
    Memory(MemoryStore),
}

impl PasteStore for AnyStore {
    async fn insert(&self, paste: NewPaste) -> crate::ApiResult<Paste> {
        match self {
            AnyStore::Database(db) => db.insert(paste).await,
            AnyStore::Memory(mem) => mem.insert(paste).await,
        }
    }

    async fn get(&self, id: &str) -> crate::ApiResult<Option<Paste>> {
        match self {
            AnyStore::Database(db) => db.get(id).await,
            AnyStore::Memory(mem) => mem.get(id).await,
        }
    }

    async fn select(
        &self,
        filter: &PasteFilter,
        order: PasteOrder,
    ) -> crate::ApiResult<Vec<Paste>> {
        match self {
            AnyStore::Database(db) => db.select(filter, order).await,
            AnyStore::Memory(mem) => mem.select(filter, order).await,
        }
    }

    async fn increment_views(&self, id: &str, now: DateTime<Utc>) -> crate::ApiResult<Option<i64>> {
        match self {
            AnyStore::Database(db) => db.increment_views(id, now).await,
            AnyStore::Memory(mem) => mem.increment_views(id, now).await,
        }
    }

    async fn delete(&self, id: &str) -> crate::ApiResult<bool> {
        match self {
            AnyStore::Database(db) => db.delete(id).await,
            AnyStore::Memory(mem) => mem.delete(id).await,
        }
    }
}

impl From<Database> for AnyStore {
    fn from(value: Database) -> Self {
        AnyStore::Database(value)
    }
}

impl From<MemoryStore> for AnyStore {
    fn from(value: MemoryStore) -> Self {
        AnyStore::Memory(value)
    }
}
