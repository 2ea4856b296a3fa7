use chrono::{DateTime, Utc};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::models::{NewPaste, Paste, PasteRow};
use crate::store::{PasteFilter, PasteOrder, PasteStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS paste (
    id TEXT PRIMARY KEY NOT NULL,
    owner TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    format TEXT NOT NULL,
    language TEXT NOT NULL,
    visibility TEXT NOT NULL,
    password_hash TEXT,
    delete_key TEXT NOT NULL,
    burn_after_reading BOOLEAN NOT NULL,
    expires_at DATETIME,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL,
    views BIGINT NOT NULL DEFAULT 0
)";

const COLUMNS: &str = "id, owner, title, content, format, language, visibility, password_hash, \
                       delete_key, burn_after_reading, expires_at, created_at, updated_at, views";

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to a database by URL and make sure the paste table exists.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

impl PasteStore for Database {
    async fn insert(&self, paste: NewPaste) -> crate::ApiResult<Paste> {
        let row = sqlx::query_as::<_, PasteRow>(&format!(
            "INSERT INTO paste ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0) \
             RETURNING {COLUMNS}"
        ))
        .bind(&paste.id)
        .bind(&paste.owner)
        .bind(&paste.title)
        .bind(&paste.content)
        .bind(paste.format.as_str())
        .bind(&paste.language)
        .bind(paste.visibility.as_str())
        .bind(&paste.password_hash)
        .bind(&paste.delete_key)
        .bind(paste.burn_after_reading)
        .bind(paste.expires_at)
        .bind(paste.created_at)
        .bind(paste.created_at)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn get(&self, id: &str) -> crate::ApiResult<Option<Paste>> {
        let row = sqlx::query_as::<_, PasteRow>(&format!("SELECT {COLUMNS} FROM paste WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Paste::try_from).transpose()
    }

    async fn select(
        &self,
        filter: &PasteFilter,
        order: PasteOrder,
    ) -> crate::ApiResult<Vec<Paste>> {
        let order_by = match order {
            PasteOrder::Newest => "created_at DESC",
            PasteOrder::Oldest => "created_at ASC",
            PasteOrder::MostViewed => "views DESC, created_at DESC",
        };
        let pattern = filter.search.as_deref().map(like_pattern);

        let rows = sqlx::query_as::<_, PasteRow>(&format!(
            "SELECT {COLUMNS} FROM paste \
             WHERE (? IS NULL OR visibility = ?) \
             AND (? IS NULL OR format = ?) \
             AND (? IS NULL OR LOWER(title) LIKE ? ESCAPE '\\') \
             ORDER BY {order_by}"
        ))
        .bind(filter.visibility.map(|v| v.as_str()))
        .bind(filter.visibility.map(|v| v.as_str()))
        .bind(filter.format.map(|f| f.as_str()))
        .bind(filter.format.map(|f| f.as_str()))
        .bind(pattern.clone())
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Paste::try_from).collect()
    }

    async fn increment_views(&self, id: &str, now: DateTime<Utc>) -> crate::ApiResult<Option<i64>> {
        let views = sqlx::query_scalar::<_, i64>(
            "UPDATE paste SET views = views + 1, updated_at = ? WHERE id = ? RETURNING views",
        )
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(views)
    }

    async fn delete(&self, id: &str) -> crate::ApiResult<bool> {
        let result = sqlx::query("DELETE FROM paste WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `LIKE` pattern matching `search` literally anywhere in a lowercased title.
/// SQLite's `LOWER` only folds ASCII, so neither does this.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c.to_ascii_lowercase());
    }
    pattern.push('%');
    pattern
}
