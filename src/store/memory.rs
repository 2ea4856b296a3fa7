use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PasteFilter, PasteOrder, PasteStore};
use crate::models::{NewPaste, Paste};
use crate::ApiError;

/// Process-local paste table. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pastes: Arc<RwLock<HashMap<String, Paste>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasteStore for MemoryStore {
    async fn insert(&self, paste: NewPaste) -> crate::ApiResult<Paste> {
        let mut pastes = self.pastes.write().await;
        if pastes.contains_key(&paste.id) {
            return Err(ApiError::Validation(format!("duplicate paste id '{}'", paste.id)));
        }
        let paste = paste.into_paste();
        pastes.insert(paste.id.clone(), paste.clone());
        Ok(paste)
    }

    async fn get(&self, id: &str) -> crate::ApiResult<Option<Paste>> {
        Ok(self.pastes.read().await.get(id).cloned())
    }

    async fn select(
        &self,
        filter: &PasteFilter,
        order: PasteOrder,
    ) -> crate::ApiResult<Vec<Paste>> {
        let mut matched: Vec<Paste> = self
            .pastes
            .read()
            .await
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        match order {
            PasteOrder::Newest => matched.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            PasteOrder::Oldest => matched.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            PasteOrder::MostViewed => matched.sort_by(|a, b| {
                b.views
                    .cmp(&a.views)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }

        Ok(matched)
    }

    async fn increment_views(&self, id: &str, now: DateTime<Utc>) -> crate::ApiResult<Option<i64>> {
        let mut pastes = self.pastes.write().await;
        Ok(pastes.get_mut(id).map(|paste| {
            paste.views += 1;
            paste.updated_at = now;
            paste.views
        }))
    }

    async fn delete(&self, id: &str) -> crate::ApiResult<bool> {
        Ok(self.pastes.write().await.remove(id).is_some())
    }
}
