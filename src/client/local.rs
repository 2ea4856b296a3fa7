use super::{Backend, ClientError};
use crate::clock::{Clock, SystemClock};
use crate::controllers::paste;
use crate::store::PasteStore;
use crate::types::api::{CreatePaste, CreatedPaste, ListQuery, PasteSummary, PasteView};

/// In-process backend running the server-side policy directly over a store.
pub struct LocalBackend<S, C = SystemClock> {
    store: S,
    clock: C,
    owner: String,
    base_url: String,
}

impl<S: PasteStore> LocalBackend<S> {
    pub fn new(store: S, owner: impl Into<String>, base_url: impl Into<String>) -> Self {
        LocalBackend::with_clock(store, SystemClock, owner, base_url)
    }
}

impl<S: PasteStore, C: Clock> LocalBackend<S, C> {
    pub fn with_clock(
        store: S,
        clock: C,
        owner: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        LocalBackend {
            store,
            clock,
            owner: owner.into(),
            base_url: base_url.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: PasteStore, C: Clock> Backend for LocalBackend<S, C> {
    async fn create(&self, request: CreatePaste) -> Result<CreatedPaste, ClientError> {
        let paste = paste::create(&self.store, &self.owner, request, self.clock.now()).await?;
        Ok(CreatedPaste::new(&paste, &self.base_url))
    }

    async fn open(&self, id: &str, password: Option<&str>) -> Result<PasteView, ClientError> {
        let paste = paste::open(&self.store, id, password, self.clock.now()).await?;
        Ok(paste.into())
    }

    async fn record_view(&self, id: &str, password: Option<&str>) -> Result<i64, ClientError> {
        Ok(paste::record_view(&self.store, id, password, self.clock.now()).await?)
    }

    async fn burn(&self, id: &str, password: Option<&str>) -> Result<(), ClientError> {
        Ok(paste::burn(&self.store, id, password, self.clock.now()).await?)
    }

    async fn delete(&self, id: &str, delete_key: &str) -> Result<(), ClientError> {
        Ok(paste::delete(&self.store, id, Some(delete_key)).await?)
    }

    async fn list(&self, query: ListQuery) -> Result<Vec<PasteSummary>, ClientError> {
        Ok(paste::list(&self.store, query, self.clock.now()).await?)
    }
}
