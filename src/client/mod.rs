//! The side of the exchange that holds keys.
//!
//! Everything here runs where the plaintext lives: keys are generated,
//! content is encrypted before it is handed to a [`Backend`], and fetched
//! content is decrypted again in a [`ViewSession`]. Backends only ever see
//! ciphertext and the server-visible part of a [`Locator`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::crypto::{self, CryptoError, PasteKey};
use crate::expiration::Expiration;
use crate::locator::{Locator, LocatorError};
use crate::models::{Format, Visibility};
use crate::types::api::{CreatePaste, CreatedPaste, ListQuery, PasteSummary, PasteView};
use crate::ApiError;

pub mod http;
pub mod local;
pub mod session;

pub use http::HttpBackend;
pub use local::LocalBackend;
pub use session::{OpenedPaste, ViewSession, ViewState};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("paste not found")]
    NotFound,
    #[error("paste has expired")]
    Expired,
    #[error("password required")]
    PasswordRequired,
    #[error("incorrect password")]
    WrongPassword,
    #[error("{0}")]
    Validation(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("storage unavailable, try again: {0}")]
    Storage(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    InvalidLocator(#[from] LocatorError),
    #[error("request failed, try again: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Storage(_) | ClientError::Http(_))
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound => ClientError::NotFound,
            ApiError::Expired => ClientError::Expired,
            ApiError::PasswordRequired => ClientError::PasswordRequired,
            ApiError::WrongPassword => ClientError::WrongPassword,
            ApiError::Validation(message) => ClientError::Validation(message),
            err if err.status_code().is_client_error() => ClientError::Rejected(err.to_string()),
            err => ClientError::Storage(err.to_string()),
        }
    }
}

/// Where pastes are stored. Implementations see ciphertext only.
pub trait Backend {
    async fn create(&self, request: CreatePaste) -> Result<CreatedPaste, ClientError>;

    async fn open(&self, id: &str, password: Option<&str>) -> Result<PasteView, ClientError>;

    /// Count one view, returning the new total.
    async fn record_view(&self, id: &str, password: Option<&str>) -> Result<i64, ClientError>;

    async fn burn(&self, id: &str, password: Option<&str>) -> Result<(), ClientError>;

    async fn delete(&self, id: &str, delete_key: &str) -> Result<(), ClientError>;

    async fn list(&self, query: ListQuery) -> Result<Vec<PasteSummary>, ClientError>;
}

/// What the creator fills in. `content` is plaintext.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub title: Option<String>,
    pub content: String,
    pub format: Format,
    pub language: Option<String>,
    pub visibility: Visibility,
    pub password: Option<String>,
    pub burn_after_reading: bool,
    pub expiration: Expiration,
}

/// Result of a successful creation. The locator is the only place the key
/// exists afterwards.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub locator: Locator,
    pub delete_key: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Encrypt a draft, store it, and build its shareable locator.
pub async fn create_paste<B: Backend>(backend: &B, draft: Draft) -> Result<Receipt, ClientError> {
    if draft.content.trim().is_empty() {
        return Err(ClientError::Validation("content must not be empty".into()));
    }

    let key = PasteKey::generate()?;
    let content = crypto::encrypt(&draft.content, &key)?;

    let created = backend
        .create(CreatePaste {
            title: draft.title,
            content,
            format: draft.format,
            language: draft.language,
            visibility: draft.visibility,
            password: draft.password,
            burn_after_reading: draft.burn_after_reading,
            expiration: draft.expiration,
        })
        .await?;
    debug!(id = %created.id, "paste stored");

    let address = Locator::parse(&created.url)?;
    Ok(Receipt {
        locator: Locator::new(address.base_url(), address.id(), Some(key)),
        delete_key: created.delete_key,
        expires_at: created.expires_at,
    })
}
