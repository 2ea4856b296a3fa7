//! JSON bodies exchanged between the paste server and its clients.
//!
//! None of these types carry a decryption key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::expiration::Expiration;
use crate::locator::PATH_PREFIX;
use crate::models::{Format, Paste, Visibility};
use crate::store::PasteOrder;

/// Header carrying the password gate on retrieval requests.
pub const PASSWORD_HEADER: &str = "x-paste-password";

/// Header carrying the delete key on `DELETE /api/pastes/:id`.
pub const DELETE_KEY_HEADER: &str = "x-delete-key";

/// Request body for `POST /api/pastes`. `content` is ciphertext.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePaste {
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub burn_after_reading: bool,
    #[serde(default)]
    pub expiration: Expiration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPaste {
    pub id: String,
    /// Server-visible path of the paste, without any fragment.
    pub path: String,
    pub url: String,
    pub delete_key: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreatedPaste {
    pub fn new(paste: &Paste, base_url: &str) -> Self {
        let path = format!("{PATH_PREFIX}{}", encode(&paste.id));
        CreatedPaste {
            id: paste.id.clone(),
            url: format!("{}{path}", base_url.trim_end_matches('/')),
            path,
            delete_key: paste.delete_key.clone(),
            expires_at: paste.expires_at,
        }
    }
}

/// A paste as handed to an authorized viewer. `content` is still ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub format: Format,
    pub language: String,
    pub visibility: Visibility,
    pub password_protected: bool,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub views: i64,
}

impl From<Paste> for PasteView {
    fn from(paste: Paste) -> Self {
        PasteView {
            password_protected: paste.is_password_protected(),
            id: paste.id,
            title: paste.title,
            content: paste.content,
            format: paste.format,
            language: paste.language,
            visibility: paste.visibility,
            burn_after_reading: paste.burn_after_reading,
            expires_at: paste.expires_at,
            created_at: paste.created_at,
            updated_at: paste.updated_at,
            views: paste.views,
        }
    }
}

/// Listing row; never includes content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteSummary {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub format: Format,
    pub language: String,
    pub visibility: Visibility,
    pub password_protected: bool,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub views: i64,
}

impl From<Paste> for PasteSummary {
    fn from(paste: Paste) -> Self {
        PasteSummary {
            password_protected: paste.is_password_protected(),
            id: paste.id,
            owner: paste.owner,
            title: paste.title,
            format: paste.format,
            language: paste.language,
            visibility: paste.visibility,
            burn_after_reading: paste.burn_after_reading,
            expires_at: paste.expires_at,
            created_at: paste.created_at,
            views: paste.views,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCount {
    pub views: i64,
}

/// Query string for `GET /api/pastes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub format: Option<Format>,
    pub order: Option<PasteOrder>,
}
