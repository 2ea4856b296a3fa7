use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::ApiError;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_LANGUAGE: &str = "text";

/// Rendering hint for a paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Format {
    #[default]
    PlainText,
    SourceCode,
    Markdown,
}

/// Access-scoping hint for a paste. Enforcement beyond listing is external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Unlisted,
    Private,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(ApiError::CorruptRecord(format!(
                        concat!("unknown ", stringify!($ty), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(Format {
    PlainText => "plain_text",
    SourceCode => "source_code",
    Markdown => "markdown",
});

text_enum!(Visibility {
    Public => "public",
    Unlisted => "unlisted",
    Private => "private",
});

impl Format {
    pub fn label(self) -> &'static str {
        match self {
            Format::PlainText => "Plain Text",
            Format::SourceCode => "Source Code",
            Format::Markdown => "Markdown",
        }
    }
}

/// A stored paste. `content` is always ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub content: String,
    pub format: Format,
    pub language: String,
    pub visibility: Visibility,
    pub password_hash: Option<String>,
    pub delete_key: String,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub views: i64,
}

impl Paste {
    /// Whether the paste is logically gone at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| expires_at < now)
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Fields for a paste that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewPaste {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub content: String,
    pub format: Format,
    pub language: String,
    pub visibility: Visibility,
    pub password_hash: Option<String>,
    pub delete_key: String,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl NewPaste {
    pub fn into_paste(self) -> Paste {
        Paste {
            id: self.id,
            owner: self.owner,
            title: self.title,
            content: self.content,
            format: self.format,
            language: self.language,
            visibility: self.visibility,
            password_hash: self.password_hash,
            delete_key: self.delete_key,
            burn_after_reading: self.burn_after_reading,
            expires_at: self.expires_at,
            created_at: self.created_at,
            updated_at: self.created_at,
            views: 0,
        }
    }
}

/// Row shape of the `paste` table; enums are stored as text.
#[derive(FromRow)]
pub struct PasteRow {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub content: String,
    pub format: String,
    pub language: String,
    pub visibility: String,
    pub password_hash: Option<String>,
    pub delete_key: String,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub views: i64,
}

impl TryFrom<PasteRow> for Paste {
    type Error = ApiError;

    fn try_from(row: PasteRow) -> Result<Self, Self::Error> {
        Ok(Paste {
            format: row.format.parse()?,
            visibility: row.visibility.parse()?,
            id: row.id,
            owner: row.owner,
            title: row.title,
            content: row.content,
            language: row.language,
            password_hash: row.password_hash,
            delete_key: row.delete_key,
            burn_after_reading: row.burn_after_reading,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            views: row.views,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn paste(expires_at: Option<DateTime<Utc>>) -> Paste {
        let now = Utc::now();
        NewPaste {
            id: "id".into(),
            owner: "owner".into(),
            title: DEFAULT_TITLE.into(),
            content: "ciphertext".into(),
            format: Format::default(),
            language: DEFAULT_LANGUAGE.into(),
            visibility: Visibility::default(),
            password_hash: None,
            delete_key: "dk".into(),
            burn_after_reading: false,
            expires_at,
            created_at: now,
        }
        .into_paste()
    }

    #[test]
    fn expires_once_the_deadline_has_passed() {
        let now = Utc::now();
        assert!(!paste(None).is_expired(now + Duration::days(10_000)));
        assert!(!paste(Some(now)).is_expired(now));
        assert!(paste(Some(now)).is_expired(now + Duration::milliseconds(1)));
    }

    #[test]
    fn new_paste_starts_unviewed() {
        let p = paste(None);
        assert_eq!(p.views, 0);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn enums_round_trip_through_text() {
        for f in [Format::PlainText, Format::SourceCode, Format::Markdown] {
            assert_eq!(f.as_str().parse::<Format>().unwrap(), f);
            assert_eq!(
                serde_json::to_string(&f).unwrap(),
                format!("\"{}\"", f.as_str())
            );
        }
        for v in [Visibility::Public, Visibility::Unlisted, Visibility::Private] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
        assert!("secret".parse::<Visibility>().is_err());
    }
}
