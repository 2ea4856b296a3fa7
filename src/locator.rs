//! Shareable paste addresses.
//!
//! A locator pairs a server-resolvable id with the client-only decryption key:
//! `https://<host>/safe-paste/<id>#<key>`. Only [`Locator::server_path`] may be
//! sent to a server; the key travels out of band.

use std::fmt;

use thiserror::Error;

use crate::crypto::PasteKey;

pub const PATH_PREFIX: &str = "/safe-paste/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("not a paste locator: expected .../safe-paste/<id>#<key>")]
    MissingPath,
    #[error("paste locator has an empty id")]
    EmptyId,
}

/// What the fragment of a locator carried.
#[derive(Clone, PartialEq, Eq)]
pub enum Fragment {
    Absent,
    Key(PasteKey),
    /// A fragment was present but is not a well-formed key.
    Invalid,
}

#[derive(Clone)]
pub struct Locator {
    base_url: String,
    id: String,
    fragment: Fragment,
}

impl Locator {
    pub fn new(base_url: impl Into<String>, id: impl Into<String>, key: Option<PasteKey>) -> Self {
        let fragment = match key {
            Some(key) => Fragment::Key(key),
            None => Fragment::Absent,
        };
        Locator::with_fragment(base_url, id, fragment)
    }

    fn with_fragment(base_url: impl Into<String>, id: impl Into<String>, fragment: Fragment) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Locator {
            base_url,
            id: id.into(),
            fragment,
        }
    }

    /// Parse a full locator URL. A missing or malformed fragment is recorded
    /// in [`Locator::fragment`] rather than failing the parse.
    pub fn parse(url: &str) -> Result<Self, LocatorError> {
        let url = url.trim();
        let (address, fragment) = match url.split_once('#') {
            Some((address, fragment)) => (address, Some(fragment)),
            None => (url, None),
        };

        let (base_url, rest) = address
            .rsplit_once(PATH_PREFIX)
            .ok_or(LocatorError::MissingPath)?;
        let id = rest.split(|c| c == '/' || c == '?').next().unwrap_or_default();
        let id = urlencoding::decode(id)
            .map(|id| id.into_owned())
            .unwrap_or_else(|_| id.to_owned());
        if id.is_empty() {
            return Err(LocatorError::EmptyId);
        }

        let fragment = match fragment.filter(|f| !f.is_empty()) {
            None => Fragment::Absent,
            Some(f) => PasteKey::parse(f).map_or(Fragment::Invalid, Fragment::Key),
        };

        Ok(Locator::with_fragment(base_url, id, fragment))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn key(&self) -> Option<&PasteKey> {
        match &self.fragment {
            Fragment::Key(key) => Some(key),
            _ => None,
        }
    }

    /// The part of the locator a server is allowed to see.
    pub fn server_path(&self) -> String {
        format!("{PATH_PREFIX}{}", urlencoding::encode(&self.id))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base_url, self.server_path())?;
        if let Some(key) = self.key() {
            write!(f, "#{}", key.encode())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("base_url", &self.base_url)
            .field("id", &self.id)
            .field(
                "key",
                &match self.fragment {
                    Fragment::Absent => "<absent>",
                    Fragment::Key(_) => "<redacted>",
                    Fragment::Invalid => "<invalid>",
                },
            )
            .finish()
    }
}
