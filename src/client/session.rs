//! Retrieval of a single paste by one viewer.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{Backend, ClientError};
use crate::crypto;
use crate::locator::{Fragment, Locator};
use crate::models::{Format, Visibility};
use crate::render;
use crate::types::api::PasteView;

/// A decrypted paste ready for display.
#[derive(Clone, PartialEq, Eq)]
pub struct OpenedPaste {
    pub id: String,
    pub title: String,
    pub plaintext: String,
    pub format: Format,
    pub language: String,
    pub visibility: Visibility,
    pub burn_after_reading: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub views: i64,
}

impl OpenedPaste {
    fn new(view: PasteView, plaintext: String) -> Self {
        OpenedPaste {
            id: view.id,
            title: view.title,
            plaintext,
            format: view.format,
            language: view.language,
            visibility: view.visibility,
            burn_after_reading: view.burn_after_reading,
            expires_at: view.expires_at,
            created_at: view.created_at,
            views: view.views,
        }
    }

    pub fn render_html(&self) -> String {
        render::render_html(&self.plaintext, self.format, &self.language)
    }

    pub fn render_terminal(&self) -> String {
        render::render_terminal(&self.plaintext, self.format, &self.language)
    }
}

impl fmt::Debug for OpenedPaste {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedPaste")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("format", &self.format)
            .field("language", &self.language)
            .field("burn_after_reading", &self.burn_after_reading)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    NotFound,
    Expired,
    /// `incorrect` is set when a password was supplied and rejected.
    PasswordRequired { incorrect: bool },
    MissingKey,
    /// Wrong key, or the stored content is corrupted.
    DecryptionFailed,
    Ready(OpenedPaste),
    Burned,
}

impl ViewState {
    pub fn message(&self) -> &'static str {
        match self {
            ViewState::Loading => "Loading paste...",
            ViewState::NotFound => "This paste does not exist or has been deleted.",
            ViewState::Expired => "This paste has expired and is no longer available.",
            ViewState::PasswordRequired { incorrect: false } => {
                "This paste is password protected. Enter the password to view it."
            }
            ViewState::PasswordRequired { incorrect: true } => {
                "Incorrect password. Try again."
            }
            ViewState::MissingKey => {
                "The link is missing its decryption key. Ask the sender for the complete link."
            }
            ViewState::DecryptionFailed => {
                "The paste could not be decrypted. The key is invalid or the content is corrupted."
            }
            ViewState::Ready(_) => "Paste decrypted.",
            ViewState::Burned => "This paste was burned after reading and no longer exists.",
        }
    }

    /// States that no further `load` can leave.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ViewState::Loading | ViewState::PasswordRequired { .. }
        )
    }
}

/// One viewer's page load of a paste.
pub struct ViewSession<'a, B> {
    backend: &'a B,
    locator: Locator,
    password: Option<String>,
    state: ViewState,
    view_counted: bool,
}

impl<'a, B: Backend> ViewSession<'a, B> {
    pub fn new(backend: &'a B, locator: Locator) -> Self {
        ViewSession {
            backend,
            locator,
            password: None,
            state: ViewState::Loading,
            view_counted: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Run retrieval: fetch, policy checks, decryption, view counting.
    ///
    /// Submitting a password re-runs the whole pipeline. Once the session has
    /// reached a terminal state, this only returns that state again.
    /// Storage failures are returned as errors and leave the state as it was.
    pub async fn load(&mut self, password: Option<&str>) -> Result<&ViewState, ClientError> {
        if self.state.is_terminal() {
            return Ok(&self.state);
        }
        if let Some(password) = password {
            self.password = Some(password.to_owned());
        }

        let id = self.locator.id().to_owned();
        debug!(%id, "loading paste");

        let view = match self.backend.open(&id, self.password.as_deref()).await {
            Ok(view) => view,
            Err(err) => return self.deny(err),
        };

        let key = match self.locator.fragment().clone() {
            Fragment::Key(key) => key,
            Fragment::Absent => return Ok(self.settle(ViewState::MissingKey)),
            Fragment::Invalid => return Ok(self.settle(ViewState::DecryptionFailed)),
        };
        let plaintext = match crypto::decrypt(&view.content, &key) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                debug!(%id, %err, "decryption failed");
                return Ok(self.settle(ViewState::DecryptionFailed));
            }
        };

        let mut opened = OpenedPaste::new(view, plaintext);
        if !self.view_counted {
            match self.backend.record_view(&id, self.password.as_deref()).await {
                Ok(views) => opened.views = views,
                Err(err) => return self.deny(err),
            }
            self.view_counted = true;
        }

        Ok(self.settle(ViewState::Ready(opened)))
    }

    /// Session-end hook: burn a burn-after-reading paste that was shown.
    ///
    /// Best effort. The state only becomes [`ViewState::Burned`] once the
    /// backend confirms the deletion.
    pub async fn end(&mut self) -> Result<&ViewState, ClientError> {
        let ViewState::Ready(opened) = &self.state else {
            return Ok(&self.state);
        };
        if !opened.burn_after_reading {
            return Ok(&self.state);
        }

        let id = opened.id.clone();
        if let Err(err) = self.backend.burn(&id, self.password.as_deref()).await {
            warn!(%id, %err, "failed to burn paste");
            return Err(err);
        }
        debug!(%id, "paste burned");
        Ok(self.settle(ViewState::Burned))
    }

    fn settle(&mut self, state: ViewState) -> &ViewState {
        self.state = state;
        &self.state
    }

    fn deny(&mut self, err: ClientError) -> Result<&ViewState, ClientError> {
        let state = match err {
            ClientError::NotFound => ViewState::NotFound,
            ClientError::Expired => ViewState::Expired,
            ClientError::PasswordRequired => ViewState::PasswordRequired { incorrect: false },
            ClientError::WrongPassword => ViewState::PasswordRequired { incorrect: true },
            err => return Err(err),
        };
        Ok(self.settle(state))
    }
}
