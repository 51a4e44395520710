//! Top-level client for afstandmeten.nl.
//!
//! [`AfstandmetenClient`] owns the [`Session`] and hands out searches and
//! account actions that borrow it. Logging in or out needs `&mut self`, so
//! the login state cannot change underneath a live query.

use crate::account::AccountActions;
use crate::auth::{Identity, Session};
use crate::error::Result;
use crate::http::{ClientConfig, Transport};
use crate::search::SearchQuery;
use crate::types::Folder;

/// Blocking client for afstandmeten.nl.
#[derive(Debug)]
pub struct AfstandmetenClient {
    session: Session,
}

impl AfstandmetenClient {
    /// Create an anonymous client with the default [`ClientConfig`].
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            session: Session::new(config)?,
        })
    }

    /// Create a client over an explicit [`Transport`] (useful for testing or
    /// when requests go through a custom client).
    pub fn with_transport(http: Box<dyn Transport>, base_url: &str) -> Self {
        Self {
            session: Session::with_transport(http, base_url),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// See [`Session::login`].
    pub fn login(&mut self, username: &str, password: &str) -> Result<&Identity> {
        self.session.login(username, password)
    }

    /// See [`Session::logout`].
    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()
    }

    /// A blank query on the public folder.
    pub fn search(&self) -> SearchQuery<'_> {
        SearchQuery::new(&self.session)
    }

    /// A public query for `text` in route titles. Nothing is sent until the
    /// results are read.
    pub fn search_text(&self, text: &str) -> SearchQuery<'_> {
        let mut query = self.search();
        query.set_text(text);
        query
    }

    /// The logged-in user's own routes.
    pub fn private(&self) -> SearchQuery<'_> {
        self.folder(Folder::Private)
    }

    /// The logged-in user's favorite routes.
    pub fn favorites(&self) -> SearchQuery<'_> {
        self.folder(Folder::Favorite)
    }

    pub fn account(&self) -> AccountActions<'_> {
        AccountActions::new(&self.session)
    }

    fn folder(&self, folder: Folder) -> SearchQuery<'_> {
        let mut query = self.search();
        query.set_folder(folder);
        query
    }
}
