//! Session management: login state on top of the cookie jar.
//!
//! afstandmeten.nl keeps the login in a PHP session cookie. The [`Session`]
//! owns the transport holding that cookie jar, so searches and account
//! actions that borrow the session automatically send it.
//!
//! After a successful login the site renders an action panel:
//!
//! ```html
//! <legend>Acties voor Jan Jansen</legend>
//! <input type="hidden" name="login" value="98765">
//! <input type="hidden" name="gotoWoonplaats" value="Utrecht">
//! <input type="hidden" name="gotoLand" value="Nederland">
//! ```
//!
//! which is where [`Identity`] comes from.

use crate::error::{AfstandmetenError, Result};
use crate::http::{ClientConfig, HttpTransport, LOGIN_PATH, LOGOUT_PATH, Transport};
use crate::parse::{LoginPage, parse_login_page};
use serde::{Deserialize, Serialize};

/// The logged-in user as reported by the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric account id, sent back as `login` when deleting favorites.
    pub user_id: String,
    /// Display name.
    pub username: String,
    pub city: String,
    pub country: String,
}

/// Cookie-backed login session.
///
/// Either fully authenticated (an [`Identity`] is present) or not at all;
/// there is no state in between.
pub struct Session {
    http: Box<dyn Transport>,
    base_url: String,
    identity: Option<Identity>,
}

impl Session {
    /// Create an anonymous session with a fresh cookie jar.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = HttpTransport::new(config)?;
        Ok(Self::with_transport(Box::new(http), &config.base_url))
    }

    /// Create an anonymous session over an explicit [`Transport`].
    pub fn with_transport(http: Box<dyn Transport>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            identity: None,
        }
    }

    /// Log in with the site's username and password.
    ///
    /// Any previous identity is dropped first, so a failed login leaves the
    /// session anonymous.
    ///
    /// # Errors
    ///
    /// - [`AfstandmetenError::Authentication`]: the site rejected the
    ///   credentials; carries the site's message
    /// - [`AfstandmetenError::Parse`]: the response was neither an error
    ///   page nor a recognisable action panel
    /// - [`AfstandmetenError::Http`]: network failure
    pub fn login(&mut self, username: &str, password: &str) -> Result<&Identity> {
        self.identity = None;
        tracing::info!("logging in as {username}");

        let body = self.post(LOGIN_PATH, &[("login", username), ("password", password)])?;
        match parse_login_page(&body)? {
            LoginPage::Rejected { message } => {
                tracing::warn!("login rejected for {username}: {message}");
                Err(AfstandmetenError::Authentication { message })
            }
            LoginPage::Accepted(identity) => {
                tracing::info!(
                    "logged in as {} (id={})",
                    identity.username,
                    identity.user_id
                );
                Ok(&*self.identity.insert(identity))
            }
        }
    }

    /// Log out. The session is anonymous afterwards even if the request
    /// fails; the request error is still returned.
    pub fn logout(&mut self) -> Result<()> {
        self.identity = None;
        self.post(LOGOUT_PATH, &[])?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The logged-in user, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    pub fn city(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.city.as_str())
    }

    pub fn country(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.country.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The identity, or [`AfstandmetenError::Authorization`] naming
    /// `operation`.
    pub(crate) fn require_login(&self, operation: &str) -> Result<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| AfstandmetenError::authorization(operation))
    }

    /// POST a form to a site path (e.g. `/browse.php`).
    pub(crate) fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        self.http.post_form(&url, form)
    }

    pub(crate) fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.http.get(url)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
