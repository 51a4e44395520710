//! HTTP plumbing for afstandmeten.nl.
//!
//! Every endpoint is a classic PHP form handler: requests are
//! `application/x-www-form-urlencoded` POSTs and responses are full HTML
//! pages, except for the GPX export which is a plain GET returning the file.
//!
//! | Endpoint                 | Method | Used by                          |
//! |--------------------------|--------|----------------------------------|
//! | `/login.php`             | POST   | [`Session::login`](crate::auth::Session::login) |
//! | `/logout.php`            | POST   | [`Session::logout`](crate::auth::Session::logout) |
//! | `/browse.php`            | POST   | [`SearchQuery::fetch`](crate::search::SearchQuery::fetch) |
//! | `/addFavorite.php`       | POST   | [`AccountActions::add_favorite`](crate::account::AccountActions::add_favorite) |
//! | `/deleteFavorite.php`    | POST   | [`AccountActions::delete_favorite`](crate::account::AccountActions::delete_favorite) |
//! | `/deleteRoute.php`       | POST   | [`AccountActions::delete_route`](crate::account::AccountActions::delete_route) |
//! | `/processExportFile.php` | GET    | [`AccountActions::download_track`](crate::account::AccountActions::download_track) |
//!
//! Authentication is a PHP session cookie, so the underlying client keeps a
//! cookie jar for its whole lifetime.

use crate::error::Result;
use reqwest::blocking::Client;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.afstandmeten.nl";
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub(crate) const LOGIN_PATH: &str = "/login.php";
pub(crate) const LOGOUT_PATH: &str = "/logout.php";
pub(crate) const BROWSE_PATH: &str = "/browse.php";
pub(crate) const ADD_FAVORITE_PATH: &str = "/addFavorite.php";
pub(crate) const DELETE_FAVORITE_PATH: &str = "/deleteFavorite.php";
pub(crate) const DELETE_ROUTE_PATH: &str = "/deleteRoute.php";

/// GPX export URL for a route id on the given host.
pub fn track_export_url(base_url: &str, route_id: &str) -> String {
    format!(
        "{base_url}/processExportFile.php?route_id={}&export=Exporteer+naar+GPX",
        urlencoding::encode(route_id)
    )
}

/// Settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_owned(),
            user_agent: USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// The two kinds of request the site needs.
///
/// [`HttpTransport`] is the real implementation; the trait exists so the
/// session, search and account logic can be driven by canned pages.
pub trait Transport {
    /// POST `form` url-encoded to `url` and return the response body.
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String>;

    /// GET `url` and return the raw response body.
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking reqwest client with a cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    referer: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            referer: format!("{}/", config.base_url),
        })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String> {
        tracing::debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .header("Referer", self.referer.as_str())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(encode_form(form))
            .send()?
            .error_for_status()?;
        Ok(resp.text()?)
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .header("Referer", self.referer.as_str())
            .send()?
            .error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}

/// Encode `form` as an `application/x-www-form-urlencoded` body.
pub(crate) fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
