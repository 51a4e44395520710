//! Client library for the afstandmeten.nl route-sharing site.
//!
//! Searches the public route catalog, logs in to reach the private and
//! favorite folders, manages favorites, deletes routes and downloads GPX
//! tracks. The site has no API; everything is done by posting its HTML forms
//! and scraping the pages that come back.
//!
//! ```no_run
//! use afstandmeten_api::AfstandmetenClient;
//!
//! let mut client = AfstandmetenClient::new()?;
//!
//! // Public search, fetched lazily on first access
//! let mut search = client.search_text("runforestrun");
//! let route = search.results()?[0].clone();
//!
//! client.login("user", "secret")?;
//! client.account().add_favorite([&route])?;
//! for fav in client.favorites().fetch()? {
//!     println!("[{}] {} ({} km)", fav.id, fav.title, fav.distance);
//! }
//! client.account().download_track(&route, None)?;
//! client.logout()?;
//! # Ok::<(), afstandmeten_api::AfstandmetenError>(())
//! ```
//!
//! # Site endpoint mapping
//!
//! | Method                                  | Endpoint                 |
//! |-----------------------------------------|--------------------------|
//! | [`AfstandmetenClient::login`]           | `/login.php`             |
//! | [`AfstandmetenClient::logout`]          | `/logout.php`            |
//! | [`SearchQuery::fetch`]                  | `/browse.php`            |
//! | [`AccountActions::add_favorite`]        | `/addFavorite.php`       |
//! | [`AccountActions::delete_favorite`]     | `/deleteFavorite.php`    |
//! | [`AccountActions::delete_route`]        | `/deleteRoute.php`       |
//! | [`AccountActions::download_track`]      | `/processExportFile.php` |
//!
//! All I/O is blocking. One client is meant to be driven by one thread.

pub mod account;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod parse;
pub mod search;
#[cfg(test)]
mod testutil;
pub mod types;

pub use account::AccountActions;
pub use client::AfstandmetenClient;
pub use error::{AfstandmetenError, Result};
pub use search::SearchQuery;
pub use types::RouteRecord;
