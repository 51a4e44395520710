//! Account actions: favorites, route deletion and GPX download.
//!
//! # Endpoints
//!
//! | Action            | Endpoint                      | Form                              |
//! |-------------------|-------------------------------|-----------------------------------|
//! | `add_favorite`    | `POST /addFavorite.php`       | `ids=1,2,3`                       |
//! | `delete_favorite` | `POST /deleteFavorite.php`    | `route_ids=1,2,3&login=<user id>` |
//! | `delete_route`    | `POST /deleteRoute.php`       | `route_ids=1,2,3`                 |
//! | `download_track`  | `GET /processExportFile.php`  | `?route_id=1&export=…`            |
//!
//! The POST handlers answer with a short HTML snippet and no usable status,
//! so any 2xx response counts as success.

use crate::auth::Session;
use crate::error::{AfstandmetenError, Result};
use crate::http::{ADD_FAVORITE_PATH, DELETE_FAVORITE_PATH, DELETE_ROUTE_PATH, track_export_url};
use crate::types::{RouteId, RouteRecord};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Mutating operations on the logged-in account.
///
/// Every method takes any iterable of routes: a slice of search results,
/// `[&route]` for a single one, or plain id strings.
#[derive(Debug, Clone, Copy)]
pub struct AccountActions<'a> {
    session: &'a Session,
}

impl<'a> AccountActions<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Add routes to the user's favorites.
    pub fn add_favorite<I>(&self, routes: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: RouteId,
    {
        let ids = join_ids(routes)?;
        self.session.require_login("add favorites")?;
        let body = self.session.post(ADD_FAVORITE_PATH, &[("ids", ids.as_str())])?;
        tracing::info!("added favorites {ids}");
        tracing::debug!("addFavorite response: {body}");
        Ok(())
    }

    /// Remove routes from the user's favorites.
    pub fn delete_favorite<I>(&self, routes: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: RouteId,
    {
        let ids = join_ids(routes)?;
        let identity = self.session.require_login("delete favorites")?;
        let body = self.session.post(
            DELETE_FAVORITE_PATH,
            &[("route_ids", ids.as_str()), ("login", identity.user_id.as_str())],
        )?;
        tracing::info!("removed favorites {ids}");
        tracing::debug!("deleteFavorite response: {body}");
        Ok(())
    }

    /// Permanently delete the user's own routes.
    pub fn delete_route<I>(&self, routes: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: RouteId,
    {
        let ids = join_ids(routes)?;
        self.session.require_login("delete routes")?;
        let body = self.session.post(DELETE_ROUTE_PATH, &[("route_ids", ids.as_str())])?;
        tracing::info!("deleted routes {ids}");
        tracing::debug!("deleteRoute response: {body}");
        Ok(())
    }

    /// Download a route's GPX track to `<dir>/<title>.gpx`.
    ///
    /// `dir` defaults to the current directory. No login is needed. Returns
    /// the path written.
    ///
    /// # Errors
    ///
    /// - [`AfstandmetenError::Conflict`]: the file already exists; checked
    ///   before anything is downloaded
    /// - [`AfstandmetenError::Http`]: network failure
    /// - [`AfstandmetenError::Io`]: the file could not be written
    pub fn download_track(&self, route: &RouteRecord, dir: Option<&Path>) -> Result<PathBuf> {
        let path = track_path(route, dir);
        if path.exists() {
            return Err(AfstandmetenError::Conflict { path });
        }

        let url = track_export_url(self.session.base_url(), &route.id);
        let body = self.session.get(&url)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AfstandmetenError::Conflict { path });
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&body)?;
        tracing::info!("saved {} ({} bytes)", path.display(), body.len());
        Ok(path)
    }
}

/// Destination for a route's GPX file. Path separators in the title are
/// replaced so the file always lands directly in `dir`.
pub fn track_path(route: &RouteRecord, dir: Option<&Path>) -> PathBuf {
    let name: String = route
        .title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.unwrap_or(Path::new(".")).join(format!("{name}.gpx"))
}

fn join_ids<I>(routes: I) -> Result<String>
where
    I: IntoIterator,
    I::Item: RouteId,
{
    let ids: Vec<String> = routes
        .into_iter()
        .map(|r| r.route_id().to_owned())
        .collect();
    if ids.is_empty() {
        return Err(AfstandmetenError::Validation("specify at least one route".into()));
    }
    Ok(ids.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeTransport, logged_in_session};

    fn route(id: &str, title: &str) -> RouteRecord {
        RouteRecord {
            id: id.into(),
            date: "01-01-2020".into(),
            title: title.into(),
            username: "jansen".into(),
            distance: "10,00".into(),
            view_count: "3".into(),
            location_name: "Delft".into(),
            activity_type: "Fietsen".into(),
        }
    }

    fn anonymous() -> (Session, FakeTransport) {
        let fake = FakeTransport::default();
        let session = Session::with_transport(Box::new(fake.clone()), "http://x");
        (session, fake)
    }

    #[test]
    fn empty_selection_is_rejected() {
        let (session, fake) = logged_in_session();
        let account = AccountActions::new(&session);
        let none: [&RouteRecord; 0] = [];

        for result in [
            account.add_favorite(none),
            account.delete_favorite(none),
            account.delete_route(none),
        ] {
            assert!(matches!(result, Err(AfstandmetenError::Validation(_))));
        }
        // Only the login request.
        assert_eq!(fake.request_count(), 1);
    }

    #[test]
    fn mutations_need_login() {
        let (session, fake) = anonymous();
        let account = AccountActions::new(&session);
        let r = route("1", "Rondje");

        for result in [
            account.add_favorite([&r]),
            account.delete_favorite([&r]),
            account.delete_route([&r]),
        ] {
            assert!(matches!(result, Err(AfstandmetenError::Authorization { .. })));
        }
        assert_eq!(fake.request_count(), 0);
    }

    #[test]
    fn add_favorite_posts_comma_joined_ids() {
        let (session, fake) = logged_in_session();
        fake.push_page("ok");
        let routes = [route("11", "A"), route("12", "B")];

        AccountActions::new(&session).add_favorite(&routes).unwrap();

        let req = fake.last_request();
        assert_eq!(req.url, "http://x/addFavorite.php");
        assert_eq!(req.form, [("ids".to_owned(), "11,12".to_owned())]);
    }

    #[test]
    fn delete_favorite_sends_user_id() {
        let (session, fake) = logged_in_session();
        fake.push_page("ok");

        AccountActions::new(&session)
            .delete_favorite(["11", "13"])
            .unwrap();

        let req = fake.last_request();
        assert_eq!(req.url, "http://x/deleteFavorite.php");
        assert_eq!(req.field("route_ids"), Some("11,13"));
        assert_eq!(req.field("login"), Some("98765"));
    }

    #[test]
    fn delete_route_sends_only_ids() {
        let (session, fake) = logged_in_session();
        fake.push_page("ok");

        let r = route("21", "Weg ermee");
        AccountActions::new(&session).delete_route([&r]).unwrap();

        let req = fake.last_request();
        assert_eq!(req.url, "http://x/deleteRoute.php");
        assert_eq!(req.form, [("route_ids".to_owned(), "21".to_owned())]);
    }

    #[test]
    fn download_writes_body_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let (session, fake) = anonymous();
        let gpx = b"<?xml version=\"1.0\"?>\n<gpx><trk><name>Rondje</name></trk></gpx>\n";
        fake.push_bytes(gpx);

        let r = route("31", "Rondje Utrecht");
        let path = AccountActions::new(&session)
            .download_track(&r, Some(dir.path()))
            .unwrap();

        assert_eq!(path, dir.path().join("Rondje Utrecht.gpx"));
        assert_eq!(std::fs::read(&path).unwrap(), gpx);
        let req = fake.last_request();
        assert_eq!(req.method, "GET");
        assert_eq!(
            req.url,
            "http://x/processExportFile.php?route_id=31&export=Exporteer+naar+GPX"
        );
    }

    #[test]
    fn download_refuses_to_overwrite_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("Bestaand.gpx");
        std::fs::write(&existing, "oud").unwrap();
        let (session, fake) = anonymous();

        let err = AccountActions::new(&session)
            .download_track(&route("41", "Bestaand"), Some(dir.path()))
            .unwrap_err();

        match err {
            AfstandmetenError::Conflict { path } => assert_eq!(path, existing),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fake.request_count(), 0);
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "oud");
    }

    #[test]
    fn track_path_keeps_file_in_dir() {
        let r = route("51", "Heen/terug");
        assert_eq!(
            track_path(&r, Some(Path::new("/tmp/gpx"))),
            Path::new("/tmp/gpx/Heen_terug.gpx")
        );
        assert_eq!(track_path(&r, None), Path::new("./Heen_terug.gpx"));
    }
}
