//! Data types for afstandmeten.nl search results and the browse form.
//!
//! The site's form uses Dutch codes (`myroutes`, `Gebruikers.naam`, ...).
//! Each enum here keeps a fixed table mapping its English name to that code;
//! [`FromStr`] parses the English name and rejects anything outside the table
//! with [`AfstandmetenError::Validation`].

use crate::error::{AfstandmetenError, Result};
use crate::http::{BASE_URL, track_export_url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One route as listed on a browse/search page.
///
/// All fields are the strings the site rendered, with surrounding whitespace
/// removed (only leading whitespace for the title). Dates, distances and
/// counts are not normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Site-assigned route id.
    pub id: String,
    /// Upload date in the site's own format (e.g. `14-03-2019`).
    pub date: String,
    /// Route title, up to any nested markup in the link.
    pub title: String,
    /// Author display name.
    pub username: String,
    /// Distance as shown, e.g. `42,20`.
    pub distance: String,
    /// Number of views.
    pub view_count: String,
    /// Place name the route is filed under.
    pub location_name: String,
    /// Activity label in Dutch, e.g. `Fietsen` or `Hardlopen`.
    pub activity_type: String,
}

impl RouteRecord {
    /// GPX export URL for this route.
    pub fn track_url(&self) -> String {
        track_export_url(BASE_URL, &self.id)
    }
}

/// Anything that identifies a route for the account actions.
///
/// Implemented for [`RouteRecord`] and for plain id strings, so callers can
/// pass search results or ids they already know.
pub trait RouteId {
    /// The site-assigned route id.
    fn route_id(&self) -> &str;
}

impl RouteId for RouteRecord {
    fn route_id(&self) -> &str {
        &self.id
    }
}

impl RouteId for str {
    fn route_id(&self) -> &str {
        self
    }
}

impl RouteId for String {
    fn route_id(&self) -> &str {
        self
    }
}

impl<T: RouteId + ?Sized> RouteId for &T {
    fn route_id(&self) -> &str {
        (**self).route_id()
    }
}

/// Which set of routes a search runs against.
///
/// | Variant    | Site code  | Needs login |
/// |------------|------------|-------------|
/// | `Public`   | `location` | no          |
/// | `Private`  | `myroutes` | yes         |
/// | `Favorite` | `favoriet` | yes         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    #[default]
    Public,
    Private,
    Favorite,
}

const FOLDERS: [(Folder, &str, &str); 3] = [
    (Folder::Public, "public", "location"),
    (Folder::Private, "private", "myroutes"),
    (Folder::Favorite, "favorite", "favoriet"),
];

impl Folder {
    /// Value of the `methods` form field.
    pub fn code(self) -> &'static str {
        lookup(&FOLDERS, self).1
    }

    /// Reverse of [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        FOLDERS
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(f, _, _)| *f)
    }

    /// Name accepted by [`FromStr`], e.g. `private`.
    pub fn name(self) -> &'static str {
        lookup(&FOLDERS, self).0
    }

    /// Whether searching this folder requires a logged-in session.
    pub fn requires_login(self) -> bool {
        self != Self::Public
    }
}

/// Which field the free-text search is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMatch {
    #[default]
    Title,
    Username,
}

const TEXT_MATCHES: [(TextMatch, &str, &str); 2] = [
    (TextMatch::Title, "title", "titel"),
    (TextMatch::Username, "username", "Gebruikers.naam"),
];

impl TextMatch {
    /// Value of the `s` form field.
    pub fn code(self) -> &'static str {
        lookup(&TEXT_MATCHES, self).1
    }

    /// Reverse of [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        TEXT_MATCHES
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(m, _, _)| *m)
    }

    /// Name accepted by [`FromStr`], e.g. `username`.
    pub fn name(self) -> &'static str {
        lookup(&TEXT_MATCHES, self).0
    }
}

/// Result ordering, sent verbatim as the `sorton` form field.
///
/// The first letter selects the column (`b` = date added, `a` = distance,
/// `t` = title), the suffix the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    #[serde(rename = "bDESC")]
    DateDesc,
    #[serde(rename = "bASC")]
    DateAsc,
    /// Longest first.
    #[serde(rename = "aDESC")]
    DistanceDesc,
    #[serde(rename = "aASC")]
    DistanceAsc,
    #[serde(rename = "tDESC")]
    TitleDesc,
    #[serde(rename = "tASC")]
    TitleAsc,
}

const SORT_ORDERS: [(SortOrder, &str); 6] = [
    (SortOrder::DateDesc, "bDESC"),
    (SortOrder::DateAsc, "bASC"),
    (SortOrder::DistanceDesc, "aDESC"),
    (SortOrder::DistanceAsc, "aASC"),
    (SortOrder::TitleDesc, "tDESC"),
    (SortOrder::TitleAsc, "tASC"),
];

impl SortOrder {
    /// Value of the `sorton` form field.
    pub fn code(self) -> &'static str {
        SORT_ORDERS
            .iter()
            .find(|(s, _)| *s == self)
            .map_or("bDESC", |(_, c)| *c)
    }
}

fn lookup<T: PartialEq + Copy>(
    table: &[(T, &'static str, &'static str)],
    value: T,
) -> (&'static str, &'static str) {
    // Every variant has a row, so the fallback is never taken.
    table
        .iter()
        .find(|(v, _, _)| *v == value)
        .map_or(("", ""), |(_, name, code)| (*name, *code))
}

fn allowed(names: impl Iterator<Item = &'static str>) -> String {
    names.map(|n| format!("\"{n}\"")).collect::<Vec<_>>().join(", ")
}

impl FromStr for Folder {
    type Err = AfstandmetenError;

    fn from_str(s: &str) -> Result<Self> {
        FOLDERS
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(f, _, _)| *f)
            .ok_or_else(|| {
                AfstandmetenError::Validation(format!(
                    "folder \"{s}\" is not one of {}",
                    allowed(FOLDERS.iter().map(|(_, n, _)| *n))
                ))
            })
    }
}

impl FromStr for TextMatch {
    type Err = AfstandmetenError;

    fn from_str(s: &str) -> Result<Self> {
        TEXT_MATCHES
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(m, _, _)| *m)
            .ok_or_else(|| {
                AfstandmetenError::Validation(format!(
                    "text match \"{s}\" is not one of {}",
                    allowed(TEXT_MATCHES.iter().map(|(_, n, _)| *n))
                ))
            })
    }
}

impl FromStr for SortOrder {
    type Err = AfstandmetenError;

    fn from_str(s: &str) -> Result<Self> {
        SORT_ORDERS
            .iter()
            .find(|(_, code)| *code == s)
            .map(|(o, _)| *o)
            .ok_or_else(|| {
                AfstandmetenError::Validation(format!(
                    "sort order \"{s}\" is not one of {}",
                    allowed(SORT_ORDERS.iter().map(|(_, c)| *c))
                ))
            })
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_names_and_codes() {
        assert_eq!("private".parse::<Folder>().unwrap(), Folder::Private);
        assert_eq!(Folder::Favorite.code(), "favoriet");
        assert_eq!(Folder::from_code("myroutes"), Some(Folder::Private));
        assert!(!Folder::Public.requires_login());
        assert!(Folder::Favorite.requires_login());
    }

    #[test]
    fn unknown_folder_is_rejected_with_allowed_set() {
        let err = "archived".parse::<Folder>().unwrap_err();
        match err {
            AfstandmetenError::Validation(msg) => {
                assert!(msg.contains("archived"));
                assert!(msg.contains("\"public\", \"private\", \"favorite\""));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn text_match_maps_to_dutch_codes() {
        assert_eq!(TextMatch::Username.code(), "Gebruikers.naam");
        assert_eq!("title".parse::<TextMatch>().unwrap().code(), "titel");
        assert!("author".parse::<TextMatch>().is_err());
    }

    #[test]
    fn code_tables_map_both_ways() {
        for folder in [Folder::Public, Folder::Private, Folder::Favorite] {
            assert_eq!(Folder::from_code(folder.code()), Some(folder));
            assert_eq!(folder.name().parse::<Folder>().unwrap(), folder);
        }
        for text_match in [TextMatch::Title, TextMatch::Username] {
            assert_eq!(TextMatch::from_code(text_match.code()), Some(text_match));
            assert_eq!(text_match.to_string(), text_match.name());
        }
        assert_eq!(TextMatch::from_code("Gebruikers.naam"), Some(TextMatch::Username));
        assert_eq!(TextMatch::from_code("title"), None);
        assert_eq!(Folder::from_code("public"), None);
    }

    #[test]
    fn sort_order_accepts_only_site_literals() {
        assert_eq!("aASC".parse::<SortOrder>().unwrap(), SortOrder::DistanceAsc);
        assert_eq!(SortOrder::default().code(), "bDESC");
        assert!(matches!(
            "zzz".parse::<SortOrder>(),
            Err(AfstandmetenError::Validation(_))
        ));
        // Codes are case-sensitive on the site.
        assert!("bdesc".parse::<SortOrder>().is_err());
    }

    #[test]
    fn track_url_embeds_route_id() {
        let route = RouteRecord {
            id: "123456".into(),
            date: String::new(),
            title: String::new(),
            username: String::new(),
            distance: String::new(),
            view_count: String::new(),
            location_name: String::new(),
            activity_type: String::new(),
        };
        assert_eq!(
            route.track_url(),
            "https://www.afstandmeten.nl/processExportFile.php?route_id=123456&export=Exporteer+naar+GPX"
        );
    }

    #[test]
    fn route_record_serializes_with_field_names() {
        let route = RouteRecord {
            id: "42".into(),
            date: "14-03-2019".into(),
            title: "Rondje".into(),
            username: "jansen".into(),
            distance: "42,20".into(),
            view_count: "318".into(),
            location_name: "Amsterdam".into(),
            activity_type: "Fietsen".into(),
        };
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["id"], "42");
        assert_eq!(json["distance"], "42,20");
        assert_eq!(json["activity_type"], "Fietsen");
        assert_eq!(serde_json::from_value::<RouteRecord>(json).unwrap(), route);
    }

    #[test]
    fn enums_serialize_as_names() {
        assert_eq!(serde_json::to_value(Folder::Favorite).unwrap(), "favorite");
        assert_eq!(serde_json::to_value(SortOrder::TitleAsc).unwrap(), "tASC");
    }

    #[test]
    fn route_id_for_strings_and_records() {
        let raw = ["7", "8"];
        let ids: Vec<&str> = raw.iter().map(RouteId::route_id).collect();
        assert_eq!(ids, ["7", "8"]);
        let owned = String::from("9");
        assert_eq!(owned.route_id(), "9");
    }
}
