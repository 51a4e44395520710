//! Search API, a stateful mirror of the site's browse form.
//!
//! Endpoint: `POST /browse.php`
//!
//! Form fields (all sent on every request):
//! - `cat`: always `browse`
//! - `methods`: folder code (`location`, `myroutes`, `favoriet`)
//! - `m`: activity filter, `alle` for any
//! - `l`: country, `alle` for any
//! - `pr`: province, `alle` for any
//! - `t`: free text
//! - `s`: field the text is matched on (`titel`, `Gebruikers.naam`)
//! - `a_min` / `a_max`: distance bounds in km, empty to disable
//! - `nr_page`: page size
//! - `sorton`: sort code, e.g. `bDESC`
//!
//! The response is a full HTML page; see [`crate::parse`] for its layout.

use crate::auth::Session;
use crate::error::{AfstandmetenError, Result};
use crate::http::BROWSE_PATH;
use crate::parse::parse_search_results;
use crate::types::{Folder, RouteRecord, SortOrder, TextMatch};

const ANY: &str = "alle";
const DEFAULT_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
struct SearchForm {
    text: String,
    text_match: TextMatch,
    folder: Folder,
    activity: String,
    country: String,
    province: String,
    min_km: Option<f64>,
    max_km: Option<f64>,
    max_results: u32,
    sort_order: SortOrder,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_match: TextMatch::default(),
            folder: Folder::default(),
            activity: ANY.to_owned(),
            country: ANY.to_owned(),
            province: ANY.to_owned(),
            min_km: None,
            max_km: None,
            max_results: DEFAULT_PAGE_SIZE,
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchForm {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cat", "browse".to_owned()),
            ("methods", self.folder.code().to_owned()),
            ("m", self.activity.clone()),
            ("l", self.country.clone()),
            ("pr", self.province.clone()),
            ("t", self.text.clone()),
            ("s", self.text_match.code().to_owned()),
            ("a_min", km(self.min_km)),
            ("a_max", km(self.max_km)),
            ("nr_page", self.max_results.to_string()),
            ("sorton", self.sort_order.code().to_owned()),
        ]
    }

    fn check_bounds(&self) -> Result<()> {
        for (name, bound) in [("minimum", self.min_km), ("maximum", self.max_km)] {
            if let Some(km) = bound.filter(|km| !km.is_finite()) {
                return Err(AfstandmetenError::Validation(format!(
                    "{name} distance must be a finite number, got {km}"
                )));
            }
        }
        Ok(())
    }
}

fn km(bound: Option<f64>) -> String {
    bound.map(|v| v.to_string()).unwrap_or_default()
}

/// A search against one folder, with its cached results.
///
/// Setters return `&mut Self` for chaining. Every setter drops the cached
/// results, so the next [`results`](Self::results) call asks the site again.
///
/// ```no_run
/// use afstandmeten_api::AfstandmetenClient;
/// use afstandmeten_api::types::SortOrder;
///
/// let client = AfstandmetenClient::new().unwrap();
/// let mut query = client.search();
/// query.set_text("vondelpark").set_max_km(Some(10.0)).set_sort_order(SortOrder::DistanceAsc);
/// for route in query.results().unwrap() {
///     println!("{} {} km", route.title, route.distance);
/// }
/// ```
#[derive(Debug)]
pub struct SearchQuery<'a> {
    session: &'a Session,
    form: SearchForm,
    results: Option<Vec<RouteRecord>>,
    fetched: bool,
}

impl<'a> SearchQuery<'a> {
    /// A blank query on the public folder.
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            form: SearchForm::default(),
            results: None,
            fetched: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.form.text
    }

    pub fn text_match(&self) -> TextMatch {
        self.form.text_match
    }

    pub fn folder(&self) -> Folder {
        self.form.folder
    }

    pub fn activity(&self) -> &str {
        &self.form.activity
    }

    pub fn min_km(&self) -> Option<f64> {
        self.form.min_km
    }

    pub fn max_km(&self) -> Option<f64> {
        self.form.max_km
    }

    pub fn max_results(&self) -> u32 {
        self.form.max_results
    }

    pub fn sort_order(&self) -> SortOrder {
        self.form.sort_order
    }

    /// The only way to change the form; drops the cached results.
    fn form_mut(&mut self) -> &mut SearchForm {
        self.results = None;
        &mut self.form
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.form_mut().text = text.into();
        self
    }

    pub fn set_text_match(&mut self, text_match: TextMatch) -> &mut Self {
        self.form_mut().text_match = text_match;
        self
    }

    /// Private and favorite folders need a logged-in session at fetch time.
    pub fn set_folder(&mut self, folder: Folder) -> &mut Self {
        self.form_mut().folder = folder;
        self
    }

    /// Activity filter as the site names it (`Fietsen`, `Wandelen`, ...),
    /// or `alle`.
    pub fn set_activity(&mut self, activity: impl Into<String>) -> &mut Self {
        self.form_mut().activity = activity.into();
        self
    }

    /// Lower distance bound. Must be finite; checked when the query is sent.
    pub fn set_min_km(&mut self, km: Option<f64>) -> &mut Self {
        self.form_mut().min_km = km;
        self
    }

    /// Upper distance bound, same rules as [`set_min_km`](Self::set_min_km).
    pub fn set_max_km(&mut self, km: Option<f64>) -> &mut Self {
        self.form_mut().max_km = km;
        self
    }

    /// Page size; the site returns at most this many routes.
    pub fn set_max_results(&mut self, max: u32) -> &mut Self {
        self.form_mut().max_results = max;
        self
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> &mut Self {
        self.form_mut().sort_order = order;
        self
    }

    /// Run the search now, replacing any cached results.
    ///
    /// # Errors
    ///
    /// - [`AfstandmetenError::Validation`]: a distance bound is NaN or
    ///   infinite (nothing is sent)
    /// - [`AfstandmetenError::Authorization`]: private/favorite folder
    ///   without a logged-in session (nothing is sent)
    /// - [`AfstandmetenError::Parse`]: the page layout was not recognised
    /// - [`AfstandmetenError::Http`]: network failure
    pub fn fetch(&mut self) -> Result<&[RouteRecord]> {
        self.form.check_bounds()?;
        let folder = self.form.folder;
        if folder.requires_login() {
            self.session
                .require_login(&format!("search the {folder} folder"))?;
        }

        let fields = self.form.fields();
        let form: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = self.session.post(BROWSE_PATH, &form)?;
        self.fetched = true;
        let routes = parse_search_results(&body)?;
        tracing::info!("{} routes found in {folder} folder", routes.len());

        Ok(self.results.insert(routes).as_slice())
    }

    /// Same as [`fetch`](Self::fetch); re-reads the folder after the site
    /// changed, e.g. after adding a favorite.
    pub fn refresh(&mut self) -> Result<&[RouteRecord]> {
        self.fetch()
    }

    /// Cached results, fetching them first if needed.
    ///
    /// # Errors
    ///
    /// [`AfstandmetenError::Validation`] if this query never reached the site
    /// and the form is still blank, plus everything [`fetch`](Self::fetch)
    /// returns.
    pub fn results(&mut self) -> Result<&[RouteRecord]> {
        if self.results.is_none() {
            if !self.fetched && self.form == SearchForm::default() {
                return Err(AfstandmetenError::Validation(
                    "set a search criterion before searching".into(),
                ));
            }
            self.fetch()?;
        }
        Ok(self.results.as_deref().unwrap_or_default())
    }

    /// Whether results are cached.
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }

    /// Cached results without touching the network.
    pub fn cached(&self) -> Option<&[RouteRecord]> {
        self.results.as_deref()
    }
}
