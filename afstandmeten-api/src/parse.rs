//! HTML scraping for the browse and login pages.
//!
//! # Browse page
//!
//! The results live in the second `<table>` of the search form:
//!
//! ```text
//! body > div > form > table (search fields)
//!                   > table (results)
//!                       tr  header      (no id input, skipped)
//!                       tr  route row   → RouteRecord
//!                       ...
//!                       tr  footer      (no id input, skipped)
//! ```
//!
//! Each route row has a fixed column layout:
//!
//! | Col | Content                                   | Field           |
//! |-----|-------------------------------------------|-----------------|
//! | 0   | `<input value="…">`                       | `id`            |
//! | 1   | `<img title="…">`                         | `activity_type` |
//! | 3   | text                                      | `date`          |
//! | 4   | `<a>` text, leading space removed         | `title`         |
//! | 5   | text                                      | `username`      |
//! | 6   | text                                      | `distance`      |
//! | 7   | text                                      | `view_count`    |
//! | 8   | text                                      | `location_name` |
//!
//! # Login page
//!
//! A rejected login renders `<span style="color:red">message</span>`. An
//! accepted one renders the user's action panel, from which the identity is
//! read (see [`parse_login_page`]).

use crate::auth::Identity;
use crate::error::{AfstandmetenError, Result};
use crate::types::RouteRecord;
use scraper::{ElementRef, Html, Selector};

const LOGIN_ERROR_MARKER: &str = r#"<span style="color:red">"#;
const LOGIN_ERROR_SELECTOR: &str = r#"span[style="color:red"]"#;
const ACTIONS_PREFIX: &str = "Acties voor ";

const COL_ID: usize = 0;
const COL_ACTIVITY: usize = 1;
const COL_DATE: usize = 3;
const COL_TITLE: usize = 4;
const COL_USERNAME: usize = 5;
const COL_DISTANCE: usize = 6;
const COL_VIEWS: usize = 7;
const COL_LOCATION: usize = 8;

/// Outcome of scraping one table row.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Row {
    Record(RouteRecord),
    /// Header, footer or other row without a route id.
    Structural,
}

/// Outcome of a login POST.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoginPage {
    Rejected { message: String },
    Accepted(Identity),
}

/// Scrape all routes from a browse page, in page order.
///
/// Rows without an id are tolerated only as the first and last row of the
/// table. Anywhere else they mean the layout is not what we expect.
pub fn parse_search_results(html: &str) -> Result<Vec<RouteRecord>> {
    let document = Html::parse_document(html);
    let table = results_table(&document)?;
    let rows = table_rows(table);
    let last = rows.len().saturating_sub(1);

    let mut routes = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        match extract_row(row).map_err(|e| at_row(i, e))? {
            Row::Record(route) => routes.push(route),
            Row::Structural if i == 0 || i == last => {}
            Row::Structural => {
                return Err(AfstandmetenError::parse(format!("row {i} has no route id")));
            }
        }
    }
    tracing::debug!("parsed {} routes", routes.len());
    Ok(routes)
}

/// Map one `<tr>` to a route, or report it as structural.
///
/// A row counts as a route as soon as column 0 holds an id input; after
/// that every other column must be present.
pub(crate) fn extract_row(row: ElementRef<'_>) -> Result<Row> {
    let cells: Vec<ElementRef<'_>> = child_elements(row)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect();

    let Some(id) = cells.get(COL_ID).and_then(|cell| route_id(*cell)) else {
        return Ok(Row::Structural);
    };

    let cell = |col: usize| {
        cells
            .get(col)
            .copied()
            .ok_or_else(|| AfstandmetenError::parse(format!("missing column {col}")))
    };
    let first_child = |col: usize| {
        cell(col).and_then(|c| {
            child_elements(c).next().ok_or_else(|| {
                AfstandmetenError::parse(format!("column {col} has no child element"))
            })
        })
    };
    let text = |col: usize| cell(col).map(|c| leading_text(c).trim().to_owned());

    let activity_type = first_child(COL_ACTIVITY)?
        .value()
        .attr("title")
        .ok_or_else(|| AfstandmetenError::parse("activity image has no title"))?
        .trim()
        .to_owned();
    let title = leading_text(first_child(COL_TITLE)?).trim_start().to_owned();

    Ok(Row::Record(RouteRecord {
        id,
        date: text(COL_DATE)?,
        title,
        username: text(COL_USERNAME)?,
        distance: text(COL_DISTANCE)?,
        view_count: text(COL_VIEWS)?,
        location_name: text(COL_LOCATION)?,
        activity_type,
    }))
}

/// Read the identity panel or the error message from a login response.
///
/// The error marker is matched on the raw body before the DOM is searched.
pub(crate) fn parse_login_page(html: &str) -> Result<LoginPage> {
    let document = Html::parse_document(html);

    if html.contains(LOGIN_ERROR_MARKER) {
        let span = selector(LOGIN_ERROR_SELECTOR)?;
        let message = document
            .select(&span)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "unknown error".to_owned());
        return Ok(LoginPage::Rejected { message });
    }

    let legend = selector("legend")?;
    let username = document
        .select(&legend)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(ACTIONS_PREFIX))
        .map(|text| text.replacen(ACTIONS_PREFIX, "", 1).trim().to_owned())
        .ok_or_else(|| AfstandmetenError::parse("login page has no actions legend"))?;

    Ok(LoginPage::Accepted(Identity {
        user_id: input_value(&document, "login")?,
        username,
        city: input_value(&document, "gotoWoonplaats")?,
        country: input_value(&document, "gotoLand")?,
    }))
}

fn results_table(document: &Html) -> Result<ElementRef<'_>> {
    let forms = selector("body > div > form")?;
    document
        .select(&forms)
        .find_map(|form| {
            child_elements(form)
                .filter(|el| el.value().name() == "table")
                .nth(1)
        })
        .ok_or_else(|| AfstandmetenError::parse("results table not found"))
}

/// `<tr>` children of a table, looking through `thead`/`tbody`/`tfoot`
/// wrappers the HTML parser inserts.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(child).filter(|el| el.value().name() == "tr"));
            }
            _ => {}
        }
    }
    rows
}

fn route_id(cell: ElementRef<'_>) -> Option<String> {
    let input = child_elements(cell).next()?;
    if input.value().name() != "input" {
        return None;
    }
    input.value().attr("value").map(str::to_owned)
}

fn input_value(document: &Html, name: &str) -> Result<String> {
    let css = format!("input[name='{name}']");
    let input = selector(&css)?;
    document
        .select(&input)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(str::to_owned)
        .ok_or_else(|| AfstandmetenError::parse(format!("login page has no {name} field")))
}

fn child_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Text that precedes the first child element.
///
/// A cell like `<td>Rondje <small>(gewijzigd)</small></td>` yields only
/// `"Rondje "`.
fn leading_text(el: ElementRef<'_>) -> String {
    el.children()
        .take_while(|node| !node.value().is_element())
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| AfstandmetenError::parse(format!("invalid selector: {css}")))
}

fn at_row(index: usize, err: AfstandmetenError) -> AfstandmetenError {
    match err {
        AfstandmetenError::Parse { reason } => {
            AfstandmetenError::parse(format!("row {index}: {reason}"))
        }
        other => other,
    }
}
