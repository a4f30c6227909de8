//! Normalized catalog records and the mapping from raw Open Library JSON
//!
//! Raw payloads are walked as `serde_json::Value` rather than typed structs so
//! that one malformed optional field degrades to "absent" instead of failing
//! the whole response.

use bookhaven_common::SortDirection;
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

/// Image used by list items that have no cover.
pub const LIST_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/500x750.png?text=No+Image";
/// Image used by detail records that have no cover.
pub const DETAIL_PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/640x960.png?text=No+Cover";
/// The reading list is cut to this many valid entries.
pub const MAX_LIST_ITEMS: usize = 30;

const WORK_KEY_PREFIX: &str = "/works/";

/// A book summary as shown in list views and stored in the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    #[serde(default = "list_placeholder_image")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<String>,
}

/// A full book record for the single-item view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDetail {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
}

fn list_placeholder_image() -> String {
    LIST_PLACEHOLDER_IMAGE.to_string()
}

impl CatalogItem {
    /// Collection entry for a book known only by its detail record.
    ///
    /// `logged_at` is the first publish year, or `current_year` when the work
    /// has none.
    pub fn from_detail(detail: &CatalogDetail, current_year: i32) -> Self {
        let year = detail.first_publish_year.map(|y| y.to_string());
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            image_url: detail.image_url.clone(),
            logged_at: Some(year.clone().unwrap_or_else(|| current_year.to_string())),
            year,
            authors: Vec::new(),
            rating: None,
        }
    }
}

impl From<&CatalogDetail> for CatalogItem {
    fn from(detail: &CatalogDetail) -> Self {
        CatalogItem::from_detail(detail, chrono::Local::now().year())
    }
}

// ASCII only; `\d` would also match other scripts' digits.
fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{4}").expect("year pattern is valid"))
}

/// First run of four digits in `text`, e.g. `"2018"` from `"Logged 2018-05-01"`.
pub fn extract_year(text: &str) -> Option<String> {
    year_pattern().find(text).map(|m| m.as_str().to_string())
}

/// Leading integer of a year string: `"1999"` and `" 1999 (reprint)"` give
/// 1999, `"unknown"` gives `None`.
fn leading_year(year: Option<&str>) -> Option<i64> {
    let text = year?.trim_start();
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

/// Stable sort by year in `direction`. Items without a usable year go last
/// either way and keep their relative order.
pub fn sort_by_year(items: &mut [CatalogItem], direction: SortDirection) {
    items.sort_by(|a, b| {
        match (
            leading_year(a.year.as_deref()),
            leading_year(b.year.as_deref()),
        ) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match direction {
                SortDirection::Ascending => x.cmp(&y),
                SortDirection::Descending => y.cmp(&x),
            },
        }
    });
}

/// Large cover URL for an Open Library cover id.
pub fn cover_url(covers_base_url: &str, cover_id: i64) -> String {
    format!("{}/{}-L.jpg", covers_base_url.trim_end_matches('/'), cover_id)
}

/// `"/works/OL45804W"` -> `"OL45804W"`. Keys without the prefix pass through.
pub fn strip_work_prefix(key: &str) -> &str {
    key.strip_prefix(WORK_KEY_PREFIX).unwrap_or(key)
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Cover ids of zero or below mean "no cover" in Open Library data.
fn cover_id(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64).filter(|id| *id > 0)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn authors_of(work: &Value) -> Vec<String> {
    let primary = string_list(work.get("author_names"));
    if !primary.is_empty() {
        return primary;
    }
    string_list(work.get("author_name"))
}

fn year_of(work: &Value, logged_date: Option<&str>) -> Option<String> {
    if let Some(year) = work
        .get("first_publish_year")
        .and_then(Value::as_i64)
        .filter(|y| *y != 0)
    {
        return Some(year.to_string());
    }
    logged_date.and_then(extract_year)
}

/// Map one reading-log entry to a `CatalogItem`.
///
/// Returns `None` when the entry has no `work` object, or the work lacks a
/// key or a title.
pub fn normalize_entry(entry: &Value, covers_base_url: &str) -> Option<CatalogItem> {
    let work = entry.get("work").filter(|w| w.is_object())?;
    let key = non_empty_str(work, "key")?;
    let title = non_empty_str(work, "title")?;
    let logged_date = entry.get("logged_date").and_then(Value::as_str);

    let image_url = match cover_id(work.get("cover_id")) {
        Some(id) => cover_url(covers_base_url, id),
        None => LIST_PLACEHOLDER_IMAGE.to_string(),
    };

    Some(CatalogItem {
        id: strip_work_prefix(key).to_string(),
        title: title.to_string(),
        image_url,
        year: year_of(work, logged_date),
        authors: authors_of(work),
        rating: work
            .get("rating")
            .and_then(|r| r.get("average"))
            .and_then(Value::as_f64),
        logged_at: logged_date.map(str::to_string),
    })
}

/// Map a reading-list response to at most `MAX_LIST_ITEMS` items, in source order.
pub fn normalize_reading_list(payload: &Value, covers_base_url: &str) -> Vec<CatalogItem> {
    payload
        .get("reading_log_entries")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| normalize_entry(entry, covers_base_url))
                .take(MAX_LIST_ITEMS)
                .collect()
        })
        .unwrap_or_default()
}

fn description_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Object(fields) => fields
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Map a work detail response to a `CatalogDetail`.
///
/// Returns `None` when the payload has no `key` or `title`.
pub fn normalize_detail(payload: &Value, covers_base_url: &str) -> Option<CatalogDetail> {
    let key = non_empty_str(payload, "key")?;
    let title = payload.get("title").and_then(Value::as_str)?;

    let first_cover = payload
        .get("covers")
        .and_then(Value::as_array)
        .and_then(|covers| cover_id(covers.first()));
    let image_url = match first_cover {
        Some(id) => cover_url(covers_base_url, id),
        None => DETAIL_PLACEHOLDER_IMAGE.to_string(),
    };

    Some(CatalogDetail {
        id: strip_work_prefix(key).to_string(),
        title: title.to_string(),
        image_url,
        description: description_of(payload.get("description")),
        subjects: string_list(payload.get("subjects")),
        first_publish_year: payload
            .get("first_publish_year")
            .and_then(Value::as_i64)
            .and_then(|y| i32::try_from(y).ok()),
    })
}
