//! # List Filtering and Ordering
//!
//! One active [`Criteria`] drives both the search match and the sort order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use rb_core::models::Settings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criteria {
    #[default]
    LastModified,
    Subject,
    Text,
    Image,
    Timestamp,
    Username,
}

impl Criteria {
    pub const ALL: [Criteria; 6] = [
        Criteria::LastModified,
        Criteria::Subject,
        Criteria::Text,
        Criteria::Image,
        Criteria::Timestamp,
        Criteria::Username,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Criteria::LastModified => "last-modified",
            Criteria::Subject => "subject",
            Criteria::Text => "text",
            Criteria::Image => "image",
            Criteria::Timestamp => "timestamp",
            Criteria::Username => "username",
        }
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCriteria(pub String);

impl fmt::Display for UnknownCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter criteria {:?}", self.0)
    }
}

impl std::error::Error for UnknownCriteria {}

impl FromStr for Criteria {
    type Err = UnknownCriteria;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criteria::ALL
            .into_iter()
            .find(|criteria| criteria.as_str() == s)
            .ok_or_else(|| UnknownCriteria(s.to_string()))
    }
}

/// Current search text, direction and criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    /// `true` keeps each criteria's natural order, `false` reverses it.
    pub sort_order: bool,
    pub criteria: Criteria,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_order: true,
            criteria: Criteria::default(),
        }
    }
}

impl FilterState {
    /// The part of the state that is persisted server-side.
    pub fn to_settings(&self) -> Settings {
        Settings {
            filter_criteria: Some(self.criteria.as_str().to_string()),
            filter_sort_order: Some(self.sort_order),
        }
    }

    /// Applies stored settings, ignoring unknown criteria.
    pub fn apply_settings(&mut self, settings: &Settings) {
        if let Some(criteria) = settings
            .filter_criteria
            .as_deref()
            .and_then(|c| c.parse().ok())
        {
            self.criteria = criteria;
        }
        if let Some(sort_order) = settings.filter_sort_order {
            self.sort_order = sort_order;
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[FilterState] search: \"{}\", sortOrder: \"{}\", criteria: \"{}\"",
            self.search, self.sort_order, self.criteria
        )
    }
}

/// Filter state shared by the filter handler (writer) and list managers (readers).
#[derive(Debug, Clone, Default)]
pub struct SharedFilter(Arc<Mutex<FilterState>>);

impl SharedFilter {
    pub fn new(state: FilterState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    pub fn get(&self) -> FilterState {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// A searchable dimension of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet<'a> {
    /// The entity has no such dimension; it never filters the entity out.
    NotApplicable,
    /// The dimension exists but has not been retrieved (yet).
    Missing,
    Present(&'a str),
}

impl Facet<'_> {
    fn matches(self, search_lc: &str) -> bool {
        match self {
            Facet::NotApplicable => true,
            Facet::Missing => false,
            Facet::Present(value) => value.to_lowercase().contains(search_lc),
        }
    }
}

/// What the filter needs to know about an entity.
#[derive(Debug, Clone, Copy)]
pub struct Facets<'a> {
    /// The entity's own record was retrieved.
    pub has_record: bool,
    pub has_image: bool,
    pub subject: Facet<'a>,
    pub text: Facet<'a>,
    pub username: Facet<'a>,
}

/// `true` when the entity should be visible. Matching is a case-insensitive
/// substring test.
pub fn passes(facets: &Facets<'_>, search: &str, criteria: Criteria) -> bool {
    if !facets.has_record {
        return false;
    }
    let facet = match criteria {
        // An empty search does not short-circuit this one.
        Criteria::Image => return facets.has_image,
        Criteria::LastModified | Criteria::Timestamp => return true,
        Criteria::Subject => facets.subject,
        Criteria::Text => facets.text,
        Criteria::Username => facets.username,
    };
    search.is_empty() || facet.matches(&search.to_lowercase())
}

/// Sort keys of an entity. `None` means not retrieved.
pub trait Sortable {
    fn last_modified(&self) -> Option<i64>;
    fn timestamp(&self) -> Option<i64>;
    fn subject(&self) -> Option<&str>;
    fn username(&self) -> Option<&str>;
}

/// Orders `items` by `criteria`, then reverses everything when `sort_order`
/// is false. Numeric keys sort newest first, text keys alphabetically;
/// `Text` and `Image` keep the current order. The sort is stable.
pub fn sort_by_criteria<T: Sortable>(items: &mut [T], criteria: Criteria, sort_order: bool) {
    match criteria {
        Criteria::LastModified => items.sort_by(|a, b| descending(a.last_modified(), b.last_modified())),
        Criteria::Timestamp => items.sort_by(|a, b| descending(a.timestamp(), b.timestamp())),
        Criteria::Subject => items.sort_by(|a, b| alphabetical(a.subject(), b.subject())),
        Criteria::Username => items.sort_by(|a, b| alphabetical(a.username(), b.username())),
        Criteria::Text | Criteria::Image => {}
    }
    if !sort_order {
        items.reverse();
    }
}

/// Largest first, unknown keys last.
fn descending(a: Option<i64>, b: Option<i64>) -> Ordering {
    b.cmp(&a)
}

/// Case-insensitive, then exact, unknown keys last.
fn alphabetical(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
