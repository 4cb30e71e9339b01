//! # View-Model Entities
//!
//! One entity per list record. An entity owns its element subtree and fills
//! it stage by stage (record, post, image, user), appending each piece as
//! soon as it arrives. A stage whose identifier is missing or whose fetch
//! fails stops its chain without failing the entity.

mod post;
mod thread;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rb_core::models::RawRecord;
use rb_core::traits::{BlobStore, ImageboardApi};

use crate::dom::Element;
use crate::filter::{Criteria, Sortable};

pub use post::PostView;
pub use thread::ThreadView;

/// Services an entity needs to populate itself.
#[derive(Clone)]
pub struct EntityContext {
    pub api: Arc<dyn ImageboardApi>,
    pub blobs: Arc<dyn BlobStore>,
}

impl EntityContext {
    pub fn new(api: Arc<dyn ImageboardApi>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { api, blobs }
    }
}

impl fmt::Debug for EntityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityContext")
            .field("live_object_urls", &self.blobs.live_count())
            .finish_non_exhaustive()
    }
}

/// Population progress of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityState {
    /// Nothing retrieved, hidden.
    #[default]
    Empty,
    /// A rebuild is running and no stage has succeeded yet.
    Populating,
    /// At least one stage succeeded; more may follow.
    Populated,
    /// The last applicable stage ran, successful or not.
    Done,
}

/// Record could not be turned into an entity.
#[derive(Debug)]
pub struct BuildError {
    pub kind: &'static str,
    pub source: serde_json::Error,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed {} record: {}", self.kind, self.source)
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// What a list manager needs from the entities it holds.
#[async_trait]
pub trait ListEntity: Sortable + fmt::Display + Send + Sync + Sized + 'static {
    /// Used in logs, e.g. `"thread"`.
    const KIND: &'static str;

    /// Builds and fully populates an entity from one list element.
    async fn from_record(ctx: EntityContext, record: RawRecord) -> Result<Self, BuildError>;

    /// Re-evaluates visibility against the active filter.
    fn filter_compare(&mut self, search: &str, criteria: Criteria);

    fn is_visible(&self) -> bool;

    fn main_element(&self) -> &Element;
}

/// A button acting on one record, e.g. `"button-delete-post"` for post 7.
pub(crate) fn action_button(class_name: &str, label: &str, target: i64) -> Element {
    let button = Element::with_class("button", class_name);
    button.set_text(label);
    button.set_data_target(Some(target));
    button
}

/// Id of a record that failed to deserialize, so it can still be fetched.
pub(crate) fn salvage_id(record: &RawRecord, key: &str) -> Option<i64> {
    record.get(key).and_then(serde_json::Value::as_i64)
}

/// Displays `null` for an absent value.
pub(crate) struct OrNull<'a, T>(pub Option<&'a T>);

impl<T: fmt::Display> fmt::Display for OrNull<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "\"{value}\""),
            None => f.write_str("null"),
        }
    }
}
