//! Object URL ownership.
//!
//! An [`ObjectUrl`] revokes itself on drop, so every early return, rebuild or
//! teardown releases the data it points to. [`ImageSlot`] ties at most one of
//! them to an image element.

use std::fmt;
use std::sync::Arc;

use rb_core::models::Blob;
use rb_core::traits::BlobStore;

use crate::dom::Element;

/// 1x1 transparent PNG shown while no image is assigned.
pub const PLACEHOLDER_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub struct ObjectUrl {
    url: String,
    store: Arc<dyn BlobStore>,
}

impl ObjectUrl {
    pub fn create(store: &Arc<dyn BlobStore>, blob: Blob) -> Self {
        Self {
            url: store.create_object_url(blob),
            store: Arc::clone(store),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke_object_url(&self.url);
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

/// An `<img>` plus the object URL it currently displays, if any.
#[derive(Debug)]
pub struct ImageSlot {
    element: Element,
    current: Option<ObjectUrl>,
}

impl ImageSlot {
    pub fn new(element: Element) -> Self {
        element.set_src(PLACEHOLDER_URL);
        Self { element, current: None }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Displays `url`. The previous URL is released before the new one is
    /// assigned.
    pub fn assign(&mut self, url: ObjectUrl) {
        self.clear();
        self.element.set_src(url.as_str());
        self.current = Some(url);
    }

    /// Back to the placeholder, releasing the current URL.
    pub fn clear(&mut self) {
        self.element.set_src(PLACEHOLDER_URL);
        self.current = None;
    }

    pub fn is_assigned(&self) -> bool {
        self.current.is_some()
    }
}
