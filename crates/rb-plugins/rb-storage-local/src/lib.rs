//! # rb-storage-local
//! rusty-board/crates/rb-plugins/rb-storage-local/src/lib.rs
//! Process-local implementation of `BlobStore`.
//! Features: opaque `blob:` URLs, exact live-URL accounting, idempotent revocation.

use dashmap::DashMap;
use rb_core::models::Blob;
use rb_core::traits::BlobStore;
use uuid::Uuid;

const URL_PREFIX: &str = "blob:rusty-board/";

pub struct MemoryBlobStore {
    /// Live URL -> the data it refers to
    blobs: DashMap<String, Blob>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self { blobs: DashMap::new() }
    }

    /// Resolves a live URL back to its data, the way an `<img>` would.
    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs.get(url).map(|entry| entry.value().clone())
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.blobs.contains_key(url)
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryBlobStore {
    fn create_object_url(&self, blob: Blob) -> String {
        let url = format!("{URL_PREFIX}{}", Uuid::new_v4());
        tracing::debug!(%url, size = blob.bytes.len(), mime = %blob.mime, "Created object URL");
        self.blobs.insert(url.clone(), blob);
        url
    }

    fn revoke_object_url(&self, url: &str) {
        match self.blobs.remove(url) {
            Some(_) => tracing::debug!(%url, "Revoked object URL"),
            // Revoking an unknown URL is a no-op, as in browsers.
            None => tracing::warn!(%url, "Revoke of unknown object URL"),
        }
    }

    fn live_count(&self) -> usize {
        self.blobs.len()
    }
}
