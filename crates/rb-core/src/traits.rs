//! # Core Traits (Ports)
//!
//! The UI layer depends only on these; transports and blob storage are plugins.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    Blob, ImageFile, ImageId, Post, PostDraft, PostId, RawRecord, SessionCredential, Settings,
    ThreadAndPosts, ThreadDraft, ThreadId, User, UserId,
};

/// One typed call per backend resource operation.
///
/// A backend error record comes back as `Err(ApiError::Status(..))`; a
/// transport failure as `Err(ApiError::Transport(..))`. No method retries.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageboardApi: Send + Sync {
    // Session
    async fn register(&self, credential: &SessionCredential) -> ApiResult<UserId>;
    async fn login(&self, credential: &SessionCredential) -> ApiResult<UserId>;
    async fn logout(&self) -> ApiResult<UserId>;

    // Settings. `Ok(None)` means nothing is stored yet.
    async fn get_settings(&self) -> ApiResult<Option<Settings>>;
    async fn set_settings(&self, settings: &Settings) -> ApiResult<Option<Settings>>;

    async fn retrieve_user(&self, user_id: UserId) -> ApiResult<User>;

    // Images
    async fn insert_image(&self, image: &ImageFile) -> ApiResult<ImageId>;
    async fn retrieve_image(&self, image_id: ImageId) -> ApiResult<Blob>;
    async fn retrieve_thumbnail(&self, image_id: ImageId) -> ApiResult<Blob>;

    // Threads
    async fn insert_thread(&self, draft: &ThreadDraft) -> ApiResult<ThreadId>;
    async fn update_thread(&self, thread_id: ThreadId, draft: &ThreadDraft) -> ApiResult<ThreadId>;
    async fn delete_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadId>;
    async fn retrieve_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadAndPosts>;
    async fn retrieve_threads(&self) -> ApiResult<Vec<RawRecord>>;

    // Posts
    async fn insert_post(&self, thread_id: ThreadId, draft: &PostDraft) -> ApiResult<PostId>;
    async fn update_post(&self, post_id: PostId, draft: &PostDraft) -> ApiResult<PostId>;
    async fn delete_post(&self, post_id: PostId) -> ApiResult<PostId>;
    async fn retrieve_post(&self, post_id: PostId) -> ApiResult<Post>;
    async fn retrieve_posts(&self, thread_id: ThreadId) -> ApiResult<Vec<RawRecord>>;
}

/// Allocates process-local object URLs for binary data.
///
/// Every URL handed out must be revoked exactly once by whoever holds it.
pub trait BlobStore: Send + Sync {
    fn create_object_url(&self, blob: Blob) -> String;
    fn revoke_object_url(&self, url: &str);
    /// Number of URLs created and not yet revoked.
    fn live_count(&self) -> usize;
}
