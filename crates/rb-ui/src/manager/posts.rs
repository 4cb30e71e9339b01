use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rb_core::error::{ApiResult, AppError};
use rb_core::models::{ImageId, PostDraft, PostId, RawRecord, ThreadId};
use rb_core::traits::ImageboardApi;
use rb_core::validation::FormData;
use tracing::info;

use super::threads::upload_image;
use super::{ListManager, ListScope, ListView, Reload};
use crate::dom::Element;
use crate::entity::{EntityContext, PostView};
use crate::filter::SharedFilter;

/// The posts of one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostsScope {
    pub thread_id: ThreadId,
}

#[async_trait]
impl ListScope for PostsScope {
    type Entity = PostView;

    async fn fetch(&self, api: &dyn ImageboardApi) -> ApiResult<Vec<RawRecord>> {
        api.retrieve_posts(self.thread_id).await
    }
}

pub type PostsManager = ListManager<PostsScope>;

fn post_draft(form: &FormData, image_id: Option<ImageId>) -> PostDraft {
    PostDraft {
        post_text: form.text("text").to_string(),
        image_id,
    }
}

impl ListManager<PostsScope> {
    pub fn thread_id(&self) -> ThreadId {
        self.scope().thread_id
    }

    /// Replies to this thread with the `text` and `image` fields.
    pub async fn add_post(&self, form: &FormData) -> Result<PostId, AppError> {
        let image_id = upload_image(self.api(), form).await?;
        let post_id = self
            .api()
            .insert_post(self.thread_id(), &post_draft(form, image_id))
            .await?;
        info!(thread_id = self.thread_id(), post_id, "post added");
        self.refresh().await;
        Ok(post_id)
    }

    pub async fn modify_post(
        &self,
        form: &FormData,
        post_id: Option<PostId>,
    ) -> Result<PostId, AppError> {
        let post_id = post_id.ok_or(AppError::MissingIdentifier("post id"))?;
        let image_id = upload_image(self.api(), form).await?;
        let post_id = self
            .api()
            .update_post(post_id, &post_draft(form, image_id))
            .await?;
        info!(post_id, "post modified");
        self.refresh().await;
        Ok(post_id)
    }

    /// Deletes by id alone; the post need not be in the current list.
    pub async fn delete_post(&self, post_id: Option<PostId>) -> Result<PostId, AppError> {
        let post_id = post_id.ok_or(AppError::MissingIdentifier("post id"))?;
        let post_id = self.api().delete_post(post_id).await?;
        info!(post_id, "post deleted");
        self.refresh().await;
        Ok(post_id)
    }
}

/// The posts list currently open, if any. Opening another thread's posts
/// replaces it.
///
/// Every list opened here shares one reload generation, so a slow load of a
/// thread that is no longer open never overwrites the current one.
#[derive(Clone, Default)]
pub struct ActivePosts {
    current: Arc<Mutex<Option<PostsManager>>>,
    generation: Arc<AtomicU64>,
}

impl ActivePosts {
    pub fn get(&self) -> Option<PostsManager> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Makes the posts of `thread_id`, rendered into `container`, the open list.
    pub fn open(
        &self,
        thread_id: ThreadId,
        ctx: EntityContext,
        filter: SharedFilter,
        container: Element,
    ) -> PostsManager {
        let manager = ListManager::with_generation(
            PostsScope { thread_id },
            ctx,
            filter,
            container,
            Arc::clone(&self.generation),
        );
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(manager.clone());
        manager
    }

    /// The open list, or `MissingIdentifier` when no thread is open.
    pub fn require(&self) -> Result<PostsManager, AppError> {
        self.get().ok_or(AppError::MissingIdentifier("thread id"))
    }
}

#[async_trait]
impl ListView for ActivePosts {
    async fn reload_list(&self) -> Result<Reload, AppError> {
        self.require()?.reload_list().await
    }

    fn sort_list(&self) {
        if let Some(manager) = self.get() {
            manager.sort_list();
        }
    }

    fn filter_list(&self) {
        if let Some(manager) = self.get() {
            manager.filter_list();
        }
    }
}
