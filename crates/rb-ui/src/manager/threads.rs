use async_trait::async_trait;
use rb_core::error::{ApiResult, AppError};
use rb_core::models::{ImageId, RawRecord, ThreadDraft, ThreadId};
use rb_core::traits::ImageboardApi;
use rb_core::validation::FormData;
use tracing::{info, warn};

use super::{ListManager, ListScope};
use crate::entity::ThreadView;

/// Every thread on the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadsScope;

#[async_trait]
impl ListScope for ThreadsScope {
    type Entity = ThreadView;

    async fn fetch(&self, api: &dyn ImageboardApi) -> ApiResult<Vec<RawRecord>> {
        api.retrieve_threads().await
    }
}

pub type ThreadsManager = ListManager<ThreadsScope>;

/// Uploads the chosen image, if any. A form without a file (or with an
/// empty one) yields `None` without a request.
pub(crate) async fn upload_image(
    api: &dyn ImageboardApi,
    form: &FormData,
) -> Result<Option<ImageId>, AppError> {
    let Some(file) = form.file("image").filter(|f| !f.bytes.is_empty()) else {
        return Ok(None);
    };
    match api.insert_image(file).await {
        Ok(image_id) => Ok(Some(image_id)),
        Err(err) => {
            warn!(file_name = %file.file_name, error = %err, "image upload failed");
            Err(err.into())
        }
    }
}

fn thread_draft(form: &FormData, image_id: Option<ImageId>) -> ThreadDraft {
    ThreadDraft {
        thread_subject: form.text("subject").to_string(),
        post_text: form.text("text").to_string(),
        image_id,
    }
}

impl ListManager<ThreadsScope> {
    /// Creates a thread from the `subject`, `text` and `image` fields.
    pub async fn add_thread(&self, form: &FormData) -> Result<ThreadId, AppError> {
        let image_id = upload_image(self.api(), form).await?;
        let thread_id = self.api().insert_thread(&thread_draft(form, image_id)).await?;
        info!(thread_id, "thread added");
        self.refresh().await;
        Ok(thread_id)
    }

    pub async fn modify_thread(
        &self,
        form: &FormData,
        thread_id: Option<ThreadId>,
    ) -> Result<ThreadId, AppError> {
        let thread_id = thread_id.ok_or(AppError::MissingIdentifier("thread id"))?;
        let image_id = upload_image(self.api(), form).await?;
        let thread_id = self
            .api()
            .update_thread(thread_id, &thread_draft(form, image_id))
            .await?;
        info!(thread_id, "thread modified");
        self.refresh().await;
        Ok(thread_id)
    }

    pub async fn delete_thread(&self, thread_id: Option<ThreadId>) -> Result<ThreadId, AppError> {
        let thread_id = thread_id.ok_or(AppError::MissingIdentifier("thread id"))?;
        let thread_id = self.api().delete_thread(thread_id).await?;
        info!(thread_id, "thread deleted");
        self.refresh().await;
        Ok(thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bytes::Bytes;
    use rb_core::error::ApiError;
    use rb_core::models::ImageFile;
    use rb_core::traits::{BlobStore, MockImageboardApi};
    use rb_storage_local::MemoryBlobStore;

    use crate::dom::Element;
    use crate::entity::EntityContext;
    use crate::filter::SharedFilter;

    fn manager(api: MockImageboardApi) -> ThreadsManager {
        let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
        ListManager::new(
            ThreadsScope,
            EntityContext::new(Arc::new(api), blobs),
            SharedFilter::default(),
            Element::with_class("div", "main-content"),
        )
    }

    fn form_with_image() -> FormData {
        FormData::new()
            .with_text("subject", "Rust")
            .with_text("text", "hello")
            .with_file(
                "image",
                Some(ImageFile {
                    file_name: "crab.png".into(),
                    mime: mime::IMAGE_PNG,
                    bytes: Bytes::from_static(b"png"),
                }),
            )
    }

    #[tokio::test]
    async fn test_failed_upload_never_inserts() {
        let mut api = MockImageboardApi::new();
        api.expect_insert_image()
            .times(1)
            .returning(|_| Err(ApiError::Transport("connection reset".into())));
        api.expect_insert_thread().times(0);
        api.expect_retrieve_threads().times(0);

        let err = manager(api).add_thread(&form_with_image()).await.unwrap_err();
        assert_eq!(err.status().name, "NetworkError");
    }

    #[tokio::test]
    async fn test_without_file_skips_upload_and_reloads() {
        let mut api = MockImageboardApi::new();
        api.expect_insert_image().times(0);
        api.expect_insert_thread()
            .withf(|draft| draft.thread_subject == "Rust" && draft.image_id.is_none())
            .times(1)
            .returning(|_| Ok(12));
        api.expect_retrieve_threads().times(1).returning(|| Ok(Vec::new()));

        let form = FormData::new()
            .with_text("subject", "Rust")
            .with_text("text", "")
            .with_file("image", None);
        assert_eq!(manager(api).add_thread(&form).await, Ok(12));
    }

    #[tokio::test]
    async fn test_upload_id_is_sent_with_the_thread() {
        let mut api = MockImageboardApi::new();
        api.expect_insert_image().returning(|_| Ok(77));
        api.expect_insert_thread()
            .withf(|draft| draft.image_id == Some(77))
            .returning(|_| Ok(1));
        api.expect_retrieve_threads().returning(|| Ok(Vec::new()));

        assert_eq!(manager(api).add_thread(&form_with_image()).await, Ok(1));
    }

    #[tokio::test]
    async fn test_missing_target_is_bad_client() {
        let mut api = MockImageboardApi::new();
        api.expect_delete_thread().times(0);
        let manager = manager(api);

        let err = manager.delete_thread(None).await.unwrap_err();
        assert_eq!(err, AppError::MissingIdentifier("thread id"));
        let err = manager.modify_thread(&FormData::new(), None).await.unwrap_err();
        assert_eq!(err.status().name, "BadClient");
    }

    #[tokio::test]
    async fn test_backend_status_is_returned() {
        let mut api = MockImageboardApi::new();
        api.expect_delete_thread().returning(|_| {
            Err(ApiError::Status(rb_core::error::Status::new(
                403,
                "Forbidden",
                "Not your thread.",
            )))
        });
        api.expect_retrieve_threads().times(0);

        let err = manager(api).delete_thread(Some(3)).await.unwrap_err();
        assert_eq!(err.status().to_string(), "403 Forbidden: Not your thread.");
    }

    #[tokio::test]
    async fn test_failed_fetch_empties_the_list() {
        let mut api = MockImageboardApi::new();
        api.expect_retrieve_threads()
            .returning(|| Err(ApiError::Transport("offline".into())));
        let manager = manager(api);
        manager.container().append_child(&Element::new("div"));

        assert!(manager.reload_list().await.is_err());
        assert!(manager.is_empty());
        assert_eq!(manager.container().child_count(), 0);
    }
}
