//! Thread and post mutations followed by the reload they trigger.

mod common;

use std::sync::Arc;

use common::{png_file, Fixture};
use rb_core::error::{ApiError, Status};
use rb_core::models::Post;
use rb_core::traits::{BlobStore, ImageboardApi, MockImageboardApi};
use rb_core::validation::FormData;
use rb_storage_local::MemoryBlobStore;
use rb_ui::dom::Element;
use rb_ui::entity::EntityContext;
use rb_ui::filter::SharedFilter;
use rb_ui::manager::{PostsManager, PostsScope, ThreadsManager, ThreadsScope};
use tokio_test::{assert_err, assert_ok};

fn threads(fixture: &Fixture) -> ThreadsManager {
    ThreadsManager::new(
        ThreadsScope,
        fixture.context(),
        SharedFilter::default(),
        Element::new("div"),
    )
}

fn posts(ctx: EntityContext, thread_id: i64) -> PostsManager {
    PostsManager::new(
        PostsScope { thread_id },
        ctx,
        SharedFilter::default(),
        Element::new("div"),
    )
}

fn thread_form(subject: &str, text: &str) -> FormData {
    FormData::new()
        .with_text("subject", subject)
        .with_text("text", text)
        .with_file("image", Some(png_file("crab.png", b"crab")))
}

#[tokio::test]
async fn test_add_thread_with_image_shows_it_after_reload() {
    let fixture = Fixture::new();
    let manager = threads(&fixture);

    let thread_id = assert_ok!(manager.add_thread(&thread_form("Crabs", "look")).await);

    assert_eq!(fixture.backend.calls("insert_image"), 1);
    assert_eq!(manager.len(), 1);
    manager.for_each(|thread| {
        assert_eq!(thread.thread_id(), Some(thread_id));
        assert!(thread.has_image());
        assert!(thread.thumbnail_src().starts_with("blob:"));
    });
}

#[tokio::test]
async fn test_failed_upload_creates_no_thread_and_keeps_the_list() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    fixture.backend.seed_thread(user, "Existing", "", 1, None);
    let manager = threads(&fixture);
    manager.reload_list().await.unwrap();
    let before = manager.container().text_content();

    fixture.backend.fail_uploads();
    let err = assert_err!(manager.add_thread(&thread_form("Crabs", "look")).await);

    assert_eq!(err.status().name, "NetworkError");
    assert_eq!(fixture.backend.calls("insert_thread"), 0);
    assert_eq!(fixture.backend.thread_count(), 1);
    assert_eq!(manager.container().text_content(), before);
}

#[tokio::test]
async fn test_modify_thread_updates_subject_and_text() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    let thread_id = fixture.backend.seed_thread(user, "Old", "old text", 1, None);
    let manager = threads(&fixture);

    let form = FormData::new()
        .with_text("subject", "New")
        .with_text("text", "new text")
        .with_file("image", None);
    assert_eq!(manager.modify_thread(&form, Some(thread_id)).await, Ok(thread_id));

    assert_eq!(fixture.backend.calls("insert_image"), 0);
    let text = manager.container().text_content();
    assert!(text.contains("New"));
    assert!(text.contains("new text"));
    assert!(!text.contains("Old"));
}

#[tokio::test]
async fn test_delete_thread_removes_it_and_its_posts() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    let doomed = fixture.backend.seed_thread(user, "Doomed", "", 1, None);
    let reply = fixture.backend.seed_post(doomed, user, "reply", 2);
    fixture.backend.seed_thread(user, "Survivor", "", 3, None);
    let manager = threads(&fixture);

    assert_eq!(manager.delete_thread(Some(doomed)).await, Ok(doomed));
    assert!(!fixture.backend.has_post(reply));
    assert_eq!(manager.len(), 1);
    assert!(!manager.container().text_content().contains("Doomed"));
}

#[tokio::test]
async fn test_delete_of_unknown_thread_passes_backend_status_through() {
    let fixture = Fixture::new();
    let manager = threads(&fixture);

    let err = assert_err!(manager.delete_thread(Some(999)).await);
    assert_eq!(err.status(), Status::new(404, "NotFound", "No such thread."));
    // Nothing changed, so nothing is reloaded.
    assert_eq!(fixture.backend.calls("retrieve_threads"), 0);
}

#[tokio::test]
async fn test_add_post_appears_in_thread() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    let thread_id = fixture.backend.seed_thread(user, "Topic", "opening", 1, None);
    let manager = posts(fixture.context(), thread_id);

    let form = FormData::new().with_text("text", "me too").with_file("image", None);
    assert_ok!(manager.add_post(&form).await);

    assert_eq!(manager.len(), 2);
    assert!(manager.container().text_content().contains("me too"));
}

#[tokio::test]
async fn test_delete_post_missing_from_the_list_still_deletes_and_reloads() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    let thread_id = fixture.backend.seed_thread(user, "Topic", "opening", 1, None);
    let manager = posts(fixture.context(), thread_id);
    manager.reload_list().await.unwrap();

    // Created by someone else after the list was loaded.
    let unseen = fixture.backend.seed_post(thread_id, user, "unseen", 2);
    assert_eq!(manager.delete_post(Some(unseen)).await, Ok(unseen));

    assert_eq!(fixture.backend.calls("delete_post"), 1);
    assert!(!fixture.backend.has_post(unseen));
    assert_eq!(manager.len(), 1);
}

#[tokio::test]
async fn test_delete_post_then_empty_reload() {
    let mut api = MockImageboardApi::new();
    api.expect_delete_post()
        .withf(|post_id| *post_id == 7)
        .times(1)
        .returning(|post_id| Ok(post_id));
    api.expect_retrieve_posts()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let api: Arc<dyn ImageboardApi> = Arc::new(api);
    let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
    let manager = posts(EntityContext::new(api, blobs), 3);

    assert_eq!(manager.delete_post(Some(7)).await, Ok(7));
    assert!(manager.is_empty());
    assert_eq!(manager.container().child_count(), 0);
}

#[tokio::test]
async fn test_modify_post_reload_failure_is_not_the_mutation_error() {
    let mut api = MockImageboardApi::new();
    api.expect_update_post().times(1).returning(|post_id, _| Ok(post_id));
    api.expect_retrieve_posts()
        .times(1)
        .returning(|_| Err(ApiError::Transport("timed out".to_string())));
    let api: Arc<dyn ImageboardApi> = Arc::new(api);
    let blobs: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
    let manager = posts(EntityContext::new(api, blobs), 3);

    let form = FormData::new().with_text("text", "edited").with_file("image", None);
    assert_eq!(manager.modify_post(&form, Some(5)).await, Ok(5));
    assert!(manager.is_empty());
}

#[tokio::test]
async fn test_modify_post_keeps_existing_image_without_new_file() {
    let fixture = Fixture::new();
    let user = fixture.backend.seed_user("ferris", "password1");
    let thread_id = fixture.backend.seed_thread(user, "Topic", "opening", 1, None);
    let manager = posts(fixture.context(), thread_id);
    let with_image = FormData::new()
        .with_text("text", "pic")
        .with_file("image", Some(png_file("a.png", b"a")));
    let post_id = manager.add_post(&with_image).await.unwrap();

    let text_only = FormData::new().with_text("text", "pic, edited").with_file("image", None);
    manager.modify_post(&text_only, Some(post_id)).await.unwrap();

    let mut edited: Option<Post> = None;
    manager.for_each(|post| {
        if post.post_id() == Some(post_id) {
            edited = post.post().cloned();
        }
    });
    let edited = edited.unwrap();
    assert_eq!(edited.post_text, "pic, edited");
    assert!(edited.image_id.is_some());
    assert_eq!(fixture.blobs.live_count(), 1);
}
