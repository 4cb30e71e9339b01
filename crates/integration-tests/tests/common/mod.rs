//! In-memory backend shared by the scenario tests.
//!
//! Behaves like the REST backend closely enough to drive whole flows:
//! ids come from one counter, every write bumps a logical clock, and every
//! call is recorded by name so tests can assert what was (not) requested.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rb_core::error::{ApiError, ApiResult, Status};
use rb_core::models::{
    Blob, ImageFile, ImageId, Post, PostDraft, PostId, RawRecord, SessionCredential, Settings,
    Thread, ThreadAndPosts, ThreadDraft, ThreadId, User, UserId,
};
use rb_core::traits::{BlobStore, ImageboardApi};
use rb_storage_local::MemoryBlobStore;
use rb_ui::{EntityContext, FilterState, Imageboard, Page};
use secrecy::ExposeSecret;

#[derive(Default)]
struct State {
    next_id: i64,
    clock: i64,
    users: BTreeMap<UserId, (User, String)>,
    threads: BTreeMap<ThreadId, Thread>,
    posts: BTreeMap<PostId, Post>,
    images: BTreeMap<ImageId, Blob>,
    settings: Option<Settings>,
    session: Option<UserId>,
    /// Records appended verbatim to every thread list.
    extra_records: Vec<RawRecord>,
    /// Per-call latency of `retrieve_threads`, consumed front to back.
    list_delays: VecDeque<Duration>,
    fail_uploads: bool,
    calls: Vec<&'static str>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

pub fn not_found(what: &str) -> ApiError {
    ApiError::Status(Status::new(404, "NotFound", format!("No such {what}.")))
}

fn unauthorized() -> ApiError {
    ApiError::Status(Status::new(401, "Unauthorized", "Not logged in."))
}

pub fn png(bytes: &'static [u8]) -> Blob {
    Blob {
        mime: mime::IMAGE_PNG,
        bytes: Bytes::from_static(bytes),
    }
}

pub fn png_file(name: &str, bytes: &'static [u8]) -> ImageFile {
    ImageFile {
        file_name: name.to_string(),
        mime: mime::IMAGE_PNG,
        bytes: Bytes::from_static(bytes),
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: &'static str) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }

    /// How many times `call` was made.
    pub fn calls(&self, call: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == call).count()
    }

    pub fn fail_uploads(&self) {
        self.state().fail_uploads = true;
    }

    /// Delays the next thread or post list fetches, one duration each.
    pub fn delay_next_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.state().list_delays.extend(delays);
    }

    pub fn push_raw_record(&self, record: RawRecord) {
        self.state().extra_records.push(record);
    }

    pub fn stored_settings(&self) -> Option<Settings> {
        self.state().settings.clone()
    }

    pub fn store_settings(&self, settings: Settings) {
        self.state().settings = Some(settings);
    }

    pub fn thread_count(&self) -> usize {
        self.state().threads.len()
    }

    pub fn has_post(&self, post_id: PostId) -> bool {
        self.state().posts.contains_key(&post_id)
    }

    pub fn seed_user(&self, name: &str, password: &str) -> UserId {
        let mut state = self.state();
        let user_id = state.id();
        let user_timestamp = state.tick();
        let user = User {
            user_id,
            user_name: name.to_string(),
            user_group: None,
            user_timestamp,
        };
        state.users.insert(user_id, (user, password.to_string()));
        user_id
    }

    /// Adds a thread with its opening post, stamped at `timestamp`.
    pub fn seed_thread(
        &self,
        user_id: UserId,
        subject: &str,
        text: &str,
        timestamp: i64,
        image: Option<Blob>,
    ) -> ThreadId {
        let mut state = self.state();
        let image_id = image.map(|blob| {
            let id = state.id();
            state.images.insert(id, blob);
            id
        });
        let thread_id = state.id();
        let post_id = state.id();
        state.posts.insert(
            post_id,
            Post {
                post_id,
                thread_id,
                post_text: text.to_string(),
                post_timestamp: timestamp,
                post_last_modified: timestamp,
                user_id,
                image_id,
            },
        );
        state.threads.insert(
            thread_id,
            Thread {
                thread_id,
                thread_subject: subject.to_string(),
                thread_timestamp: timestamp,
                thread_last_modified: timestamp,
                user_id,
                post_id: Some(post_id),
            },
        );
        thread_id
    }

    pub fn seed_post(&self, thread_id: ThreadId, user_id: UserId, text: &str, timestamp: i64) -> PostId {
        let mut state = self.state();
        let post_id = state.id();
        state.posts.insert(
            post_id,
            Post {
                post_id,
                thread_id,
                post_text: text.to_string(),
                post_timestamp: timestamp,
                post_last_modified: timestamp,
                user_id,
                image_id: None,
            },
        );
        post_id
    }

    fn author(state: &State) -> UserId {
        state.session.unwrap_or_default()
    }
}

#[async_trait]
impl ImageboardApi for FakeBackend {
    async fn register(&self, credential: &SessionCredential) -> ApiResult<UserId> {
        let mut state = self.record("register");
        if state.users.values().any(|(u, _)| u.user_name == credential.username) {
            return Err(ApiError::Status(Status::new(
                409,
                "Conflict",
                "The username is taken.",
            )));
        }
        let user_id = state.id();
        let user_timestamp = state.tick();
        let user = User {
            user_id,
            user_name: credential.username.clone(),
            user_group: None,
            user_timestamp,
        };
        let password = credential.password.expose_secret().to_string();
        state.users.insert(user_id, (user, password));
        Ok(user_id)
    }

    async fn login(&self, credential: &SessionCredential) -> ApiResult<UserId> {
        let mut state = self.record("login");
        let found = state.users.values().find(|(user, password)| {
            user.user_name == credential.username
                && password.as_str() == credential.password.expose_secret()
        });
        let Some(user_id) = found.map(|(user, _)| user.user_id) else {
            return Err(ApiError::Status(Status::new(
                401,
                "Unauthorized",
                "Wrong username or password.",
            )));
        };
        state.session = Some(user_id);
        Ok(user_id)
    }

    async fn logout(&self) -> ApiResult<UserId> {
        self.record("logout").session.take().ok_or_else(unauthorized)
    }

    async fn get_settings(&self) -> ApiResult<Option<Settings>> {
        Ok(self.record("get_settings").settings.clone())
    }

    async fn set_settings(&self, settings: &Settings) -> ApiResult<Option<Settings>> {
        let mut state = self.record("set_settings");
        state.settings = Some(settings.clone());
        Ok(state.settings.clone())
    }

    async fn retrieve_user(&self, user_id: UserId) -> ApiResult<User> {
        let state = self.record("retrieve_user");
        state
            .users
            .get(&user_id)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| not_found("user"))
    }

    async fn insert_image(&self, image: &ImageFile) -> ApiResult<ImageId> {
        let mut state = self.record("insert_image");
        if state.fail_uploads {
            return Err(ApiError::Transport("connection reset by peer".to_string()));
        }
        let image_id = state.id();
        state.images.insert(image_id, Blob::from(image.clone()));
        Ok(image_id)
    }

    async fn retrieve_image(&self, image_id: ImageId) -> ApiResult<Blob> {
        let state = self.record("retrieve_image");
        state.images.get(&image_id).cloned().ok_or_else(|| not_found("image"))
    }

    async fn retrieve_thumbnail(&self, image_id: ImageId) -> ApiResult<Blob> {
        let state = self.record("retrieve_thumbnail");
        state.images.get(&image_id).cloned().ok_or_else(|| not_found("image"))
    }

    async fn insert_thread(&self, draft: &ThreadDraft) -> ApiResult<ThreadId> {
        let mut state = self.record("insert_thread");
        let user_id = Self::author(&state);
        let now = state.tick();
        let thread_id = state.id();
        let post_id = state.id();
        state.posts.insert(
            post_id,
            Post {
                post_id,
                thread_id,
                post_text: draft.post_text.clone(),
                post_timestamp: now,
                post_last_modified: now,
                user_id,
                image_id: draft.image_id,
            },
        );
        state.threads.insert(
            thread_id,
            Thread {
                thread_id,
                thread_subject: draft.thread_subject.clone(),
                thread_timestamp: now,
                thread_last_modified: now,
                user_id,
                post_id: Some(post_id),
            },
        );
        Ok(thread_id)
    }

    async fn update_thread(&self, thread_id: ThreadId, draft: &ThreadDraft) -> ApiResult<ThreadId> {
        let mut state = self.record("update_thread");
        let now = state.tick();
        let thread = state.threads.get_mut(&thread_id).ok_or_else(|| not_found("thread"))?;
        thread.thread_subject = draft.thread_subject.clone();
        thread.thread_last_modified = now;
        let opening = thread.post_id;
        if let Some(post) = opening.and_then(|id| state.posts.get_mut(&id)) {
            post.post_text = draft.post_text.clone();
            post.post_last_modified = now;
            if draft.image_id.is_some() {
                post.image_id = draft.image_id;
            }
        }
        Ok(thread_id)
    }

    async fn delete_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadId> {
        let mut state = self.record("delete_thread");
        state.threads.remove(&thread_id).ok_or_else(|| not_found("thread"))?;
        state.posts.retain(|_, post| post.thread_id != thread_id);
        Ok(thread_id)
    }

    async fn retrieve_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadAndPosts> {
        let state = self.record("retrieve_thread");
        let thread = state.threads.get(&thread_id).cloned().ok_or_else(|| not_found("thread"))?;
        let posts = state
            .posts
            .values()
            .filter(|post| post.thread_id == thread_id)
            .cloned()
            .collect();
        Ok(ThreadAndPosts { thread, posts })
    }

    async fn retrieve_threads(&self) -> ApiResult<Vec<RawRecord>> {
        let (records, delay) = {
            let mut state = self.record("retrieve_threads");
            let mut records: Vec<RawRecord> = state
                .threads
                .values()
                .map(|thread| serde_json::to_value(thread).unwrap())
                .collect();
            records.extend(state.extra_records.iter().cloned());
            (records, state.list_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }

    async fn insert_post(&self, thread_id: ThreadId, draft: &PostDraft) -> ApiResult<PostId> {
        let mut state = self.record("insert_post");
        if !state.threads.contains_key(&thread_id) {
            return Err(not_found("thread"));
        }
        let user_id = Self::author(&state);
        let now = state.tick();
        let post_id = state.id();
        state.posts.insert(
            post_id,
            Post {
                post_id,
                thread_id,
                post_text: draft.post_text.clone(),
                post_timestamp: now,
                post_last_modified: now,
                user_id,
                image_id: draft.image_id,
            },
        );
        if let Some(thread) = state.threads.get_mut(&thread_id) {
            thread.thread_last_modified = now;
        }
        Ok(post_id)
    }

    async fn update_post(&self, post_id: PostId, draft: &PostDraft) -> ApiResult<PostId> {
        let mut state = self.record("update_post");
        let now = state.tick();
        let post = state.posts.get_mut(&post_id).ok_or_else(|| not_found("post"))?;
        post.post_text = draft.post_text.clone();
        post.post_last_modified = now;
        if draft.image_id.is_some() {
            post.image_id = draft.image_id;
        }
        Ok(post_id)
    }

    async fn delete_post(&self, post_id: PostId) -> ApiResult<PostId> {
        let mut state = self.record("delete_post");
        state.posts.remove(&post_id).ok_or_else(|| not_found("post"))?;
        Ok(post_id)
    }

    async fn retrieve_post(&self, post_id: PostId) -> ApiResult<Post> {
        let state = self.record("retrieve_post");
        state.posts.get(&post_id).cloned().ok_or_else(|| not_found("post"))
    }

    async fn retrieve_posts(&self, thread_id: ThreadId) -> ApiResult<Vec<RawRecord>> {
        let (records, delay) = {
            let mut state = self.record("retrieve_posts");
            if !state.threads.contains_key(&thread_id) {
                return Err(not_found("thread"));
            }
            let records: Vec<RawRecord> = state
                .posts
                .values()
                .filter(|post| post.thread_id == thread_id)
                .map(|post| serde_json::to_value(post).unwrap())
                .collect();
            (records, state.list_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }
}

/// A backend, a blob store and the context entities are built with.
pub struct Fixture {
    pub backend: Arc<FakeBackend>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            backend: FakeBackend::new(),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }

    pub fn api(&self) -> Arc<dyn ImageboardApi> {
        self.backend.clone()
    }

    pub fn blob_store(&self) -> Arc<dyn BlobStore> {
        self.blobs.clone()
    }

    pub fn context(&self) -> EntityContext {
        EntityContext::new(self.api(), self.blob_store())
    }

    pub fn board(&self, initial: FilterState) -> Imageboard {
        Imageboard::new(self.api(), self.blob_store(), Page::headless(), initial)
    }
}
