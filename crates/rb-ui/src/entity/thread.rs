use std::fmt;

use async_trait::async_trait;
use rb_core::models::{Post, RawRecord, Thread, ThreadId, User};
use tracing::{debug, warn};

use super::{action_button, salvage_id, BuildError, EntityContext, EntityState, ListEntity, OrNull};
use crate::dom::Element;
use crate::filter::{passes, Criteria, Facet, Facets, Sortable};
use crate::object_url::{ImageSlot, ObjectUrl};

/// A thread in the thread list: subject, opening post text, its image and
/// the author.
#[derive(Debug)]
pub struct ThreadView {
    ctx: EntityContext,
    main: Element,
    subject: Element,
    text: Element,
    thumbnail_container: Element,
    thumbnail: ImageSlot,
    author: Element,
    actions: Element,
    thread_id: Option<ThreadId>,
    thread: Option<Thread>,
    post: Option<Post>,
    user: Option<User>,
    state: EntityState,
    hidden: bool,
}

impl ThreadView {
    pub fn new(ctx: EntityContext) -> Self {
        let thumbnail_container = Element::with_class("div", "thumbnail-container");
        let thumbnail = ImageSlot::new(Element::with_class("img", "thumbnail"));
        thumbnail_container.append_child(thumbnail.element());
        Self {
            ctx,
            main: Element::with_class("div", "thread"),
            subject: Element::with_class("div", "thread-subject"),
            text: Element::with_class("div", "thread-text"),
            thumbnail_container,
            thumbnail,
            author: Element::with_class("div", "thread-user"),
            actions: Element::with_class("div", "thread-actions"),
            thread_id: None,
            thread: None,
            post: None,
            user: None,
            state: EntityState::Empty,
            hidden: true,
        }
    }

    /// Fetches the thread and repopulates. `None` reuses the current id.
    pub async fn rebuild_from_id(&mut self, thread_id: Option<ThreadId>) {
        let previous = self.thread_id;
        self.reset();
        self.thread_id = thread_id.or(previous);
        let Some(thread_id) = self.thread_id else {
            return self.finish();
        };
        match self.ctx.api.retrieve_thread(thread_id).await {
            Ok(found) => self.apply_thread(found.thread),
            Err(err) => {
                warn!(thread_id, error = %err, "failed to retrieve thread");
                return self.finish();
            }
        }
        self.populate_dependents().await;
        self.finish();
    }

    /// Repopulates from an already fetched record.
    pub async fn rebuild_from_object(&mut self, thread: Thread) {
        self.reset();
        self.thread_id = Some(thread.thread_id);
        self.apply_thread(thread);
        self.populate_dependents().await;
        self.finish();
    }

    fn reset(&mut self) {
        self.thread = None;
        self.post = None;
        self.user = None;
        self.state = EntityState::Populating;
        self.hidden = true;

        self.main.remove_children();
        self.subject.set_text("");
        self.text.set_text("");
        self.author.set_text("");
        self.actions.remove_children();
        self.thumbnail.clear();
    }

    fn apply_thread(&mut self, thread: Thread) {
        self.subject.set_text(thread.thread_subject.as_str());
        self.main.append_child(&self.subject);
        self.thread = Some(thread);
        self.state = EntityState::Populated;
    }

    async fn populate_dependents(&mut self) {
        if self.populate_post().await {
            self.populate_image().await;
        }
        self.populate_user().await;
    }

    async fn populate_post(&mut self) -> bool {
        let Some(post_id) = self.thread.as_ref().and_then(|t| t.post_id) else {
            return false;
        };
        match self.ctx.api.retrieve_post(post_id).await {
            Ok(post) => {
                self.text.set_text(post.post_text.as_str());
                self.main.append_child(&self.text);
                self.post = Some(post);
                true
            }
            Err(err) => {
                warn!(thread_id = ?self.thread_id, post_id, error = %err, "failed to retrieve opening post");
                false
            }
        }
    }

    async fn populate_image(&mut self) {
        let Some(image_id) = self.post.as_ref().and_then(|p| p.image_id) else {
            return;
        };
        match self.ctx.api.retrieve_image(image_id).await {
            Ok(blob) => {
                self.thumbnail.assign(ObjectUrl::create(&self.ctx.blobs, blob));
                self.main.append_child(&self.thumbnail_container);
            }
            Err(err) => {
                warn!(thread_id = ?self.thread_id, image_id, error = %err, "failed to retrieve image");
            }
        }
    }

    async fn populate_user(&mut self) {
        let Some(user_id) = self.thread.as_ref().map(|t| t.user_id) else {
            return;
        };
        match self.ctx.api.retrieve_user(user_id).await {
            Ok(user) => {
                self.author.set_text(user.user_name.as_str());
                self.main.append_child(&self.author);
                self.user = Some(user);
            }
            Err(err) => {
                warn!(thread_id = ?self.thread_id, user_id, error = %err, "failed to retrieve user");
            }
        }
    }

    fn finish(&mut self) {
        if let Some(thread_id) = self.thread.as_ref().map(|t| t.thread_id) {
            self.actions.append_child(&action_button("button-show-posts", "Show posts", thread_id));
            self.actions.append_child(&action_button("button-modify-thread", "Modify", thread_id));
            self.actions.append_child(&action_button("button-delete-thread", "Delete", thread_id));
            self.main.append_child(&self.actions);
        }
        self.state = EntityState::Done;
        debug!(thread = %self, "thread rebuilt");
    }

    pub fn thread_id(&self) -> Option<ThreadId> {
        self.thread_id
    }

    pub fn thread(&self) -> Option<&Thread> {
        self.thread.as_ref()
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn has_thread(&self) -> bool {
        self.thread.is_some()
    }

    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.thumbnail.is_assigned()
    }

    pub fn has_user(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_done(&self) -> bool {
        self.state == EntityState::Done
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn thumbnail_src(&self) -> String {
        self.thumbnail.element().src()
    }

    fn facets(&self) -> Facets<'_> {
        Facets {
            has_record: self.has_thread(),
            has_image: self.has_image(),
            subject: self
                .thread
                .as_ref()
                .map_or(Facet::Missing, |t| Facet::Present(&t.thread_subject)),
            text: self
                .post
                .as_ref()
                .map_or(Facet::Missing, |p| Facet::Present(&p.post_text)),
            username: self
                .user
                .as_ref()
                .map_or(Facet::Missing, |u| Facet::Present(&u.user_name)),
        }
    }
}

#[async_trait]
impl ListEntity for ThreadView {
    const KIND: &'static str = "thread";

    async fn from_record(ctx: EntityContext, record: RawRecord) -> Result<Self, BuildError> {
        let mut view = ThreadView::new(ctx);
        match serde_json::from_value::<Thread>(record.clone()) {
            Ok(thread) => view.rebuild_from_object(thread).await,
            Err(source) => match salvage_id(&record, "thread_id") {
                Some(thread_id) => view.rebuild_from_id(Some(thread_id)).await,
                None => return Err(BuildError { kind: Self::KIND, source }),
            },
        }
        Ok(view)
    }

    fn filter_compare(&mut self, search: &str, criteria: Criteria) {
        self.hidden = !passes(&self.facets(), search, criteria);
    }

    fn is_visible(&self) -> bool {
        !self.hidden
    }

    fn main_element(&self) -> &Element {
        &self.main
    }
}

impl Sortable for ThreadView {
    fn last_modified(&self) -> Option<i64> {
        self.thread.as_ref().map(|t| t.thread_last_modified)
    }

    fn timestamp(&self) -> Option<i64> {
        self.thread.as_ref().map(|t| t.thread_timestamp)
    }

    fn subject(&self) -> Option<&str> {
        self.thread.as_ref().map(|t| t.thread_subject.as_str())
    }

    fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.user_name.as_str())
    }
}

impl fmt::Display for ThreadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let thread = self.thread.as_ref();
        let post = self.post.as_ref();
        write!(
            f,
            "[Thread] imageId: {}, postId: {}, postText: {}, threadId: {}, \
             threadLastModified: {}, threadSubject: {}, threadTimestamp: {}, userId: {}",
            OrNull(post.and_then(|p| p.image_id.as_ref())),
            OrNull(thread.and_then(|t| t.post_id.as_ref())),
            OrNull(post.map(|p| &p.post_text)),
            OrNull(self.thread_id.as_ref()),
            OrNull(thread.map(|t| &t.thread_last_modified)),
            OrNull(thread.map(|t| &t.thread_subject)),
            OrNull(thread.map(|t| &t.thread_timestamp)),
            OrNull(thread.map(|t| &t.user_id)),
        )
    }
}
