use std::fmt;

use async_trait::async_trait;
use rb_core::models::{Post, PostId, RawRecord, User};
use tracing::{debug, warn};

use super::{action_button, salvage_id, BuildError, EntityContext, EntityState, ListEntity, OrNull};
use crate::dom::Element;
use crate::filter::{passes, Criteria, Facet, Facets, Sortable};
use crate::object_url::{ImageSlot, ObjectUrl};

/// A post in a thread's post list.
#[derive(Debug)]
pub struct PostView {
    ctx: EntityContext,
    main: Element,
    text: Element,
    thumbnail_container: Element,
    thumbnail: ImageSlot,
    author: Element,
    actions: Element,
    post_id: Option<PostId>,
    post: Option<Post>,
    user: Option<User>,
    state: EntityState,
    hidden: bool,
}

impl PostView {
    pub fn new(ctx: EntityContext) -> Self {
        let thumbnail_container = Element::with_class("div", "thumbnail-container");
        let thumbnail = ImageSlot::new(Element::with_class("img", "thumbnail"));
        thumbnail_container.append_child(thumbnail.element());
        Self {
            ctx,
            main: Element::with_class("div", "post"),
            text: Element::with_class("div", "post-text"),
            thumbnail_container,
            thumbnail,
            author: Element::with_class("div", "post-user"),
            actions: Element::with_class("div", "post-actions"),
            post_id: None,
            post: None,
            user: None,
            state: EntityState::Empty,
            hidden: true,
        }
    }

    /// Fetches the post and repopulates. `None` reuses the current id.
    pub async fn rebuild_from_id(&mut self, post_id: Option<PostId>) {
        let previous = self.post_id;
        self.reset();
        self.post_id = post_id.or(previous);
        let Some(post_id) = self.post_id else {
            return self.finish();
        };
        match self.ctx.api.retrieve_post(post_id).await {
            Ok(post) => self.apply_post(post),
            Err(err) => {
                warn!(post_id, error = %err, "failed to retrieve post");
                return self.finish();
            }
        }
        self.populate_dependents().await;
        self.finish();
    }

    /// Repopulates from an already fetched record.
    pub async fn rebuild_from_object(&mut self, post: Post) {
        self.reset();
        self.post_id = Some(post.post_id);
        self.apply_post(post);
        self.populate_dependents().await;
        self.finish();
    }

    fn reset(&mut self) {
        self.post = None;
        self.user = None;
        self.state = EntityState::Populating;
        self.hidden = true;

        self.main.remove_children();
        self.text.set_text("");
        self.author.set_text("");
        self.actions.remove_children();
        self.thumbnail.clear();
    }

    fn apply_post(&mut self, post: Post) {
        self.text.set_text(post.post_text.as_str());
        self.main.append_child(&self.text);
        self.post = Some(post);
        self.state = EntityState::Populated;
    }

    async fn populate_dependents(&mut self) {
        self.populate_image().await;
        self.populate_user().await;
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
            Err(err) => warn!(post_id = ?self.post_id, image_id, error = %err, "failed to retrieve image"),
        }
    }

    async fn populate_user(&mut self) {
        let Some(user_id) = self.post.as_ref().map(|p| p.user_id) else {
            return;
        };
        match self.ctx.api.retrieve_user(user_id).await {
            Ok(user) => {
                self.author.set_text(user.user_name.as_str());
                self.main.append_child(&self.author);
                self.user = Some(user);
            }
            Err(err) => warn!(post_id = ?self.post_id, user_id, error = %err, "failed to retrieve user"),
        }
    }

    fn finish(&mut self) {
        if let Some(post_id) = self.post.as_ref().map(|p| p.post_id) {
            self.actions.append_child(&action_button("button-modify-post", "Modify", post_id));
            self.actions.append_child(&action_button("button-delete-post", "Delete", post_id));
            self.main.append_child(&self.actions);
        }
        self.state = EntityState::Done;
        debug!(post = %self, "post rebuilt");
    }

    pub fn post_id(&self) -> Option<PostId> {
        self.post_id
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
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
            has_record: self.has_post(),
            has_image: self.has_image(),
            // Posts have no subject.
            subject: Facet::NotApplicable,
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
impl ListEntity for PostView {
    const KIND: &'static str = "post";

    async fn from_record(ctx: EntityContext, record: RawRecord) -> Result<Self, BuildError> {
        let mut view = PostView::new(ctx);
        match serde_json::from_value::<Post>(record.clone()) {
            Ok(post) => view.rebuild_from_object(post).await,
            Err(source) => match salvage_id(&record, "post_id") {
                Some(post_id) => view.rebuild_from_id(Some(post_id)).await,
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

impl Sortable for PostView {
    fn last_modified(&self) -> Option<i64> {
        self.post.as_ref().map(|p| p.post_last_modified)
    }

    fn timestamp(&self) -> Option<i64> {
        self.post.as_ref().map(|p| p.post_timestamp)
    }

    fn subject(&self) -> Option<&str> {
        None
    }

    fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.user_name.as_str())
    }
}

impl fmt::Display for PostView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let post = self.post.as_ref();
        write!(
            f,
            "[Post] imageId: {}, postId: {}, postLastModified: {}, postText: {}, \
             postTimestamp: {}, threadId: {}, userId: {}",
            OrNull(post.and_then(|p| p.image_id.as_ref())),
            OrNull(self.post_id.as_ref()),
            OrNull(post.map(|p| &p.post_last_modified)),
            OrNull(post.map(|p| &p.post_text)),
            OrNull(post.map(|p| &p.post_timestamp)),
            OrNull(post.map(|p| &p.thread_id)),
            OrNull(post.map(|p| &p.user_id)),
        )
    }
}
