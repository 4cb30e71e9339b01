//! # List Managers
//!
//! A [`ListManager`] owns the entities of one list (all threads, or the posts
//! of one thread) and renders the visible ones into an injected container.
//!
//! Pipeline: `reload_list` -> `sort_list` -> `filter_list` -> render.
//! Every reload takes a new generation number; a reload that finishes after a
//! newer one started throws its results away. Managers rendering into the same
//! container share one counter, so this holds across them too.

mod posts;
mod threads;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::future::join_all;
use rb_core::error::{ApiResult, AppError};
use rb_core::models::RawRecord;
use rb_core::traits::ImageboardApi;
use tracing::{debug, warn};

use crate::dom::Element;
use crate::entity::{EntityContext, ListEntity};
use crate::filter::{sort_by_criteria, SharedFilter};

pub use posts::{ActivePosts, PostsManager, PostsScope};
pub use threads::{ThreadsManager, ThreadsScope};

/// Which records a list shows.
#[async_trait]
pub trait ListScope: Send + Sync + 'static {
    type Entity: ListEntity;

    async fn fetch(&self, api: &dyn ImageboardApi) -> ApiResult<Vec<RawRecord>>;
}

/// Result of a successful reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// The list now shows this many entities (visible or not).
    Applied(usize),
    /// A newer reload started first; nothing was changed.
    Superseded,
}

/// What filter and show handlers need from a list.
#[async_trait]
pub trait ListView: Send + Sync {
    async fn reload_list(&self) -> Result<Reload, AppError>;
    fn sort_list(&self);
    fn filter_list(&self);
}

pub struct ListManager<S: ListScope> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: ListScope> {
    scope: S,
    ctx: EntityContext,
    filter: SharedFilter,
    container: Element,
    entities: Mutex<Vec<S::Entity>>,
    generation: Arc<AtomicU64>,
}

impl<S: ListScope> Clone for ListManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ListScope> ListManager<S> {
    pub fn new(scope: S, ctx: EntityContext, filter: SharedFilter, container: Element) -> Self {
        Self::with_generation(scope, ctx, filter, container, Arc::default())
    }

    /// Like [`ListManager::new`], but reloads are numbered by `generation`,
    /// which other managers of the same container may share.
    pub fn with_generation(
        scope: S,
        ctx: EntityContext,
        filter: SharedFilter,
        container: Element,
        generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                scope,
                ctx,
                filter,
                container,
                entities: Mutex::new(Vec::new()),
                generation,
            }),
        }
    }

    pub fn scope(&self) -> &S {
        &self.inner.scope
    }

    pub fn api(&self) -> &dyn ImageboardApi {
        self.inner.ctx.api.as_ref()
    }

    pub fn container(&self) -> &Element {
        &self.inner.container
    }

    fn entities(&self) -> MutexGuard<'_, Vec<S::Entity>> {
        self.inner
            .entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    /// Refetches every record of the scope and rebuilds the list.
    ///
    /// Records that cannot become an entity are logged and skipped. A fetch
    /// failure empties the list.
    pub async fn reload_list(&self) -> Result<Reload, AppError> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let kind = S::Entity::KIND;
        debug!(kind, generation, "reload list");

        let records = match self.inner.scope.fetch(self.api()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(kind, generation, error = %err, "failed to retrieve list");
                if self.is_current(generation) {
                    self.entities().clear();
                    self.show(&[]);
                }
                return Err(err.into());
            }
        };

        let built = join_all(
            records
                .into_iter()
                .map(|record| S::Entity::from_record(self.inner.ctx.clone(), record)),
        )
        .await;

        let mut entities = Vec::with_capacity(built.len());
        for result in built {
            match result {
                Ok(entity) => entities.push(entity),
                Err(err) => warn!(kind, generation, error = %err, "skipping record"),
            }
        }

        if !self.is_current(generation) {
            debug!(kind, generation, "discarding superseded reload");
            return Ok(Reload::Superseded);
        }

        let count = entities.len();
        let mut guard = self.entities();
        *guard = entities;
        self.sort_locked(&mut guard);
        Ok(Reload::Applied(count))
    }

    /// Orders the list by the active criteria, then filters and renders.
    pub fn sort_list(&self) {
        let mut guard = self.entities();
        self.sort_locked(&mut guard);
    }

    /// Re-evaluates visibility, then renders.
    pub fn filter_list(&self) {
        let mut guard = self.entities();
        self.filter_locked(&mut guard);
    }

    fn sort_locked(&self, entities: &mut [S::Entity]) {
        let state = self.inner.filter.get();
        debug!(kind = S::Entity::KIND, criteria = %state.criteria, sort_order = state.sort_order, "sort list");
        sort_by_criteria(entities, state.criteria, state.sort_order);
        self.filter_locked(entities);
    }

    fn filter_locked(&self, entities: &mut [S::Entity]) {
        let state = self.inner.filter.get();
        debug!(kind = S::Entity::KIND, search = %state.search, criteria = %state.criteria, "filter list");
        for entity in entities.iter_mut() {
            entity.filter_compare(&state.search, state.criteria);
        }
        self.show(entities);
    }

    /// Replaces the container's children with the visible entities, in order.
    fn show(&self, entities: &[S::Entity]) {
        let container = &self.inner.container;
        container.remove_children();
        for entity in entities.iter().filter(|e| e.is_visible()) {
            container.append_child(entity.main_element());
        }
        debug!(kind = S::Entity::KIND, shown = container.child_count(), "show list");
    }

    /// Number of entities held, visible or not.
    pub fn len(&self) -> usize {
        self.entities().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls `f` on each entity in list order.
    pub fn for_each(&self, mut f: impl FnMut(&S::Entity)) {
        for entity in self.entities().iter() {
            f(entity);
        }
    }

    /// One line per entity.
    pub fn to_human_readable(&self) -> String {
        let mut lines = Vec::new();
        self.for_each(|entity| lines.push(entity.to_string()));
        lines.join("\n")
    }

    /// Reloads after a successful mutation. The mutation already succeeded,
    /// so a failed reload is only logged.
    async fn refresh(&self) {
        if let Err(err) = self.reload_list().await {
            warn!(kind = S::Entity::KIND, error = %err, "reload after mutation failed");
        }
    }
}

#[async_trait]
impl<S: ListScope> ListView for ListManager<S> {
    async fn reload_list(&self) -> Result<Reload, AppError> {
        ListManager::reload_list(self).await
    }

    fn sort_list(&self) {
        ListManager::sort_list(self)
    }

    fn filter_list(&self) {
        ListManager::filter_list(self)
    }
}
