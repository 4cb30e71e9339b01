use std::sync::Arc;

use async_trait::async_trait;
use rb_core::error::AppError;
use tracing::warn;

use super::{ErrorArea, Event, EventKind, Handler};
use crate::dom::Element;
use crate::entity::EntityContext;
use crate::filter::SharedFilter;
use crate::manager::{ActivePosts, ListView, Reload};

/// A hideable box around a rendered list.
#[derive(Debug, Clone)]
pub struct ListBox {
    name: &'static str,
    main: Element,
    list: Element,
    error: ErrorArea,
    cancel: Element,
}

impl ListBox {
    pub fn new(name: &'static str) -> Self {
        let main = Element::with_class("div", &format!("box-main-{name}"));
        let error = ErrorArea::new(name);
        let cancel = Element::with_class("button", &format!("box-button-cancel-{name}"));
        cancel.set_text("Cancel");
        let list = Element::with_class("div", &format!("box-list-{name}"));
        main.append_child(&error.container);
        main.append_child(&cancel);
        main.append_child(&list);
        main.hide();
        Self {
            name,
            main,
            list,
            error,
            cancel,
        }
    }

    pub fn main(&self) -> &Element {
        &self.main
    }

    /// Container the list manager renders into.
    pub fn list(&self) -> &Element {
        &self.list
    }

    pub fn cancel_button(&self) -> &Element {
        &self.cancel
    }

    pub fn error_text(&self) -> String {
        self.error.message.text()
    }

    pub fn create_button(&self, label: &str) -> Element {
        let button = Element::with_class("button", &format!("box-button-start-{}", self.name));
        button.set_text(label);
        button
    }

    fn open(&self) {
        self.error.clear();
        self.main.show();
    }

    fn report(&self, result: &Result<Reload, AppError>) {
        if let Err(err) = result {
            warn!(list = self.name, error = %err, "failed to show list");
            self.error.set(err.status().to_string());
        }
    }
}

/// Opens the thread list and reloads it.
pub struct ShowThreadsHandler {
    list_box: ListBox,
    threads: Arc<dyn ListView>,
}

impl ShowThreadsHandler {
    pub const START_CLASS: &'static str = "box-button-start-show-threads";

    pub fn new(list_box: ListBox, threads: Arc<dyn ListView>) -> Self {
        Self { list_box, threads }
    }

    pub fn list_box(&self) -> &ListBox {
        &self.list_box
    }

    pub async fn show(&self) -> Result<Reload, AppError> {
        self.list_box.open();
        let result = self.threads.reload_list().await;
        self.list_box.report(&result);
        result
    }
}

#[async_trait]
impl Handler for ShowThreadsHandler {
    async fn handle_event(&self, event: &Event) {
        if event.kind != EventKind::Click {
            return;
        }
        if event.target.has_class(Self::START_CLASS) {
            let _ = self.show().await;
        } else if event.target.ptr_eq(self.list_box.cancel_button()) {
            self.list_box.main().hide();
        }
    }
}

/// Opens the posts of the thread a "show posts" button targets.
pub struct ShowPostsHandler {
    list_box: ListBox,
    ctx: EntityContext,
    filter: SharedFilter,
    active: ActivePosts,
}

impl ShowPostsHandler {
    pub const START_CLASS: &'static str = "button-show-posts";

    pub fn new(list_box: ListBox, ctx: EntityContext, filter: SharedFilter, active: ActivePosts) -> Self {
        Self {
            list_box,
            ctx,
            filter,
            active,
        }
    }

    pub fn list_box(&self) -> &ListBox {
        &self.list_box
    }

    /// Makes the posts of `thread_id` the active list and loads it.
    pub async fn show(&self, thread_id: Option<i64>) -> Result<Reload, AppError> {
        self.list_box.open();
        let result = match thread_id {
            Some(thread_id) => {
                let manager = self.active.open(
                    thread_id,
                    self.ctx.clone(),
                    self.filter.clone(),
                    self.list_box.list().clone(),
                );
                manager.reload_list().await
            }
            None => Err(AppError::MissingIdentifier("thread id")),
        };
        self.list_box.report(&result);
        result
    }
}

#[async_trait]
impl Handler for ShowPostsHandler {
    async fn handle_event(&self, event: &Event) {
        if event.kind != EventKind::Click {
            return;
        }
        if event.target.has_class(Self::START_CLASS) {
            let _ = self.show(event.target.data_target()).await;
        } else if event.target.ptr_eq(self.list_box.cancel_button()) {
            self.list_box.main().hide();
        }
    }
}
