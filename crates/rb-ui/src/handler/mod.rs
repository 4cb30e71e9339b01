//! # Handlers
//!
//! A handler owns one box (or a set of filter controls) and reacts to the
//! events dispatched to it. Handlers never reach into a manager directly;
//! they go through [`ListView`](crate::manager::ListView) or a
//! [`FormAction`].

mod actions;
mod filter;
mod form;
mod show;

use async_trait::async_trait;

use crate::dom::Element;

pub use actions::{
    AddPost, AddPostHandler, AddThread, AddThreadHandler, DeletePost, DeletePostHandler,
    DeleteThread, DeleteThreadHandler, Login, LoginHandler, Logout, LogoutHandler, ModifyPost,
    ModifyPostHandler, ModifyThread, ModifyThreadHandler, Register, RegisterHandler,
};
pub use filter::{FilterElements, FilterHandler};
pub use form::{Field, FormAction, FormBox, FormHandler};
pub use show::{ListBox, ShowPostsHandler, ShowThreadsHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Submit,
    Input,
    Change,
}

/// A user interaction on one element.
#[derive(Debug, Clone)]
pub struct Event {
    pub target: Element,
    pub kind: EventKind,
}

impl Event {
    pub fn new(target: &Element, kind: EventKind) -> Self {
        Self {
            target: target.clone(),
            kind,
        }
    }

    pub fn click(target: &Element) -> Self {
        Self::new(target, EventKind::Click)
    }

    pub fn submit(target: &Element) -> Self {
        Self::new(target, EventKind::Submit)
    }

    pub fn input(target: &Element) -> Self {
        Self::new(target, EventKind::Input)
    }

    pub fn change(target: &Element) -> Self {
        Self::new(target, EventKind::Change)
    }
}

/// Listener interface shared by every handler. Events that do not concern
/// the handler are ignored.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle_event(&self, event: &Event);
}

/// Shared error area of every box.
#[derive(Debug, Clone)]
pub(crate) struct ErrorArea {
    pub container: Element,
    pub message: Element,
}

impl ErrorArea {
    pub fn new(name: &str) -> Self {
        let container = Element::with_class("div", &format!("box-error-container-{name}"));
        let message = Element::with_class("p", &format!("box-error-{name}"));
        container.append_child(&message);
        container.hide();
        Self { container, message }
    }

    pub fn set(&self, text: impl Into<String>) {
        self.message.set_text(text);
        self.container.show();
    }

    pub fn clear(&self) {
        self.container.hide();
        self.message.set_text("");
    }
}
