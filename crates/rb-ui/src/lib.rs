//! Headless imageboard client.
//!
//! Builds the board's view-models (threads, posts, boxes, filter) on an
//! in-memory element tree. All backend access goes through
//! [`rb_core::traits::ImageboardApi`] and all object URLs through
//! [`rb_core::traits::BlobStore`].

pub mod board;
pub mod dom;
pub mod entity;
pub mod filter;
pub mod handler;
pub mod manager;
pub mod object_url;
pub mod session;

pub use board::{Forms, Imageboard, Page};
pub use dom::Element;
pub use entity::{EntityContext, EntityState, ListEntity, PostView, ThreadView};
pub use filter::{Criteria, FilterState, SharedFilter};
pub use handler::{Event, EventKind, Handler};
pub use manager::{ActivePosts, ListView, PostsManager, Reload, ThreadsManager};
pub use object_url::{ImageSlot, ObjectUrl};
pub use session::SessionManager;
