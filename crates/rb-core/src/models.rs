//! # Domain Models
//!
//! These structs mirror the JSON records exchanged with the imageboard backend.
//! Field names follow the wire format so they (de)serialize without renames.

use std::fmt;

use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

pub type UserId = i64;
pub type ThreadId = i64;
pub type PostId = i64;
pub type ImageId = i64;

/// A list endpoint element before it has been checked against its record type.
///
/// List responses are decoded per element so one malformed record only costs
/// that record, not the whole list.
pub type RawRecord = serde_json::Value;

/// Top-level discussion unit with a subject and an opening post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: ThreadId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub thread_subject: String,
    pub thread_timestamp: i64,
    pub thread_last_modified: i64,
    pub user_id: UserId,
    /// Opening post, if the backend created one.
    #[serde(default)]
    pub post_id: Option<PostId>,
}

/// A reply (or the opening post) within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub thread_id: ThreadId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_text: String,
    pub post_timestamp: i64,
    pub post_last_modified: i64,
    pub user_id: UserId,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

/// Read-only author record, fetched for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub user_group: Option<i64>,
    pub user_timestamp: i64,
}

/// Response of `GET /api/threads/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadAndPosts {
    pub thread: Thread,
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Server-side persisted list preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "filter-criteria", default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<String>,
    #[serde(rename = "filter-sort-order", default, skip_serializing_if = "Option::is_none")]
    pub filter_sort_order: Option<bool>,
}

/// Body of thread create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadDraft {
    pub thread_subject: String,
    pub post_text: String,
    pub image_id: Option<ImageId>,
}

/// Body of post create/update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDraft {
    pub post_text: String,
    pub image_id: Option<ImageId>,
}

/// A file chosen by the user for upload. Never decoded client-side.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: mime::Mime,
    pub bytes: Bytes,
}

/// Binary body returned by the image and thumbnail endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub mime: mime::Mime,
    pub bytes: Bytes,
}

impl From<ImageFile> for Blob {
    fn from(file: ImageFile) -> Self {
        Self { mime: file.mime, bytes: file.bytes }
    }
}

/// Username/password pair that only lives for one login or register call.
pub struct SessionCredential {
    pub username: String,
    pub password: SecretString,
}

impl SessionCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// JSON body for the login and register endpoints.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl fmt::Display for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SessionCredential] username: \"{}\", password: \"[redacted]\"", self.username)
    }
}

/// The backend sends `null` for text columns that were never filled in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
