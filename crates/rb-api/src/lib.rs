//! # rb-api
//!
//! REST implementation of the `ImageboardApi` port.
//!
//! Every call maps to one fixed path under `/api`. JSON bodies are decoded and
//! interpreted by [`response`]; image endpoints sniff the content type to
//! tell binary data from an error record.

pub mod response;

use std::time::Duration;

use async_trait::async_trait;
use rb_core::error::{ApiError, ApiResult};
use rb_core::models::{
    Blob, ImageFile, ImageId, Post, PostDraft, PostId, RawRecord, SessionCredential, Settings,
    ThreadAndPosts, ThreadDraft, ThreadId, User, UserId,
};
use rb_core::traits::ImageboardApi;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use response::{interpret, interpret_binary, interpret_optional};

const ACCEPT_JSON: &str = "application/json";
const ACCEPT_IMAGE: &str = "image/*, application/json";

/// REST client for one backend.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    /// Scheme, host and port, without a trailing slash.
    base_url: String,
}

impl HttpApi {
    /// Builds a client with a per-request timeout and a cookie jar, since the
    /// backend keeps the session in a cookie.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        interpret(self.body(request).await?)
    }

    async fn json_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<Option<T>> {
        interpret_optional(self.body(request).await?)
    }

    /// Sends the request and decodes the JSON body whatever the HTTP status:
    /// errors travel in the body, not in the status line.
    async fn body(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(transport)?;
        tracing::debug!(url = %response.url(), status = %response.status(), "API response");
        response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn binary(&self, path: &str) -> ApiResult<Blob> {
        let response = self
            .client
            .get(self.url(path))
            .header(ACCEPT, ACCEPT_IMAGE)
            .send()
            .await
            .map_err(transport)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.bytes().await.map_err(transport)?;
        interpret_binary(content_type.as_deref(), bytes)
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    tracing::warn!(error = %err, "API request failed");
    ApiError::Transport(err.to_string())
}

#[async_trait]
impl ImageboardApi for HttpApi {
    async fn register(&self, credential: &SessionCredential) -> ApiResult<UserId> {
        self.json(self.client.post(self.url("/api/users")).json(&credential.to_body()))
            .await
    }

    async fn login(&self, credential: &SessionCredential) -> ApiResult<UserId> {
        self.json(self.client.post(self.url("/api/login")).json(&credential.to_body()))
            .await
    }

    async fn logout(&self) -> ApiResult<UserId> {
        self.json(self.client.post(self.url("/api/logout")).json(&Value::Null))
            .await
    }

    async fn get_settings(&self) -> ApiResult<Option<Settings>> {
        self.json_optional(self.client.get(self.url("/api/cookie/settings")))
            .await
    }

    async fn set_settings(&self, settings: &Settings) -> ApiResult<Option<Settings>> {
        self.json_optional(self.client.post(self.url("/api/cookie/settings")).json(settings))
            .await
    }

    async fn retrieve_user(&self, user_id: UserId) -> ApiResult<User> {
        self.json(self.client.get(self.url(&format!("/api/users/{user_id}"))))
            .await
    }

    async fn insert_image(&self, image: &ImageFile) -> ApiResult<ImageId> {
        let part = multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(image.mime.as_ref())
            .map_err(transport)?;
        // The multipart boundary is set by reqwest; no explicit content type.
        let form = multipart::Form::new().part("file", part);
        self.json(self.client.post(self.url("/api/images")).multipart(form))
            .await
    }

    async fn retrieve_image(&self, image_id: ImageId) -> ApiResult<Blob> {
        self.binary(&format!("/api/images/{image_id}")).await
    }

    async fn retrieve_thumbnail(&self, image_id: ImageId) -> ApiResult<Blob> {
        self.binary(&format!("/api/thumbnails/{image_id}")).await
    }

    async fn insert_thread(&self, draft: &ThreadDraft) -> ApiResult<ThreadId> {
        self.json(self.client.post(self.url("/api/threads")).json(draft))
            .await
    }

    async fn update_thread(&self, thread_id: ThreadId, draft: &ThreadDraft) -> ApiResult<ThreadId> {
        self.json(
            self.client
                .put(self.url(&format!("/api/threads/{thread_id}")))
                .json(draft),
        )
        .await
    }

    async fn delete_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadId> {
        self.json(
            self.client
                .delete(self.url(&format!("/api/threads/{thread_id}")))
                .json(&Value::Null),
        )
        .await
    }

    async fn retrieve_thread(&self, thread_id: ThreadId) -> ApiResult<ThreadAndPosts> {
        self.json(self.client.get(self.url(&format!("/api/threads/{thread_id}"))))
            .await
    }

    async fn retrieve_threads(&self) -> ApiResult<Vec<RawRecord>> {
        self.json(self.client.get(self.url("/api/threads"))).await
    }

    async fn insert_post(&self, thread_id: ThreadId, draft: &PostDraft) -> ApiResult<PostId> {
        self.json(
            self.client
                .post(self.url(&format!("/api/threads/{thread_id}/posts")))
                .json(draft),
        )
        .await
    }

    async fn update_post(&self, post_id: PostId, draft: &PostDraft) -> ApiResult<PostId> {
        self.json(
            self.client
                .put(self.url(&format!("/api/posts/{post_id}")))
                .json(draft),
        )
        .await
    }

    async fn delete_post(&self, post_id: PostId) -> ApiResult<PostId> {
        self.json(
            self.client
                .delete(self.url(&format!("/api/posts/{post_id}")))
                .json(&Value::Null),
        )
        .await
    }

    async fn retrieve_post(&self, post_id: PostId) -> ApiResult<Post> {
        self.json(self.client.get(self.url(&format!("/api/posts/{post_id}"))))
            .await
    }

    async fn retrieve_posts(&self, thread_id: ThreadId) -> ApiResult<Vec<RawRecord>> {
        self.json(self.client.get(self.url(&format!("/api/threads/{thread_id}/posts"))))
            .await
    }
}
