use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::{
    BoardApi, ByteStream, ChatMessageRequest, CreateTaskRequest, StreamRequest, StreamSource,
    TaskUpdate,
};
use crate::board::merge::Patch;
use crate::board::models::{ApprovalStatus, BoardChatMessage, BoardSnapshot, TaskComment};
use crate::errors::ApiError;

const EVENT_STREAM: &str = "text/event-stream";

/// Paginated list envelope.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// HTTP client for one Mission Control deployment.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// `token == None` builds a signed-out client: every call fails with
    /// [`ApiError::NotSignedIn`] before touching the network.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NotSignedIn)?;
        Ok(builder.bearer_auth(token))
    }

    /// Send and require exactly `200 OK`.
    async fn send(&self, what: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                what: what.to_string(),
                source,
            })?;
        let status = response.status();
        debug!(what, status = status.as_u16(), "API response");
        if status != StatusCode::OK {
            return Err(ApiError::UnexpectedStatus {
                what: what.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        what: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        self.send(what, builder)
            .await?
            .json()
            .await
            .map_err(|source| ApiError::Decode {
                what: what.to_string(),
                source,
            })
    }

    fn board_path(board_id: &str, rest: &str) -> String {
        format!("/api/v1/boards/{board_id}{rest}")
    }
}

#[async_trait]
impl BoardApi for ApiClient {
    async fn snapshot(&self, board_id: &str) -> Result<BoardSnapshot, ApiError> {
        let url = self.url(&Self::board_path(board_id, "/snapshot"));
        self.send_json("board snapshot", self.http.get(url)).await
    }

    async fn create_task(
        &self,
        board_id: &str,
        request: &CreateTaskRequest,
    ) -> Result<Patch, ApiError> {
        let url = self.url(&Self::board_path(board_id, "/tasks"));
        self.send_json("task create", self.http.post(url).json(request)).await
    }

    async fn update_task(
        &self,
        board_id: &str,
        task_id: &str,
        update: &TaskUpdate,
    ) -> Result<Patch, ApiError> {
        let url = self.url(&Self::board_path(board_id, &format!("/tasks/{task_id}")));
        self.send_json("task update", self.http.patch(url).json(update)).await
    }

    async fn delete_task(&self, board_id: &str, task_id: &str) -> Result<(), ApiError> {
        let url = self.url(&Self::board_path(board_id, &format!("/tasks/{task_id}")));
        self.send("task delete", self.http.delete(url)).await?;
        Ok(())
    }

    async fn list_comments(
        &self,
        board_id: &str,
        task_id: &str,
    ) -> Result<Vec<TaskComment>, ApiError> {
        let url = self.url(&Self::board_path(board_id, &format!("/tasks/{task_id}/comments")));
        let page: Page<TaskComment> = self.send_json("task comments", self.http.get(url)).await?;
        Ok(page.items)
    }

    async fn create_comment(
        &self,
        board_id: &str,
        task_id: &str,
        message: &str,
    ) -> Result<TaskComment, ApiError> {
        let url = self.url(&Self::board_path(board_id, &format!("/tasks/{task_id}/comments")));
        let body = json!({ "message": message });
        self.send_json("task comment", self.http.post(url).json(&body)).await
    }

    async fn decide_approval(
        &self,
        board_id: &str,
        approval_id: &str,
        status: ApprovalStatus,
    ) -> Result<Patch, ApiError> {
        let url = self.url(&Self::board_path(board_id, &format!("/approvals/{approval_id}")));
        let body = json!({ "status": status });
        self.send_json("approval update", self.http.patch(url).json(&body)).await
    }

    async fn send_chat(
        &self,
        board_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<BoardChatMessage, ApiError> {
        let url = self.url(&Self::board_path(board_id, "/memory"));
        self.send_json("board chat", self.http.post(url).json(request)).await
    }
}

#[async_trait]
impl StreamSource for ApiClient {
    async fn open(
        &self,
        request: &StreamRequest,
        since: Option<&str>,
    ) -> Result<ByteStream, ApiError> {
        let what = request.path.clone();
        let builder = self
            .http
            .get(self.url(&request.path))
            .header(ACCEPT, EVENT_STREAM)
            .query(&request.query_with_since(since));
        let response = self.send(&what, builder).await?;
        let body = response.bytes_stream().map(move |chunk| {
            chunk.map(|bytes| bytes.to_vec()).map_err(|source| ApiError::Transport {
                what: what.clone(),
                source,
            })
        });
        Ok(body.boxed())
    }

    fn is_signed_in(&self) -> bool {
        ApiClient::is_signed_in(self)
    }
}
