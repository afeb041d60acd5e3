//! Task service seam.
//!
//! [`TaskApi`] is what the board talks to. [`HttpTaskApi`] speaks the JSON
//! contract of `taskdeck-server`; tests plug in an in-process adapter.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use taskdeck_shared::{
    ChatsDto, ErrorDto, SendMessageArgs, SendMessageResult, SuccessDto, TaskCreate, TaskDto,
    TaskIdArg, TaskPatch, TaskUpdateArgs,
};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait TaskApi {
    async fn list(&self) -> Result<Vec<TaskDto>, ApiError>;

    async fn create(&self, create: TaskCreate) -> Result<TaskDto, ApiError>;

    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    endpoint: String,
}

impl HttpTaskApi {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    #[instrument(skip(self))]
    pub async fn list_chats(&self) -> Result<ChatsDto, ApiError> {
        let response = self.client.get(self.url("/api/inbox")).send().await?;
        Ok(check(response).await?.json().await?)
    }

    #[instrument(skip(self, message))]
    pub async fn send_message(
        &self,
        chat_id: u64,
        message: impl Into<String>,
    ) -> Result<SendMessageResult, ApiError> {
        let args = SendMessageArgs {
            chat_id: Some(chat_id),
            message: Some(message.into()),
        };
        let response = self
            .client
            .post(self.url("/api/inbox"))
            .json(&args)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize>(
        &self,
        method: reqwest::Method,
        body: &B,
    ) -> Result<Response, ApiError> {
        let response = self
            .client
            .request(method, self.url("/api/tasks"))
            .json(body)
            .send()
            .await?;
        check(response).await
    }
}

impl TaskApi for HttpTaskApi {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<TaskDto>, ApiError> {
        let response = self.client.get(self.url("/api/tasks")).send().await?;
        let tasks: Vec<TaskDto> = check(response).await?.json().await?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, create))]
    async fn create(&self, create: TaskCreate) -> Result<TaskDto, ApiError> {
        let response = self.send_json(reqwest::Method::POST, &create).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: TaskPatch) -> Result<(), ApiError> {
        let response = self
            .send_json(reqwest::Method::PUT, &TaskUpdateArgs::new(id, patch))
            .await?;
        expect_success(response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .send_json(reqwest::Method::DELETE, &TaskIdArg::new(id))
            .await?;
        expect_success(response).await
    }
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorDto>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn expect_success(response: Response) -> Result<(), ApiError> {
    let body: SuccessDto = response.json().await?;
    if body.success {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: StatusCode::OK.as_u16(),
            message: "server reported failure".to_string(),
        })
    }
}
