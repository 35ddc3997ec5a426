//! HTTP client wrapper for the diary service.
//!
//! Every authenticated request carries the current session token as a bearer
//! credential. Failures are normalized into [`Error`]; a 401 on an
//! authenticated request tears the session down and notifies the injected
//! [`UnauthorizedHandler`] before the error reaches the caller.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::auth::{LoginRequest, LoginResponse, SessionHandle};
use crate::config::ClientConfig;
use crate::models::{DiaryEntry, DiaryId, DiaryPage, DiaryRequest};
use crate::{Error, Result};

/// Reacts to the server rejecting the session credential.
///
/// Called after the session has already been cleared.
pub trait UnauthorizedHandler: Send + Sync {
    fn on_unauthorized(&self);
}

/// Raw export download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// No bearer token; 401 is an ordinary failure (login).
    Public,
    Authenticated,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    page_size: u32,
    client: Client,
    session: SessionHandle,
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionHandle) -> Result<Self> {
        let base_url = crate::config::normalize_base_url(&config.api_base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url,
            page_size: config.page_size,
            client,
            session,
            on_unauthorized: None,
        })
    }

    #[must_use]
    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let builder = self.client.post(self.url("/auth/login")).json(request);
        self.send_json(builder, Access::Public).await
    }

    pub async fn list_diaries(&self, page: u32, size: u32) -> Result<DiaryPage> {
        let builder = self
            .client
            .get(self.url("/diaries"))
            .query(&[("page", page), ("size", size)]);
        self.send_json(builder, Access::Authenticated).await
    }

    pub async fn get_diary(&self, id: DiaryId) -> Result<DiaryEntry> {
        let builder = self.client.get(self.url(&format!("/diaries/{id}")));
        self.send_json(builder, Access::Authenticated).await
    }

    pub async fn create_diary(&self, request: &DiaryRequest) -> Result<DiaryEntry> {
        let builder = self.client.post(self.url("/diaries")).json(request);
        self.send_json(builder, Access::Authenticated).await
    }

    pub async fn update_diary(&self, id: DiaryId, request: &DiaryRequest) -> Result<DiaryEntry> {
        let builder = self
            .client
            .put(self.url(&format!("/diaries/{id}")))
            .json(request);
        self.send_json(builder, Access::Authenticated).await
    }

    pub async fn delete_diary(&self, id: DiaryId) -> Result<()> {
        let builder = self.client.delete(self.url(&format!("/diaries/{id}")));
        self.send(builder, Access::Authenticated).await?;
        Ok(())
    }

    pub async fn search_diaries(&self, keyword: &str, page: u32, size: u32) -> Result<DiaryPage> {
        let builder = self.client.get(self.url("/diaries/search")).query(&[
            ("keyword", keyword.to_string()),
            ("page", page.to_string()),
            ("size", size.to_string()),
        ]);
        self.send_json(builder, Access::Authenticated).await
    }

    pub async fn export_diaries(&self) -> Result<ExportPayload> {
        let builder = self.client.get(self.url("/diaries/export"));
        let response = self.send(builder, Access::Authenticated).await?;
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let bytes = response.bytes().await?;
        Ok(ExportPayload {
            bytes: bytes.to_vec(),
            content_disposition,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        access: Access,
    ) -> Result<T> {
        let response = self.send(builder, access).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send(&self, builder: RequestBuilder, access: Access) -> Result<Response> {
        let builder = match (access, self.session.token()) {
            (Access::Authenticated, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);

        if status == StatusCode::UNAUTHORIZED && access == Access::Authenticated {
            self.handle_unauthorized();
            return Err(Error::Unauthorized(message));
        }

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("Session rejected by server; signing out");
        if let Err(error) = self.session.clear() {
            tracing::warn!("Failed to clear persisted session: {}", error);
        }
        if let Some(handler) = &self.on_unauthorized {
            handler.on_unauthorized();
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

const MAX_ERROR_CHARS: usize = 180;

/// Server message if the payload carries one, otherwise the status line.
fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.error)
            .map(|message| message.trim().chars().take(MAX_ERROR_CHARS).collect::<String>())
            .filter(|message| !message.is_empty())
        {
            return message;
        }
    }

    format!("Request failed with status code {}", status.as_u16())
}
