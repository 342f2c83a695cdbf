//! [`DrafterClient`]: [`ProjectBackend`] implementation over the backend's HTTP API.
//!
//! Plain JSON calls carry the configured request timeout. Streaming calls
//! (`/chat` and the document endpoints) have none: responses are long-lived
//! and bounded only by the connection.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::decode::{self, ChunkStream, TextStream};
use crate::document::DocumentRequest;
use crate::{
    Auxiliary, DrafterError, Message, Project, ProjectBackend, ProjectUpdate, Result, Role,
    telemetry,
};

/// HTTP client for a SpecDrafter backend.
#[derive(Clone)]
pub struct DrafterClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
}

impl DrafterClient {
    /// Create a client for `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    /// Create a client from the `[api]` configuration section.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| DrafterError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Rename a project (`PATCH /projects/{id}` with a new name).
    pub async fn rename_project(&self, project_id: &str, name: &str) -> Result<Project> {
        self.update_project(project_id, &ProjectUpdate::default().name(name))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn project_url(&self, project_id: &str, suffix: &str) -> Result<String> {
        if project_id.is_empty() || project_id.contains('/') {
            return Err(DrafterError::InvalidInput(format!(
                "invalid project id: {project_id:?}"
            )));
        }
        Ok(self.url(&format!("/projects/{project_id}{suffix}")))
    }

    /// Send a request and map non-success statuses to errors.
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let result = request.send().await;
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "operation" => operation)
            .record(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| DrafterError::Http(e.to_string()))?;
        check_status(response).await
    }

    /// Send a plain JSON request with the request timeout applied.
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self
            .send(operation, request.timeout(self.request_timeout))
            .await?;
        response
            .json()
            .await
            .map_err(|e| DrafterError::Http(e.to_string()))
    }
}

/// Map a non-success response to [`DrafterError::Api`].
///
/// The message is the JSON `detail` field when the backend sends one,
/// otherwise the body text, otherwise the status reason.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body).unwrap_or(reason);
    debug!(status = status.as_u16(), %message, "backend rejected request");

    Err(DrafterError::Api {
        status: status.as_u16(),
        message,
    })
}

fn error_detail(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return match value.get("detail")? {
            serde_json::Value::String(detail) => Some(detail.clone()),
            other => Some(other.to_string()),
        };
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<WireMessage<'a>>,
}

/// A history entry as sent to `/chat`.
///
/// An audio message with no text omits `content`; the backend then stores
/// its own placeholder for the turn.
#[derive(Serialize)]
struct WireMessage<'a> {
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(rename = "data", skip_serializing_if = "Option::is_none")]
    auxiliary: Option<&'a Auxiliary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let audio_only = message.content.is_empty()
            && message
                .auxiliary
                .as_ref()
                .is_some_and(|aux| aux.audio.is_some());
        Self {
            role: message.role,
            content: (!audio_only).then_some(message.content.as_str()),
            auxiliary: message.auxiliary.as_ref(),
            timestamp: message.timestamp.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct PrdRequest<'a> {
    target: &'a str,
}

#[derive(Serialize)]
struct EditRequest<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    audio: &'a str,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    transcript: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SpeechResponse {
    audio_content: String,
}

// =============================================================================
// ProjectBackend implementation
// =============================================================================

#[async_trait]
impl ProjectBackend for DrafterClient {
    #[instrument(skip(self), fields(operation = "get_project"))]
    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let url = self.project_url(project_id, "")?;
        self.send_json("get_project", self.http.get(url)).await
    }

    #[instrument(skip(self, messages), fields(operation = "chat", messages = messages.len()))]
    async fn chat_stream(&self, project_id: &str, messages: &[Message]) -> Result<ChunkStream> {
        let url = self.project_url(project_id, "/chat")?;
        let response = self
            .send(
                "chat",
                self.http.post(url).json(&ChatRequest {
                    messages: messages.iter().map(WireMessage::from).collect(),
                }),
            )
            .await?;

        let body = response
            .bytes_stream()
            .map(|read| read.map_err(|e| DrafterError::Stream(e.to_string())));
        Ok(Box::pin(decode::chunks(body)))
    }

    #[instrument(skip(self), fields(operation = "list_projects"))]
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.send_json("list_projects", self.http.get(self.url("/projects/")))
            .await
    }

    #[instrument(skip(self), fields(operation = "create_project"))]
    async fn create_project(&self) -> Result<Project> {
        self.send_json("create_project", self.http.post(self.url("/projects/")))
            .await
    }

    #[instrument(skip(self, update), fields(operation = "update_project"))]
    async fn update_project(&self, project_id: &str, update: &ProjectUpdate) -> Result<Project> {
        if update.is_empty() {
            return Err(DrafterError::InvalidInput("empty project update".to_string()));
        }
        let url = self.project_url(project_id, "")?;
        self.send_json("update_project", self.http.patch(url).json(update))
            .await
    }

    #[instrument(skip(self), fields(operation = "delete_project"))]
    async fn delete_project(&self, project_id: &str) -> Result<()> {
        let url = self.project_url(project_id, "")?;
        self.send(
            "delete_project",
            self.http.delete(url).timeout(self.request_timeout),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(operation = "document", kind = request.kind()))]
    async fn document_stream(
        &self,
        project_id: &str,
        request: &DocumentRequest,
    ) -> Result<TextStream> {
        let builder = match request {
            DocumentRequest::Prd { target } => self
                .http
                .post(self.project_url(project_id, "/generate-prd")?)
                .json(&PrdRequest { target }),
            DocumentRequest::Review => self.http.post(self.project_url(project_id, "/review")?),
            DocumentRequest::Edit { instruction } => self
                .http
                .post(self.project_url(project_id, "/edit-requirements")?)
                .json(&EditRequest {
                    content: instruction,
                }),
        };
        let response = self.send("document", builder).await?;

        let body = response
            .bytes_stream()
            .map(|read| read.map_err(|e| DrafterError::Stream(e.to_string())));
        Ok(Box::pin(decode::text(body)))
    }

    #[instrument(skip(self, audio_base64), fields(operation = "transcribe_audio"))]
    async fn transcribe_audio(&self, audio_base64: &str, mime_type: &str) -> Result<String> {
        let request = self
            .http
            .post(self.url("/audio/transcribe"))
            .json(&TranscribeRequest {
                audio: audio_base64,
                mime_type,
            });
        let response: TranscribeResponse = self.send_json("transcribe_audio", request).await?;
        Ok(response.transcript)
    }

    #[instrument(skip(self, text), fields(operation = "text_to_speech"))]
    async fn text_to_speech(&self, text: &str) -> Result<String> {
        let request = self
            .http
            .post(self.url("/audio/text-to-speech"))
            .json(&SpeechRequest { text });
        let response: SpeechResponse = self.send_json("text_to_speech", request).await?;
        Ok(response.audio_content)
    }
}
