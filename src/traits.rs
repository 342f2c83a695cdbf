//! Core ProjectBackend trait

use async_trait::async_trait;

use crate::decode::{ChunkStream, TextStream};
use crate::document::DocumentRequest;
use crate::{DrafterError, Message, Project, ProjectUpdate, Result};

/// Everything the client needs from a SpecDrafter backend.
///
/// [`DrafterClient`](crate::DrafterClient) implements it over HTTP. The
/// conversation and document layers only depend on this trait, so tests
/// and alternative transports can stand in for the server.
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    // ===== Chat (must implement) =====

    /// Fetch the canonical project snapshot.
    async fn get_project(&self, project_id: &str) -> Result<Project>;

    /// Open a chat stream for `messages` (the full history, newest last).
    ///
    /// Fails before any chunk when the request is rejected.
    async fn chat_stream(&self, project_id: &str, messages: &[Message]) -> Result<ChunkStream>;

    // ===== Projects =====

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Err(DrafterError::NotImplemented("list_projects"))
    }

    async fn create_project(&self) -> Result<Project> {
        Err(DrafterError::NotImplemented("create_project"))
    }

    async fn update_project(&self, _project_id: &str, _update: &ProjectUpdate) -> Result<Project> {
        Err(DrafterError::NotImplemented("update_project"))
    }

    async fn delete_project(&self, _project_id: &str) -> Result<()> {
        Err(DrafterError::NotImplemented("delete_project"))
    }

    // ===== Documents =====

    /// Open a raw document stream (PRD, review, or requirements edit).
    async fn document_stream(
        &self,
        _project_id: &str,
        _request: &DocumentRequest,
    ) -> Result<TextStream> {
        Err(DrafterError::NotImplemented("document_stream"))
    }

    // ===== Audio =====

    /// Transcribe base64-encoded audio to text.
    async fn transcribe_audio(&self, _audio_base64: &str, _mime_type: &str) -> Result<String> {
        Err(DrafterError::NotImplemented("transcribe_audio"))
    }

    /// Synthesize speech; returns base64-encoded audio.
    async fn text_to_speech(&self, _text: &str) -> Result<String> {
        Err(DrafterError::NotImplemented("text_to_speech"))
    }
}
