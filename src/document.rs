//! Generated requirements documents: streaming, placeholder, and saving.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use futures_util::StreamExt;
use regex::Regex;
use tracing::{debug, warn};

use crate::{ProjectBackend, Result, telemetry};

/// Document shown in place of a generation that failed.
pub const GENERATION_ERROR_DOCUMENT: &str = "# Generation Error\n\n\
    An error occurred while generating the document. Please check the logs for details.";

static FILENAME_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s/\\]+").expect("filename pattern is valid"));

/// Which document stream to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRequest {
    /// Full PRD written for a target tool (`/generate-prd`)
    Prd { target: String },
    /// Review of the requirements gathered so far (`/review`)
    Review,
    /// Rewrite the stored requirements following an instruction
    /// (`/edit-requirements`)
    Edit { instruction: String },
}

impl DocumentRequest {
    pub fn prd(target: impl Into<String>) -> Self {
        DocumentRequest::Prd {
            target: target.into(),
        }
    }

    pub fn edit(instruction: impl Into<String>) -> Self {
        DocumentRequest::Edit {
            instruction: instruction.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DocumentRequest::Prd { .. } => "prd",
            DocumentRequest::Review => "review",
            DocumentRequest::Edit { .. } => "edit",
        }
    }
}

/// Stream a document, handing each decoded piece to `on_text` as it arrives.
///
/// Returns the whole document. On failure the pieces already delivered stay
/// with the caller; callers usually show [`GENERATION_ERROR_DOCUMENT`].
pub async fn generate<B>(
    backend: &B,
    project_id: &str,
    request: &DocumentRequest,
    mut on_text: impl FnMut(&str),
) -> Result<String>
where
    B: ProjectBackend + ?Sized,
{
    let mut stream = match backend.document_stream(project_id, request).await {
        Ok(stream) => stream,
        Err(e) => {
            record_stream(false);
            return Err(e);
        }
    };

    let mut document = String::new();
    while let Some(piece) = stream.next().await {
        match piece {
            Ok(text) => {
                document.push_str(&text);
                on_text(&text);
            }
            Err(e) => {
                warn!(error = %e, kind = request.kind(), "document stream failed");
                record_stream(false);
                return Err(e);
            }
        }
    }

    debug!(kind = request.kind(), len = document.len(), "document stream complete");
    record_stream(true);
    Ok(document)
}

fn record_stream(ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::STREAMS_TOTAL, "kind" => "document", "status" => status)
        .increment(1);
}

/// File name for a project's PRD: whitespace and path separators become
/// `_`, suffixed with `_PRD.md`.
pub fn download_filename(project_name: &str) -> String {
    let stem = FILENAME_UNSAFE.replace_all(project_name.trim(), "_");
    let stem: &str = if stem.is_empty() { "project" } else { &stem };
    format!("{stem}_PRD.md")
}

/// Write `content` to `dir`/[`download_filename`], creating `dir` if needed.
pub fn save(dir: &Path, project_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(download_filename(project_name));
    fs::write(&path, content)?;
    debug!(path = %path.display(), bytes = content.len(), "saved document");
    Ok(path)
}
