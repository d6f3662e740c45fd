//! Upload payloads and progress reporting.
//!
//! The payload is held in memory as [`Bytes`] and streamed to the transport in fixed-size chunks.
//! Each chunk handed over advances the progress counter, which is how callers get percentage
//! updates without access to the socket.

use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use mime_guess::mime::Mime;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::debug;

use crate::errors::{Error, Result};

/// Receives upload progress as a whole percentage in `0..=100`.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// Multipart field the backend reads the document from.
pub const FILE_FIELD: &str = "file";

const CHUNK_SIZE: usize = 64 * 1024;

/// A document to upload: its name, declared media type and contents.
#[derive(Debug, Clone)]
pub struct UploadFile {
    name: String,
    media_type: String,
    data: Bytes,
}

impl UploadFile {
    /// An empty `media_type` means "unknown"; the extension of `name` is then all validation has to go on.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();

        debug!(path = %path.display(), %media_type, size = data.len(), "Loaded upload file");
        Ok(Self::new(name, media_type, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Build the multipart body with this file under [`FILE_FIELD`].
    pub(crate) fn into_form(self, on_progress: Option<ProgressCallback>) -> Result<Form> {
        let total = self.size();
        let body = reqwest::Body::wrap_stream(progress_stream(self.data, on_progress));
        let part = Part::stream_with_length(body, total).file_name(self.name);

        // Unknown or malformed types are sent without a part content type
        let part = match self.media_type.parse::<Mime>() {
            Ok(mime) => part.mime_str(mime.as_ref()).map_err(|e| Error::Internal {
                operation: format!("set upload media type '{}': {}", self.media_type, e),
            })?,
            Err(_) => part,
        };

        Ok(Form::new().part(FILE_FIELD, part))
    }
}

/// `round(sent * 100 / total)`, capped at 100. `total` must be non-zero.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    let percent = (sent as f64 * 100.0 / total as f64).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Split `data` into chunks and report progress as each one is pulled by the transport.
/// Nothing is reported for an empty payload.
fn progress_stream(
    data: Bytes,
    on_progress: Option<ProgressCallback>,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..(start + CHUNK_SIZE).min(data.len())))
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(on_progress) = &on_progress {
            on_progress(progress_percent(sent, total));
        }
        Ok(chunk)
    })
}
