//! HTTP client for the KnowBase API.
//!
//! [`ApiClient`] wraps a configured `reqwest` client and exposes the three backend operations.
//! Each operation validates its input locally, sends exactly one request, and translates any
//! failure into an [`Error`] variant that names what went wrong from the caller's point of view.
//! Nothing is retried.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::{Error, Result};
use crate::models::ChatRequest;
use crate::upload::{ProgressCallback, UploadFile};
use crate::validation;

pub const HEALTH_PATH: &str = "health";
pub const CHAT_PATH: &str = "chat/message";
pub const UPLOAD_PATH: &str = "documents/upload";

/// Why a request produced no usable body.
#[derive(Debug)]
enum Failure {
    /// The backend answered with a non-2xx status
    Status { status: StatusCode, body: String },
    /// The configured request timeout elapsed
    Timeout,
    /// Connection, protocol or body-read failure
    Transport(reqwest::Error),
}

impl Failure {
    fn status(&self) -> Option<StatusCode> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            Failure::Transport(e) => e.status(),
            Failure::Timeout => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Failure::Status { status, body } if body.trim().is_empty() => format!("HTTP {status}"),
            Failure::Status { status, body } => format!("HTTP {status}: {}", body.trim()),
            Failure::Timeout => "request timed out".to_string(),
            Failure::Transport(e) => e.to_string(),
        }
    }
}

impl From<reqwest::Error> for Failure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Failure::Timeout } else { Failure::Transport(e) }
    }
}

/// Client for the KnowBase API.
///
/// Cheap to clone; clones share the underlying connection pool. Construct one from configuration
/// at startup and hand it to whatever needs to talk to the backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| Error::Internal {
                operation: format!("create HTTP client: {e}"),
            })?;

        debug!(base_url = %config.base_url, timeout = ?config.request_timeout, "Created KnowBase API client");

        Ok(Self {
            client,
            base_url: ensure_slash(&config.base_url),
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probe `GET /health`. Every failure, whatever its cause, is reported as
    /// [`Error::HealthCheckFailed`].
    #[instrument(skip(self))]
    pub async fn check_health(&self) -> Result<Value> {
        let url = self.endpoint(HEALTH_PATH)?;

        self.execute(self.client.get(url))
            .await
            .map_err(|failure| Error::HealthCheckFailed {
                message: failure.message(),
            })
            .inspect_err(Error::log)
    }

    /// Send a chat message via `POST /chat/message`.
    ///
    /// The message is rejected locally if it is blank or longer than
    /// [`MAX_MESSAGE_CHARS`](validation::MAX_MESSAGE_CHARS); otherwise the trimmed text is sent as
    /// `{"message": ...}` and the backend's JSON answer is returned as-is.
    #[instrument(skip(self, message), fields(message_chars = message.chars().count()))]
    pub async fn send_message(&self, message: &str) -> Result<Value> {
        let message = validation::validate_message(message).inspect_err(Error::log)?;
        let url = self.endpoint(CHAT_PATH)?;

        self.execute(self.client.post(url).json(&ChatRequest { message }))
            .await
            .map_err(|failure| self.chat_error(failure))
            .inspect_err(Error::log)
    }

    /// Upload a document via `POST /documents/upload` as a multipart form with a single `file` part.
    ///
    /// `on_progress` receives whole percentages as the file is streamed out; it may be called any
    /// number of times, including zero for an empty file.
    #[instrument(skip_all)]
    pub async fn upload_document(&self, file: Option<UploadFile>, on_progress: Option<ProgressCallback>) -> Result<Value> {
        let file = validation::validate_upload(file).inspect_err(Error::log)?;
        let url = self.endpoint(UPLOAD_PATH)?;

        info!(file = file.name(), media_type = file.media_type(), size = file.size(), "Uploading document");
        let form = file.into_form(on_progress)?;

        self.execute(self.client.post(url).multipart(form))
            .await
            .map_err(|failure| self.upload_error(failure))
            .inspect_err(Error::log)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::Internal {
            operation: format!("construct URL for '{path}': {e}"),
        })
    }

    /// Send one request and return the parsed 2xx body. Every request and outcome is logged here.
    async fn execute(&self, request: RequestBuilder) -> std::result::Result<Value, Failure> {
        let request = request.build().map_err(Failure::Transport)?;
        let method = request.method().clone();
        let url = request.url().clone();
        log_request(&method, &url);

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let failure = Failure::from(e);
                log_response_error(&url, &failure);
                return Err(failure);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let failure = Failure::from(e);
                log_response_error(&url, &failure);
                return Err(failure);
            }
        };

        if !status.is_success() {
            let failure = Failure::Status { status, body };
            log_response_error(&url, &failure);
            return Err(failure);
        }

        log_response(status, &url);
        Ok(parse_body(&body))
    }

    fn chat_error(&self, failure: Failure) -> Error {
        match failure.status() {
            Some(StatusCode::BAD_REQUEST) => Error::invalid_input("Invalid request parameters, check the message content"),
            Some(StatusCode::BAD_GATEWAY) => Error::UpstreamUnavailable,
            Some(status) if status.as_u16() >= 500 => Error::ServerError {
                status,
                message: "Internal server error, retry later".to_string(),
            },
            _ => self.request_failed("Send message", failure),
        }
    }

    fn upload_error(&self, failure: Failure) -> Error {
        match failure.status() {
            Some(StatusCode::PAYLOAD_TOO_LARGE) => Error::FileTooLarge {
                message: "File too large, choose a file under 50MB".to_string(),
            },
            Some(StatusCode::UNSUPPORTED_MEDIA_TYPE) => Error::UnsupportedFormat {
                message: "Unsupported file format".to_string(),
            },
            Some(status) if status.as_u16() >= 500 => Error::ServerError {
                status,
                message: "Server failed to process the file, retry later".to_string(),
            },
            _ => self.request_failed("Upload", failure),
        }
    }

    fn request_failed(&self, operation: &'static str, failure: Failure) -> Error {
        match failure {
            Failure::Timeout => Error::Timeout {
                timeout: self.request_timeout,
            },
            other => Error::RequestFailed {
                operation,
                status: other.status(),
                message: other.message(),
            },
        }
    }
}

/// Makes sure a url has a trailing slash, so that `join` appends instead of replacing the last
/// path segment: `/api` + `health` gives `/health`, `/api/` + `health` gives `/api/health`.
fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}

/// Bodies that are not JSON come back as a JSON string holding the raw text.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn log_request(method: &Method, url: &Url) {
    debug!(%method, %url, "Sending request");
}

fn log_response(status: StatusCode, url: &Url) {
    debug!(status = status.as_u16(), %url, "Response received");
}

fn log_response_error(url: &Url, failure: &Failure) {
    warn!(
        status = failure.status().map(|s| s.as_u16()),
        %url,
        error = %failure.message(),
        "Response error"
    );
}
