//! # knowbase: client for the KnowBase RAG service
//!
//! `knowbase` talks to the KnowBase backend over HTTP. The backend answers questions against an
//! indexed document collection; this crate gives Rust callers a typed way to probe it, chat with
//! it, and feed it documents.
//!
//! ## Operations
//!
//! All three live on [`ApiClient`]:
//!
//! - [`check_health`](ApiClient::check_health) - `GET /health`
//! - [`send_message`](ApiClient::send_message) - `POST /chat/message` with `{"message": ...}`
//! - [`upload_document`](ApiClient::upload_document) - `POST /documents/upload`, multipart field
//!   `file`, with optional progress reporting
//!
//! Input is validated before anything is sent (see [`validation`]), and every failure comes back
//! as an [`Error`] whose [`kind`](Error::kind) tells the caller what happened: rejected input, a
//! file the backend won't take, an unavailable AI upstream, a server error, a timeout, or a plain
//! request failure. Successful bodies are returned as [`serde_json::Value`] exactly as the backend
//! sent them; [`models`] has typed views for the known shapes.
//!
//! Each call makes a single request. There is no retry, caching or authentication; callers decide
//! what to do with a failure.
//!
//! ## Example
//!
//! ```no_run
//! use knowbase::{ApiClient, ClientConfig, models::ChatResponse};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ClientConfig::default())?;
//!
//! client.check_health().await?;
//!
//! let answer = ChatResponse::try_from(client.send_message("What does the handbook say about leave?").await?)?;
//! println!("{}", answer.answer);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration and logging
//!
//! The [`config`] module loads a [`Config`] from YAML plus `KNOWBASE_`-prefixed environment
//! variables, and [`telemetry`] sets up `tracing` output. Both are used by the `knowbase` binary;
//! library users can build a [`ClientConfig`] directly and install their own subscriber.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod telemetry;
pub mod upload;
pub mod validation;

#[cfg(test)]
mod test;

pub use client::ApiClient;
pub use config::{ClientConfig, Config};
pub use errors::{Error, ErrorKind, Result};
pub use upload::{ProgressCallback, UploadFile};
