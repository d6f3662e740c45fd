//! Local checks run before any request is sent.
//!
//! Everything here is synchronous and pure: a rejected message or file never costs a round trip.

use crate::errors::{Error, Result};
use crate::upload::UploadFile;

/// Maximum chat message length, in characters, measured before trimming.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Maximum upload size in bytes (50 MiB, inclusive).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Media types the backend accepts for document uploads.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/markdown",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// File-name extensions accepted when the media type is unknown or not listed. Compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// Validate a chat message and return the trimmed text to send.
pub fn validate_message(message: &str) -> Result<&str> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_input("Message content cannot be empty"));
    }

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::invalid_input(format!(
            "Message cannot be longer than {MAX_MESSAGE_CHARS} characters"
        )));
    }

    Ok(trimmed)
}

/// Validate an upload candidate. Checks run in order: presence, size, format.
pub fn validate_upload(file: Option<UploadFile>) -> Result<UploadFile> {
    let Some(file) = file else {
        return Err(Error::invalid_input("Select a file to upload"));
    };

    if file.size() > MAX_UPLOAD_BYTES {
        return Err(Error::FileTooLarge {
            message: format!("File size cannot exceed 50MB (got {} bytes)", file.size()),
        });
    }

    if !is_allowed_media_type(file.media_type()) && !has_allowed_extension(file.name()) {
        return Err(Error::UnsupportedFormat {
            message: "Unsupported file format, upload PDF, DOC, DOCX, TXT, MD or another supported document".to_string(),
        });
    }

    Ok(file)
}

pub fn is_allowed_media_type(media_type: &str) -> bool {
    ALLOWED_MEDIA_TYPES.contains(&media_type)
}

/// True when the text after the last `.` is an allowed extension.
pub fn has_allowed_extension(file_name: &str) -> bool {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
