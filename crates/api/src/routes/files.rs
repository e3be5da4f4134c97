//! File upload, listing, download and deletion routes.

use std::fmt::Write as _;
use std::io;

use axum::{
    Json, Router,
    body::Body,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use filedrop_core::storage::StorageError;
use filedrop_shared::AppError;
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{error, info, warn};

use crate::{AppState, error::ApiError};

/// Multipart field carrying the upload.
const FILE_FIELD: &str = "file";

const NO_FILE_UPLOADED: &str = "No file uploaded";
const MALFORMED_UPLOAD: &str = "Malformed upload";
const FILE_TOO_LARGE: &str = "File too large";
const UPLOAD_FAILED: &str = "Failed to upload file";
const INVALID_FILE_NAME: &str = "Invalid file name";
const FILE_NOT_FOUND: &str = "File not found";

/// Creates the file routes.
///
/// Uploads are streamed to disk, so the body limit is only applied when one
/// is configured.
pub fn routes(max_body_bytes: Option<usize>) -> Router<AppState> {
    let body_limit = max_body_bytes.map_or_else(DefaultBodyLimit::disable, DefaultBodyLimit::max);

    Router::new()
        .route("/upload", post(upload_file).layer(body_limit))
        .route("/files", get(list_files))
        .route("/files/{filename}", get(download_file).delete(delete_file))
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// Stored filename to use for download and delete.
    pub file: String,
}

/// Response for the file listing.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    /// Stored filenames, in directory order.
    pub files: Vec<String>,
}

/// Plain confirmation response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: &'static str,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a storage failure into the response for one operation.
///
/// `failure` is the client message used when the filesystem itself failed.
fn storage_error(err: StorageError, failure: &'static str) -> ApiError {
    match err {
        StorageError::InvalidName { name } => {
            warn!(file = ?name, "Rejected file name");
            AppError::client(INVALID_FILE_NAME).into()
        }
        StorageError::NotFound { .. } => AppError::not_found(FILE_NOT_FOUND).into(),
        StorageError::Body { source } => body_error(&source),
        StorageError::Io { .. } => {
            error!(error = %err, "{failure}");
            AppError::storage(failure).into()
        }
    }
}

/// Classify a multipart parsing failure.
fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeds body limit");
        AppError::payload_too_large(FILE_TOO_LARGE).into()
    } else {
        warn!(error = %err, "Failed to read multipart body");
        AppError::client(MALFORMED_UPLOAD).into()
    }
}

/// Classify a failure raised while streaming the upload to disk.
fn body_error(source: &io::Error) -> ApiError {
    match source
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
    {
        Some(err) => multipart_error(err),
        None => {
            warn!(error = %source, "Failed to read upload body");
            AppError::client(MALFORMED_UPLOAD).into()
        }
    }
}

/// `Content-Disposition` value offering `name` as a download.
///
/// Names that are not plain printable ASCII get an ASCII fallback plus an
/// RFC 5987 `filename*` parameter.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if fallback == name {
        return format!("attachment; filename=\"{name}\"");
    }

    let mut encoded = String::with_capacity(name.len() * 3);
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload`
/// Stream the multipart field `file` to disk under a generated name.
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Upload is not a multipart form");
        ApiError::from(AppError::client(NO_FILE_UPLOADED))
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Browsers send an empty filename when no file was picked.
        let Some(original_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let body = StreamReader::new(field.map_err(io::Error::other));
        tokio::pin!(body);

        let stored = state
            .store
            .save(&original_name, body)
            .await
            .map_err(|e| match e {
                // The only way a write sees NotFound is the root vanishing.
                StorageError::NotFound { .. } => {
                    error!(error = %e, "Uploads directory is missing");
                    ApiError::from(AppError::storage(UPLOAD_FAILED))
                }
                other => storage_error(other, UPLOAD_FAILED),
            })?;

        info!(file = %stored.name, size = stored.size, "File uploaded");

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully",
            file: stored.name,
        }));
    }

    warn!("Upload without a file field");
    Err(AppError::client(NO_FILE_UPLOADED).into())
}

/// GET `/files`
/// List stored filenames.
async fn list_files(State(state): State<AppState>) -> Result<Json<FileListResponse>, ApiError> {
    let files = state
        .store
        .list()
        .await
        .map_err(|e| storage_error(e, "Unable to list files"))?;

    Ok(Json(FileListResponse { files }))
}

/// GET `/files/{filename}`
/// Stream a stored file back as an attachment.
async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .store
        .open_file(&filename)
        .await
        .map_err(|e| storage_error(e, "Unable to read file"))?;

    let content_type = mime_guess::from_path(&download.name).first_or_octet_stream();
    let disposition = HeaderValue::from_str(&content_disposition(&download.name)).map_err(|e| {
        error!(file = %download.name, error = %e, "Unusable Content-Disposition");
        ApiError::from(AppError::storage("Unable to read file"))
    })?;

    info!(file = %download.name, size = download.size, "File download");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, download.size)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(download.file)))
        .map_err(|e| {
            error!(error = %e, "Failed to build download response");
            AppError::storage("Unable to read file").into()
        })
}

/// DELETE `/files/{filename}`
/// Remove a stored file.
async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .store
        .delete(&filename)
        .await
        .map_err(|e| storage_error(e, "Failed to delete file"))?;

    info!(file = %filename, "File deleted");

    Ok(Json(MessageResponse {
        message: "File deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1718000000000-hello.txt", "attachment; filename=\"1718000000000-hello.txt\"")]
    #[case("a b.txt", "attachment; filename=\"a b.txt\"")]
    #[case(
        "1-\"quoted\".txt",
        "attachment; filename=\"1-_quoted_.txt\"; filename*=UTF-8''1-%22quoted%22.txt"
    )]
    #[case(
        "1-café.txt",
        "attachment; filename=\"1-caf_.txt\"; filename*=UTF-8''1-caf%C3%A9.txt"
    )]
    fn test_content_disposition(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(content_disposition(name), expected);
        assert!(HeaderValue::from_str(&content_disposition(name)).is_ok());
    }

    #[test]
    fn test_storage_error_mapping() {
        let err = storage_error(StorageError::invalid_name("../x"), "Failed to delete file");
        assert_eq!(err.0.status_code(), 400);
        assert_eq!(err.0.message(), INVALID_FILE_NAME);

        let err = storage_error(StorageError::not_found("x"), "Failed to delete file");
        assert_eq!(err.0.status_code(), 404);
        assert_eq!(err.0.message(), FILE_NOT_FOUND);

        let err = storage_error(
            StorageError::io(
                "delete",
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ),
            "Failed to delete file",
        );
        assert_eq!(err.0.status_code(), 500);
        assert_eq!(err.0.message(), "Failed to delete file");

        let err = storage_error(
            StorageError::body(std::io::Error::from(std::io::ErrorKind::ConnectionReset)),
            "Failed to upload file",
        );
        assert_eq!(err.0.status_code(), 400);
        assert_eq!(err.0.message(), MALFORMED_UPLOAD);
    }
}
