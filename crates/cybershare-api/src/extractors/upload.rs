//! Reading a single uploaded file out of a multipart body.

use axum::body::Bytes;
use axum::extract::Multipart;

use cybershare_core::AppError;

use crate::error::ApiResult;

/// Form field that carries the file.
pub const FILE_FIELD: &str = "file";

/// The `file` part of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Pull the `file` field out of `multipart`, ignoring any other fields.
pub async fn read_file_field(mut multipart: Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }
    Err(AppError::validation("Missing 'file' field").into())
}
