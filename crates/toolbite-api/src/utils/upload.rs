//! Multipart form extraction for the tool handlers

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use toolbite_core::{IncomingFile, TransformError, TransformOptions};

use crate::error::HttpAppError;

/// The file and text fields of one tool request.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<IncomingFile>,
    pub options: TransformOptions,
}

/// Read a tool form: the field named `file_field` becomes the upload, every
/// other text field becomes an option.
///
/// A body that is not multipart, or has no field named `file_field`, yields a
/// form without a file; the dispatcher reports that as a validation error.
/// Files sent under any other field name are ignored.
pub async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
    file_field: &str,
    size_cap: Option<usize>,
) -> Result<UploadForm, HttpAppError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Request is not a multipart form");
            return Ok(UploadForm::default());
        }
    };

    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, size_cap))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            if form.file.is_some() {
                return Err(TransformError::validation(format!(
                    "Multiple file fields are not allowed; send exactly one field named '{}'",
                    file_field
                ))
                .into());
            }

            let original_name = field
                .file_name()
                .map(sanitize_filename)
                .unwrap_or_else(|| "file".to_string());
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let bytes = field.bytes().await.map_err(|e| read_error(e, size_cap))?;

            form.file = Some(IncomingFile::new(bytes, original_name, mime_type));
        } else if field.file_name().is_none() {
            let value = field.text().await.map_err(|e| read_error(e, size_cap))?;
            form.options.insert(name, value.trim());
        }
    }

    Ok(form)
}

fn read_error(err: MultipartError, size_cap: Option<usize>) -> HttpAppError {
    match size_cap {
        Some(max) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            // The body limit sits just above the cap, so anything cut off by it is over the cap.
            HttpAppError(TransformError::PayloadTooLarge {
                size: max.saturating_add(1),
                max,
            })
        }
        _ => err.into(),
    }
}

/// Reduce a client-supplied filename to a safe basename for logs and
/// `Content-Disposition` headers.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    let filename_only = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() {
        return "file".to_string();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\photo.jpg"), "photo.jpg");
    }

    #[test]
    fn test_sanitize_filename_replaces_header_breaking_chars() {
        assert_eq!(sanitize_filename("my \"holiday\".png"), "my__holiday_.png");
        assert_eq!(sanitize_filename("a\r\nb.gif"), "a__b.gif");
    }

    #[test]
    fn test_sanitize_filename_fallback() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("///"), "file");
    }
}
