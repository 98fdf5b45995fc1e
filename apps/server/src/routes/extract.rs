// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction endpoints for STEP tolerance tables.

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use gdt_lite_core::{extract_from_bytes, extract_from_bytes_lossy};

use crate::error::ApiError;
use crate::types::{ExtractResponse, ExtractionStats};
use crate::AppState;

/// Uploaded file field.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// How uploaded bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoding {
    /// Reject invalid UTF-8.
    Strict,
    /// Drop invalid sequences.
    Lossy,
}

impl Decoding {
    /// Plain-text uploads must be valid UTF-8; anything else is decoded leniently.
    fn for_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.trim_start().to_ascii_lowercase().starts_with("text/plain") => {
                Self::Strict
            }
            _ => Self::Lossy,
        }
    }
}

/// Extract file data from multipart request.
async fn extract_file(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        tracing::debug!(field_name = %field_name, "Processing multipart field");

        if field_name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            tracing::debug!(size = data.len(), ?file_name, ?content_type, "Extracted file from multipart");
            return Ok(Upload {
                file_name,
                content_type,
                data,
            });
        }
    }

    tracing::warn!("No 'file' field found in multipart request");
    Err(ApiError::MissingFile)
}

fn check_size(state: &AppState, len: usize) -> Result<(), ApiError> {
    if len > state.config.max_file_size_bytes() {
        return Err(ApiError::FileTooLarge {
            max_mb: state.config.max_file_size_mb,
        });
    }
    Ok(())
}

/// Run extraction on the blocking thread pool (CPU-bound scans).
async fn run_extraction(
    filename: Option<String>,
    data: Bytes,
    decoding: Decoding,
) -> Result<ExtractResponse, ApiError> {
    let input_bytes = data.len();

    let (rows, elapsed) = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let rows = match decoding {
            Decoding::Strict => extract_from_bytes(&data)?,
            Decoding::Lossy => extract_from_bytes_lossy(&data),
        };
        Ok::<_, gdt_lite_core::Error>((rows, start.elapsed()))
    })
    .await??;

    let stats = ExtractionStats {
        extraction_time_ms: elapsed.as_millis() as u64,
        input_bytes,
    };
    let response = ExtractResponse::new(filename, rows, stats);

    tracing::info!(
        filename = response.filename.as_deref().unwrap_or("-"),
        rows = response.summary.total,
        tolerances = response.summary.tolerances,
        datums = response.summary.datums,
        time_ms = stats.extraction_time_ms,
        "Extraction complete"
    );

    Ok(response)
}

/// POST /api/v1/extract - Extract the table from a multipart upload.
pub async fn extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let upload = extract_file(&mut multipart).await?;

    if let Some(name) = &upload.file_name {
        if !state.config.is_allowed_file_name(name) {
            return Err(ApiError::UnsupportedExtension(name.clone()));
        }
    }

    check_size(&state, upload.data.len())?;

    let decoding = Decoding::for_content_type(upload.content_type.as_deref());
    let response = run_extraction(upload.file_name, upload.data, decoding).await?;
    Ok(Json(response))
}

/// POST /api/v1/extract/text - Extract the table from a UTF-8 request body.
pub async fn extract_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExtractResponse>, ApiError> {
    check_size(&state, body.len())?;
    let response = run_extraction(None, body, Decoding::Strict).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding_for_content_type() {
        assert_eq!(Decoding::for_content_type(Some("text/plain")), Decoding::Strict);
        assert_eq!(
            Decoding::for_content_type(Some("Text/Plain; charset=utf-8")),
            Decoding::Strict
        );
        assert_eq!(
            Decoding::for_content_type(Some("application/octet-stream")),
            Decoding::Lossy
        );
        assert_eq!(Decoding::for_content_type(None), Decoding::Lossy);
    }
}
