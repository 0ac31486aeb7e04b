//! Drive axum's multipart parser into a [`MemoryStreamProvider`]

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

use super::headers::PartHeaders;
use super::provider::{MemoryStreamProvider, MultipartStreamProvider, ParentContent};
use crate::{Error, Result};

/// Read every part of `multipart`.
///
/// File parts are captured in memory. Other parts are decoded as UTF-8 and
/// recorded as text fields. The combined size of all parts is capped at
/// `max_bytes`.
pub async fn read_multipart(
    mut multipart: Multipart,
    parent: Option<&ParentContent>,
    max_bytes: usize,
) -> Result<MemoryStreamProvider> {
    let mut provider = MemoryStreamProvider::new();
    let mut total = 0usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, total, max_bytes))?
    {
        let headers = PartHeaders::from_header_map(field.headers());
        let is_file = provider.resolve_local_name(Some(&headers))?.is_some();
        let name = headers.form_field_name()?.unwrap_or_default().to_string();

        let buffer = provider.capture_stream(parent, Some(headers))?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(&e, total, max_bytes))?
        {
            total = total.saturating_add(chunk.len());
            if total > max_bytes {
                return Err(Error::PayloadTooLarge {
                    size: total,
                    max: max_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        if is_file {
            tracing::debug!(field = %name, size = buffer.len(), "File part captured");
            #[cfg(feature = "metrics")]
            crate::observability::record_upload(buffer.len());
        } else {
            let text = String::from_utf8(provider.take_scratch())
                .map_err(|_| Error::Multipart(format!("field '{name}' is not valid UTF-8")))?;
            provider.form_data_mut().add(name, Some(text));
        }
    }

    tracing::debug!(
        fields = provider.form_data().len(),
        files = provider.file_data().len(),
        bytes = total,
        "Multipart body read"
    );

    Ok(provider)
}

fn multipart_error(e: &MultipartError, read: usize, max_bytes: usize) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            size: read,
            max: max_bytes,
        }
    } else {
        Error::Multipart(e.body_text())
    }
}
