//! Resume text extraction from an uploaded, base64-encoded document.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Decodes `resumeData`: plain base64, optionally behind a
/// `data:<mime>;base64,` prefix.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, AppError> {
    let data = data.trim();
    let encoded = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| AppError::Validation("malformed data URI".to_string()))?,
        None => data,
    };
    if encoded.trim().is_empty() {
        return Err(AppError::Validation("resumeData must not be empty".to_string()));
    }

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::Validation(format!("resumeData is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("resumeData decodes to an empty document".to_string()));
    }
    Ok(bytes)
}

/// Extracts plain text, bounded by `timeout`. PDFs go through `pdf-extract`
/// on the blocking pool; anything else must be UTF-8 text.
pub async fn extract_text(bytes: Vec<u8>, timeout: Duration) -> Result<String, AppError> {
    let work = tokio::task::spawn_blocking(move || extract_blocking(&bytes));
    let text = tokio::time::timeout(timeout, work)
        .await
        .map_err(|_| AppError::ExtractionTimeout(timeout.as_secs()))?
        .map_err(|e| AppError::Extraction(format!("extraction task failed: {e}")))??;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("no text could be extracted from the resume".to_string()));
    }
    Ok(text)
}

fn extract_blocking(bytes: &[u8]) -> Result<String, AppError> {
    if bytes.starts_with(PDF_MAGIC) {
        debug!("Extracting text from PDF ({} bytes)", bytes.len());
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("PDF extraction error: {e}")))
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Extraction("document is neither PDF nor UTF-8 text".to_string()))
    }
}
