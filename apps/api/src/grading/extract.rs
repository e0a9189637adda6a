//! CV text intake: PDF extraction and normalization.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Upper bound on CV text sent to the model. Roughly 8 pages of dense text.
pub const MAX_CV_CHARS: usize = 30_000;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extracts text from an uploaded PDF.
///
/// Parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_pdf_text(data: Bytes) -> Result<String, AppError> {
    if !data.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "Uploaded file is not a PDF".to_string(),
        ));
    }

    let size = data.len();
    let raw = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
    .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    debug!(bytes = size, chars = raw.len(), "Extracted PDF text");
    prepare_cv_text(&raw)
}

/// Normalizes CV text and enforces the size limits.
pub fn prepare_cv_text(raw: &str) -> Result<String, AppError> {
    let text = normalize_whitespace(raw);
    if text.is_empty() {
        return Err(AppError::Validation(
            "CV text is empty (scanned PDFs without a text layer are not supported)".to_string(),
        ));
    }
    if text.chars().count() > MAX_CV_CHARS {
        return Err(AppError::PayloadTooLarge(format!(
            "CV text exceeds {MAX_CV_CHARS} characters"
        )));
    }
    Ok(text)
}

/// Trims each line, collapses runs of spaces/tabs, and keeps at most one blank line
/// between paragraphs. Line structure is preserved because the checks look at bullets.
fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;

    for line in raw.lines() {
        let collapsed = line
            .split(|c: char| c == ' ' || c == '\t' || c == '\u{a0}')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if collapsed.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        out.push_str(&collapsed);
        blank_run = 0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_spaces_and_blank_lines() {
        let raw = "  Jane   Doe \t\n\n\n\nSenior\u{a0}Engineer\n   \n- Built things  ";
        assert_eq!(
            normalize_whitespace(raw),
            "Jane Doe\n\nSenior Engineer\n\n- Built things"
        );
    }

    #[test]
    fn test_prepare_rejects_empty() {
        assert!(matches!(
            prepare_cv_text(" \n\t \n"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_oversized() {
        let raw = "word ".repeat(MAX_CV_CHARS);
        assert!(matches!(
            prepare_cv_text(&raw),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_rejected() {
        let result = extract_pdf_text(Bytes::from_static(b"PK\x03\x04 not a pdf")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
