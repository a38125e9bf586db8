//! Context documents: a recruiter uploads a PDF (job description, team notes) whose text
//! seeds question generation. The original file is kept in object storage.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Upload cap enforced by the route's body limit layer.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
/// Upper bound on context text forwarded to the prompt.
const MAX_CONTEXT_CHARS: usize = 20_000;

#[derive(Debug, Serialize)]
pub struct ContextDocument {
    pub file_name: String,
    pub s3_key: String,
    pub text: String,
}

pub fn is_pdf(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> bool {
    let named_pdf = file_name.to_lowercase().ends_with(".pdf");
    let typed_pdf = content_type == Some("application/pdf");
    (named_pdf || typed_pdf) && bytes.starts_with(b"%PDF")
}

/// Collapses runs of whitespace and truncates on a char boundary.
pub fn normalize_context_text(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(MAX_CONTEXT_CHARS) {
        Some((cut, _)) => collapsed[..cut].to_string(),
        None => collapsed,
    }
}

pub async fn ingest_context_document(
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    organization_id: &str,
    file_name: String,
    bytes: Bytes,
) -> Result<ContextDocument, AppError> {
    let pdf_bytes = bytes.clone();
    let raw_text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    let text = normalize_context_text(&raw_text);
    if text.is_empty() {
        return Err(AppError::Validation(
            "The PDF does not contain extractable text".to_string(),
        ));
    }

    let s3_key = format!("documents/{organization_id}/{}.pdf", Uuid::new_v4());
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(bytes))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Upload of {file_name} failed: {e}")))?;

    info!("Stored context document s3://{s3_bucket}/{s3_key} ({} chars)", text.len());

    Ok(ContextDocument {
        file_name,
        s3_key,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_requires_magic_bytes() {
        assert!(is_pdf("jd.PDF", None, b"%PDF-1.7 ..."));
        assert!(is_pdf("upload", Some("application/pdf"), b"%PDF-1.4"));
        assert!(!is_pdf("jd.pdf", Some("application/pdf"), b"PK\x03\x04"));
        assert!(!is_pdf("notes.txt", Some("text/plain"), b"%PDF-1.4"));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_context_text("  Senior\n\nEngineer \t role  "),
            "Senior Engineer role"
        );
    }

    #[test]
    fn test_normalize_truncates_long_text() {
        let long = "é".repeat(MAX_CONTEXT_CHARS + 50);
        assert_eq!(normalize_context_text(&long).chars().count(), MAX_CONTEXT_CHARS);
    }
}
