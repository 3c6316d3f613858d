//! crates/pdf_chat_core/src/upload.rs
//!
//! Local checks run on a picked file before anything is sent.

use crate::domain::FileUpload;
use crate::ports::PortError;

/// Shown when the backend fails without saying why.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload file";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload a PDF file")]
    NotPdf,
    #[error("File is too large ({size} bytes, limit {limit})")]
    TooLarge { size: usize, limit: usize },
    #[error("{0}")]
    Failed(String),
}

impl From<PortError> for UploadError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Rejected(message) if !message.trim().is_empty() => UploadError::Failed(message),
            _ => UploadError::Failed(UPLOAD_FAILED_MESSAGE.to_string()),
        }
    }
}

/// Accepts only files whose content type names PDF, and optionally caps the size.
pub fn validate_upload(file: &FileUpload, limit: Option<usize>) -> Result<(), UploadError> {
    if !file.content_type.to_ascii_lowercase().contains("pdf") {
        return Err(UploadError::NotPdf);
    }
    if let Some(limit) = limit {
        if file.bytes.len() > limit {
            return Err(UploadError::TooLarge {
                size: file.bytes.len(),
                limit,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn file(content_type: &str, size: usize) -> FileUpload {
        FileUpload {
            file_name: "report".to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn only_pdf_content_types_pass() {
        assert_eq!(validate_upload(&file("application/pdf", 10), None), Ok(()));
        assert_eq!(validate_upload(&file("Application/PDF", 10), None), Ok(()));
        assert_eq!(
            validate_upload(&file("text/plain", 10), None),
            Err(UploadError::NotPdf)
        );
        assert_eq!(UploadError::NotPdf.to_string(), "Please upload a PDF file");
    }

    #[test]
    fn size_limit_is_enforced_when_set() {
        assert!(validate_upload(&file("application/pdf", 11), Some(10)).is_err());
        assert!(validate_upload(&file("application/pdf", 10), Some(10)).is_ok());
    }

    #[test]
    fn backend_messages_are_kept_when_present() {
        let e: UploadError = PortError::Rejected("Only PDF files are allowed".to_string()).into();
        assert_eq!(e.to_string(), "Only PDF files are allowed");

        let e: UploadError = PortError::Transport("reset".to_string()).into();
        assert_eq!(e.to_string(), UPLOAD_FAILED_MESSAGE);
    }
}
