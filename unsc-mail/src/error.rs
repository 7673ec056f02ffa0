use std::path::PathBuf;

use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Feed unavailable")]
    Feed(#[from] FeedError),

    #[error("Delivery failed")]
    Delivery(#[from] DeliveryError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// RSS feed errors
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed")]
    Request(#[from] reqwest::Error),

    #[error("Feed request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed feed XML")]
    Parse(#[from] quick_xml::DeError),
}

/// Per-document processing errors
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Timed out after {timeout_secs}s downloading {url}")]
    DownloadTimeout { url: String, timeout_secs: u64 },

    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid document URL {url}")]
    InvalidUrl { url: String },

    #[error("Failed to load PDF {}: {message}", path.display())]
    PdfLoad { path: PathBuf, message: String },

    #[error("PDFium library unavailable: {0}")]
    PdfiumUnavailable(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// A processing failure tagged with the serial number of the document it belongs to.
#[derive(Error, Debug)]
#[error("{serial}: {source}")]
pub struct DocumentError {
    pub serial: String,
    #[source]
    pub source: ProcessingError,
}

impl DocumentError {
    pub fn new(serial: impl Into<String>, source: ProcessingError) -> Self {
        Self {
            serial: serial.into(),
            source,
        }
    }

    /// Timeouts may succeed on the next run; everything else needs attention.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.source, ProcessingError::DownloadTimeout { .. })
    }
}

/// Telegram delivery errors
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Telegram request failed")]
    Request(#[from] reqwest::Error),

    #[error("Telegram API error (status {status}): {description}")]
    Api { status: u16, description: String },

    #[error("Failed to read attachment")]
    Io(#[from] std::io::Error),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_display_carries_serial() {
        let error = DocumentError::new(
            "S/2023/418",
            ProcessingError::DownloadTimeout {
                url: "https://undocs.org/ru/S/2023/418".to_string(),
                timeout_secs: 60,
            },
        );

        assert_eq!(
            error.to_string(),
            "S/2023/418: Timed out after 60s downloading https://undocs.org/ru/S/2023/418"
        );
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_pdf_load_is_not_recoverable() {
        let error = DocumentError::new(
            "S/2023/419",
            ProcessingError::PdfLoad {
                path: PathBuf::from("pdf/S-2023-419.pdf"),
                message: "file not found".to_string(),
            },
        );

        assert!(!error.is_recoverable());
    }
}
