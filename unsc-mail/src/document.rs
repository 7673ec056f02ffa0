//! Security Council documents and their caption formats.
//!
//! Every document is classified into exactly one [`DocumentKind`] from its serial number
//! and feed description. The kind decides which page regions are read and how the
//! caption is composed.

mod classify;
mod format;
mod markers;

use std::path::PathBuf;

pub use classify::{classify, is_excluded};
pub use format::{FormatContext, FormattedMessage, format_message};
pub use markers::MarkerSet;

/// Document types with their own caption layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Letter,
    Resolution,
    DraftResolution,
    Transcript,
    Report,
    CouncilWorkReport,
}

/// A downloaded document waiting to be summarized
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Serial number, e.g. `S/2023/418`
    pub serial: String,
    /// Downloaded PDF
    pub file_path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(serial: impl Into<String>, file_path: PathBuf, kind: DocumentKind) -> Self {
        Self {
            serial: serial.into(),
            file_path,
            kind,
        }
    }
}
