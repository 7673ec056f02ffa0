use super::DocumentKind;

/// Feed description marker of the Secretary-General's summary statement
const SUMMARY_STATEMENT: &str = "SUMMARY STATEMENT BY THE SECRETARY-GENERAL OF MATTERS";

/// Agenda entries are announcements, not documents.
pub fn is_excluded(serial: &str) -> bool {
    serial.contains("AGENDA")
}

/// Classify a feed entry. The first matching rule wins.
pub fn classify(serial: &str, description: &str) -> DocumentKind {
    if serial.contains("PV") {
        DocumentKind::Transcript
    } else if serial.contains("RES") {
        DocumentKind::Resolution
    } else if description.contains("DRAFT RESOLUTION") {
        DocumentKind::DraftResolution
    } else if description.contains("REPORT") {
        DocumentKind::Report
    } else if description.contains(SUMMARY_STATEMENT) {
        DocumentKind::CouncilWorkReport
    } else {
        DocumentKind::Letter
    }
}
