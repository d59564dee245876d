use pagekeeper_core::{CategoryTable, Config, DocumentReference};
use pagekeeper_organizer::CriticalTracker;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackOutcome {
    pub success: bool,
    pub critical: Vec<DocumentReference>,
    /// Reference entries newly flagged "READ THIS FIRST!"
    pub flagged: usize,
    pub document_updated: bool,
    pub errors: Vec<String>,
}

/// Discover critical documents and synchronize the source document's
/// critical block and read-first flags.
pub fn track_critical(project_root: &Path, source_path: &Path, config: &Config) -> TrackOutcome {
    let tracker = CriticalTracker::new(CategoryTable::builtin());
    match tracker.track(project_root, source_path, config) {
        Ok(report) => TrackOutcome {
            success: true,
            critical: report.critical,
            flagged: report.flagged,
            document_updated: report.document_updated,
            errors: Vec::new(),
        },
        Err(err) => TrackOutcome {
            success: false,
            critical: Vec::new(),
            flagged: 0,
            document_updated: false,
            errors: vec![err.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn tracks_critical_documents_end_to_end() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("CLAUDE.md");
        fs::write(&source, "# Project\n\nbody\n").unwrap();
        fs::write(temp.path().join("RUNBOOK.md"), "# Runbook\nsteps\n").unwrap();

        let outcome = track_critical(temp.path(), &source, &Config::default());

        assert!(outcome.success, "errors: {:?}", outcome.errors);
        assert_eq!(outcome.critical.len(), 1);
        assert!(outcome.document_updated);
        let text = fs::read_to_string(&source).unwrap();
        assert!(text.contains("## 🚨 CRITICAL DOCUMENTATION"));
        assert!(text.contains("`/RUNBOOK.md`"));
    }

    #[test]
    fn missing_source_reports_failure() {
        let temp = tempdir().unwrap();
        let outcome = track_critical(temp.path(), &temp.path().join("CLAUDE.md"), &Config::default());
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
    }
}
