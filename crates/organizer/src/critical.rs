use crate::{parse_entries, InsertAt, MarkedBlock, ReferenceSynchronizer, Result};
use pagekeeper_core::markers::{CRITICAL_BLOCK_HEADING, CRITICAL_MARKER};
use pagekeeper_core::{
    CategoryTable, Config, Document, DocumentReference, MarkdownScanner, SourceLock,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Filename words that mark a document as critical. Stems are lowered and
// '-'/'_' normalized to spaces; patterns match whole words only, so
// `terror-notes.md` does not trip on "error".
const CRITICAL_NAME_PATTERNS: &[&str] = &[
    "troubleshooting",
    "emergency",
    "critical",
    "error",
    "errors",
    "setup",
    "getting started",
    "installation",
    "install",
    "deployment",
    "deploy",
    "migration",
    "incident",
    "runbook",
];

// Literal markers scanned for in the first 500 characters of content.
const CRITICAL_CONTENT_MARKERS: &[&str] = &["CRITICAL", "IMPORTANT", "READ THIS FIRST"];

const CONTENT_SCAN_CHARS: usize = 500;

/// Result of one tracking pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackReport {
    /// Critical documents discovered under the project root
    pub critical: Vec<DocumentReference>,
    /// Reference-index entries newly flagged "READ THIS FIRST!"
    pub flagged: usize,
    /// Whether the source document was rewritten
    pub document_updated: bool,
}

/// Scans the project tree for critical documents and keeps the source
/// document's critical block and read-first flags up to date.
pub struct CriticalTracker {
    table: CategoryTable,
    block: MarkedBlock,
}

impl CriticalTracker {
    #[must_use]
    pub fn new(table: CategoryTable) -> Self {
        Self {
            table,
            block: MarkedBlock::new(CRITICAL_BLOCK_HEADING, &[CRITICAL_MARKER]),
        }
    }

    /// Enumerate markdown files under `project_root` (build/vendor scopes
    /// excluded) and return a reference for each one matching the critical
    /// heuristics. `exclude` is the source document itself, which would
    /// otherwise match its own critical block marker.
    pub fn find_critical(
        &self,
        project_root: &Path,
        exclude: Option<&Path>,
    ) -> Vec<DocumentReference> {
        let mut found = Vec::new();
        for path in MarkdownScanner::new(project_root).scan() {
            if exclude.is_some_and(|ex| ex == path) {
                continue;
            }

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!("Skipping unreadable {}: {err}", path.display());
                    continue;
                }
            };
            if !is_critical_name(&path) && !is_critical_content(&content) {
                continue;
            }

            let title = first_heading(&content)
                .unwrap_or_else(|| humanize_stem(&path));
            let emoji = self.table.emoji_for("critical").to_string();
            found.push(
                DocumentReference::new(root_relative(project_root, &path), "critical", emoji, title)
                    .critical(true),
            );
        }
        found
    }

    /// Run a full tracking pass against the source document:
    /// maintain the critical block, then back-propagate read-first flags
    /// onto matching reference-index entries by parsing the entries,
    /// setting their critical field and re-syncing the block (safe to
    /// re-run; a second pass is a no-op).
    pub fn track(
        &self,
        project_root: &Path,
        source_path: &Path,
        config: &Config,
    ) -> Result<TrackReport> {
        let critical = self.find_critical(project_root, Some(source_path));

        let _lock = SourceLock::acquire(source_path)?;
        let original = Document::load(source_path)?;
        let mut document = original.clone();

        let synchronizer =
            ReferenceSynchronizer::new(self.table.clone(), config.organization.use_emojis);

        if config.patterns.enforce_critical_section {
            document = self.upsert_critical_block(&document, &critical, config, &synchronizer);
        }

        let mut flagged = 0;
        if config.patterns.require_read_first_flags {
            (document, flagged) = self.flag_references(&document, &critical, &synchronizer);
        }

        let document_updated = document.lines != original.lines;
        if document_updated {
            document.save()?;
        }

        Ok(TrackReport {
            critical,
            flagged,
            document_updated,
        })
    }

    fn upsert_critical_block(
        &self,
        document: &Document,
        critical: &[DocumentReference],
        config: &Config,
        synchronizer: &ReferenceSynchronizer,
    ) -> Document {
        let entries: Vec<String> = critical
            .iter()
            .map(|reference| crate::format_entry(reference, config.organization.use_emojis))
            .collect();
        // keep the critical block directly above the reference block when
        // one exists
        let insert_at = synchronizer
            .block()
            .locate(&document.lines)
            .map_or(InsertAt::AfterFirstHeading, InsertAt::BeforeLine);
        document.with_lines(self.block.upsert(&document.lines, &entries, insert_at))
    }

    fn flag_references(
        &self,
        document: &Document,
        critical: &[DocumentReference],
        synchronizer: &ReferenceSynchronizer,
    ) -> (Document, usize) {
        let Some(marker_idx) = synchronizer.block().locate(&document.lines) else {
            return (document.clone(), 0);
        };
        let (start, end) = synchronizer.block().entry_span(&document.lines, marker_idx);
        let mut references = parse_entries(&document.lines[start..end], &self.table);

        let mut flagged = 0;
        for reference in &mut references {
            if reference.critical {
                continue;
            }
            if critical.iter().any(|c| c.path == reference.path) {
                reference.critical = true;
                flagged += 1;
            }
        }

        if flagged == 0 {
            return (document.clone(), 0);
        }
        (synchronizer.sync(document, &references), flagged)
    }
}

fn is_critical_name(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
        .replace(['-', '_'], " ");
    let padded = format!(" {stem} ");
    CRITICAL_NAME_PATTERNS
        .iter()
        .any(|pattern| padded.contains(&format!(" {pattern} ")))
}

fn is_critical_content(content: &str) -> bool {
    let head: String = content.chars().take(CONTENT_SCAN_CHARS).collect();
    CRITICAL_CONTENT_MARKERS
        .iter()
        .any(|marker| head.contains(marker))
}

fn first_heading(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix("# ")
            .map(|rest| rest.trim().to_string())
            .filter(|title| !title.is_empty())
    })
}

fn humanize_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
        .replace(['-', '_'], " ");
    stem.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn root_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekeeper_core::{CategoryTable, Config, Document};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn tracker() -> CriticalTracker {
        CriticalTracker::new(CategoryTable::builtin())
    }

    #[test]
    fn critical_filenames_are_detected() {
        assert!(is_critical_name(Path::new("TROUBLESHOOTING.md")));
        assert!(is_critical_name(Path::new("getting-started.md")));
        assert!(is_critical_name(Path::new("db_migration_notes.md")));
        assert!(!is_critical_name(Path::new("CHANGELOG.md")));
        // whole words only
        assert!(!is_critical_name(Path::new("terror-notes.md")));
    }

    #[test]
    fn critical_content_scan_is_bounded() {
        assert!(is_critical_content("something CRITICAL here"));
        let mut long = "x".repeat(600);
        long.push_str("CRITICAL");
        // marker beyond the first 500 chars does not count
        assert!(!is_critical_content(&long));
    }

    #[test]
    fn titles_fall_back_to_humanized_stems() {
        assert_eq!(first_heading("# Emergency Guide\nbody"), Some("Emergency Guide".to_string()));
        assert_eq!(first_heading("no heading"), None);
        assert_eq!(humanize_stem(Path::new("getting-started.md")), "Getting Started");
        assert_eq!(humanize_stem(Path::new("db_migration_notes.md")), "Db Migration Notes");
    }

    #[test]
    fn find_critical_scans_the_tree() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("TROUBLESHOOTING.md"), "# Fixes\n").unwrap();
        fs::write(temp.path().join("notes.md"), "IMPORTANT: read me\n").unwrap();
        fs::write(temp.path().join("plain.md"), "# Plain\nnothing special\n").unwrap();
        fs::write(temp.path().join("CLAUDE.md"), "# Main\nCRITICAL DOCUMENTATION\n").unwrap();

        let found =
            tracker().find_critical(temp.path(), Some(&temp.path().join("CLAUDE.md")));
        let mut paths: Vec<_> = found.iter().map(|r| r.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["/TROUBLESHOOTING.md", "/notes.md"]);
        assert!(found.iter().all(|r| r.critical));
    }

    #[test]
    fn track_creates_critical_block_and_flags_references() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("CLAUDE.md");
        let docs = temp.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("SETUP.md"), "# Setup Guide\nsteps\n").unwrap();

        // a source document whose reference block already mentions the
        // setup doc, unflagged
        let doc = Document::from_text(
            &source,
            "# Project\n\n## 📚 DOCUMENTATION REFERENCES\n- **📋 Setup Guide**: `/docs/SETUP.md`\n\nbody\n",
        );
        doc.save().unwrap();

        let report = tracker()
            .track(temp.path(), &source, &Config::default())
            .unwrap();

        assert_eq!(report.critical.len(), 1);
        assert_eq!(report.flagged, 1);
        assert!(report.document_updated);

        let updated = Document::load(&source).unwrap();
        assert!(updated
            .lines
            .iter()
            .any(|l| l.contains("CRITICAL DOCUMENTATION")));
        assert!(updated
            .lines
            .iter()
            .any(|l| l.contains("`/docs/SETUP.md`") && l.ends_with("🚨 READ THIS FIRST!")));
    }

    #[test]
    fn critical_block_stays_below_the_title() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("CLAUDE.md");
        fs::write(temp.path().join("RUNBOOK.md"), "# Runbook\nsteps\n").unwrap();

        // reference block sits directly under the title, no blank between
        let doc = Document::from_text(
            &source,
            "# Project\n## 📚 DOCUMENTATION REFERENCES\n- **✅ Notes**: `/NOTES.md`\n\nbody\n",
        );
        doc.save().unwrap();

        tracker()
            .track(temp.path(), &source, &Config::default())
            .unwrap();

        let updated = Document::load(&source).unwrap();
        assert_eq!(updated.lines[0], "# Project");
        let critical_idx = updated
            .lines
            .iter()
            .position(|l| l.contains("CRITICAL DOCUMENTATION"))
            .unwrap();
        let reference_idx = updated
            .lines
            .iter()
            .position(|l| l.contains("DOCUMENTATION REFERENCES"))
            .unwrap();
        assert!(critical_idx < reference_idx);
    }

    #[test]
    fn track_twice_is_a_no_op() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("CLAUDE.md");
        fs::write(temp.path().join("EMERGENCY.md"), "# Emergency\nhelp\n").unwrap();
        Document::from_text(&source, "# Project\n\nbody\n")
            .save()
            .unwrap();

        let config = Config::default();
        let first = tracker().track(temp.path(), &source, &config).unwrap();
        assert!(first.document_updated);
        let after_first = fs::read_to_string(&source).unwrap();

        let second = tracker().track(temp.path(), &source, &config).unwrap();
        assert!(!second.document_updated);
        assert_eq!(fs::read_to_string(&source).unwrap(), after_first);
    }
}
