use anyhow::Context;
use pagekeeper_analyzer::Planner;
use pagekeeper_core::{CategoryTable, Config, Document, DocumentReference, SourceLock};
use pagekeeper_organizer::Organizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of the full plan-and-apply pass over one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOutcome {
    pub success: bool,
    pub line_count: usize,
    pub needs_extraction: bool,
    pub dry_run: bool,
    pub extracted_files: Vec<PathBuf>,
    pub references: Vec<DocumentReference>,
    pub errors: Vec<String>,
}

/// Analyze the source document and extract every suggested section.
///
/// A document under the extraction threshold succeeds trivially with no
/// files written. Partial failures surface as `success: false` with
/// `extracted_files` still listing what DID land.
pub fn organize(
    project_root: &Path,
    source_path: &Path,
    config: &Config,
    dry_run: bool,
) -> OrganizeOutcome {
    match run(project_root, source_path, config, dry_run) {
        Ok(outcome) => outcome,
        Err(err) => OrganizeOutcome {
            success: false,
            line_count: 0,
            needs_extraction: false,
            dry_run,
            extracted_files: Vec::new(),
            references: Vec::new(),
            errors: vec![format!("{err:#}")],
        },
    }
}

fn run(
    project_root: &Path,
    source_path: &Path,
    config: &Config,
    dry_run: bool,
) -> anyhow::Result<OrganizeOutcome> {
    // the plan is only valid against the snapshot read under this lock,
    // so in live mode it is taken before the load, not at apply time
    let _lock = if dry_run {
        None
    } else {
        Some(
            SourceLock::acquire(source_path)
                .with_context(|| format!("locking {}", source_path.display()))?,
        )
    };
    let document = Document::load(source_path)
        .with_context(|| format!("loading {}", source_path.display()))?;

    let table = CategoryTable::builtin();
    let report = Planner::new(table.clone()).plan(&document, config);
    log::info!(
        "{}: {} lines, {} suggestion(s)",
        source_path.display(),
        report.line_count,
        report.suggestions.len()
    );

    if !report.needs_extraction {
        return Ok(OrganizeOutcome {
            success: true,
            line_count: report.line_count,
            needs_extraction: false,
            dry_run,
            extracted_files: Vec::new(),
            references: Vec::new(),
            errors: Vec::new(),
        });
    }

    let applied = Organizer::new(table).apply(
        &document,
        &report.suggestions,
        config,
        project_root,
        dry_run,
    );

    Ok(OrganizeOutcome {
        success: applied.success(),
        line_count: report.line_count,
        needs_extraction: true,
        dry_run,
        extracted_files: applied.extracted_files,
        references: applied.updated_references,
        errors: applied.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn oversized_source(root: &Path) -> PathBuf {
        let mut text = String::from("# Project\n\n## Security\n");
        for _ in 0..60 {
            text.push_str("auth token handling\n");
        }
        for _ in 0..160 {
            text.push_str("general notes\n");
        }
        let path = root.join("CLAUDE.md");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn small_documents_succeed_without_extraction() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("CLAUDE.md");
        fs::write(&source, "# Project\n\nshort\n").unwrap();

        let outcome = organize(temp.path(), &source, &Config::default(), false);
        assert!(outcome.success);
        assert!(!outcome.needs_extraction);
        assert_eq!(outcome.line_count, 3);
        assert!(outcome.extracted_files.is_empty());
    }

    #[test]
    fn oversized_documents_get_extracted() {
        let temp = tempdir().unwrap();
        let source = oversized_source(temp.path());

        let outcome = organize(temp.path(), &source, &Config::default(), false);
        assert!(outcome.success, "errors: {:?}", outcome.errors);
        assert!(outcome.needs_extraction);
        assert_eq!(outcome.extracted_files.len(), 1);
        assert!(temp.path().join("docs/SECURITY.md").is_file());
        assert_eq!(outcome.references[0].path, "/docs/SECURITY.md");
    }

    #[test]
    fn live_runs_read_the_document_only_after_taking_the_lock() {
        let temp = tempdir().unwrap();
        let source = oversized_source(temp.path());

        let held = SourceLock::acquire(&source).unwrap();
        let worker = {
            let root = temp.path().to_path_buf();
            let source = source.clone();
            std::thread::spawn(move || organize(&root, &source, &Config::default(), false))
        };

        // edit the document while the worker is blocked on the lock; the
        // worker must see this edit once it gets through
        std::thread::sleep(std::time::Duration::from_millis(100));
        let mut text = fs::read_to_string(&source).unwrap();
        text.push_str("## Changelog\nkept entry\n");
        fs::write(&source, text).unwrap();
        drop(held);

        let outcome = worker.join().unwrap();
        assert!(outcome.success, "errors: {:?}", outcome.errors);
        let updated = fs::read_to_string(&source).unwrap();
        assert!(updated.contains("## Changelog"));
        assert!(updated.contains("kept entry"));
    }

    #[test]
    fn missing_source_reports_failure_instead_of_panicking() {
        let temp = tempdir().unwrap();
        let outcome = organize(
            temp.path(),
            &temp.path().join("CLAUDE.md"),
            &Config::default(),
            false,
        );
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
    }
}
