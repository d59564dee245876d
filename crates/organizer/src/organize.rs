use crate::ReferenceSynchronizer;
use pagekeeper_analyzer::ExtractionSuggestion;
use pagekeeper_core::{CategoryTable, Config, Document, DocumentReference};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Result of applying an extraction plan.
///
/// A partially-failed apply keeps going: per-suggestion failures land in
/// `errors` while sibling suggestions are still processed, and
/// `extracted_files` lists the files that DID get written so the caller can
/// decide whether to retry or roll back manually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub extracted_files: Vec<PathBuf>,
    pub updated_references: Vec<DocumentReference>,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

impl ApplyOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Executes extraction suggestions against the filesystem.
pub struct Organizer {
    table: CategoryTable,
}

impl Organizer {
    #[must_use]
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    /// Apply `suggestions` to `document`.
    ///
    /// Suggestions carry line numbers valid only against this exact
    /// snapshot, so the whole batch is applied in one pass keyed off the
    /// original indices: extracted ranges are filtered out of the line
    /// array while each range's start position emits a single replacement
    /// line. Nothing is spliced incrementally.
    ///
    /// In dry-run mode no file is touched and only the would-be targets are
    /// reported. In live mode the caller holds the per-path advisory lock
    /// across the snapshot read and this call, so the snapshot cannot go
    /// stale between load and rewrite; reference-block insertion is
    /// delegated to [`ReferenceSynchronizer`] (never written here).
    pub fn apply(
        &self,
        document: &Document,
        suggestions: &[ExtractionSuggestion],
        config: &Config,
        project_root: &Path,
        dry_run: bool,
    ) -> ApplyOutcome {
        let docs_dir = config.docs_dir(project_root);
        let mut outcome = ApplyOutcome {
            extracted_files: Vec::new(),
            updated_references: Vec::new(),
            errors: Vec::new(),
            dry_run,
        };

        // (start, end, replacement) for every suggestion that landed
        let mut extracted: Vec<(usize, usize, String)> = Vec::new();

        for suggestion in suggestions {
            if let Err(message) = self.check_range(document, suggestion, &extracted) {
                log::warn!("Skipping {}: {message}", suggestion.suggested_file_name);
                outcome.errors.push(message);
                continue;
            }

            let target = docs_dir.join(&suggestion.suggested_file_name);
            let title = section_title(document, suggestion);
            let reference_path = config.reference_path(&suggestion.suggested_file_name);

            if dry_run {
                log::debug!("Would extract {} to {}", title, target.display());
            } else if let Err(err) = write_section(document, suggestion, &docs_dir, &target) {
                outcome
                    .errors
                    .push(format!("{}: {err}", target.display()));
                continue;
            }

            extracted.push((
                suggestion.start_line,
                suggestion.end_line,
                format!("> **Extracted**: [{title}]({reference_path})"),
            ));
            outcome.extracted_files.push(target);
            outcome.updated_references.push(
                DocumentReference::new(
                    reference_path,
                    suggestion.category.clone(),
                    self.table.emoji_for(&suggestion.category),
                    title,
                )
                .critical(suggestion.category == "critical"),
            );
        }

        if dry_run || extracted.is_empty() {
            return outcome;
        }

        let rewritten = rebuild_document(document, &extracted);
        let synced = if config.organization.auto_reference {
            ReferenceSynchronizer::new(self.table.clone(), config.organization.use_emojis)
                .upsert_references(&rewritten, &outcome.updated_references)
        } else {
            rewritten
        };

        if let Err(err) = synced.save() {
            outcome
                .errors
                .push(format!("{}: {err}", document.path.display()));
        }

        outcome
    }

    fn check_range(
        &self,
        document: &Document,
        suggestion: &ExtractionSuggestion,
        accepted: &[(usize, usize, String)],
    ) -> Result<(), String> {
        if suggestion.start_line > suggestion.end_line
            || suggestion.end_line >= document.line_count()
        {
            return Err(format!(
                "range {}..={} is outside the document snapshot ({} lines)",
                suggestion.start_line,
                suggestion.end_line,
                document.line_count()
            ));
        }
        let overlaps = accepted.iter().any(|(start, end, _)| {
            suggestion.start_line <= *end && *start <= suggestion.end_line
        });
        if overlaps {
            return Err(format!(
                "range {}..={} overlaps an already extracted range",
                suggestion.start_line, suggestion.end_line
            ));
        }
        Ok(())
    }
}

fn section_title(document: &Document, suggestion: &ExtractionSuggestion) -> String {
    let heading = &document.lines[suggestion.start_line];
    let title = heading.trim_start_matches('#').trim();
    if title.is_empty() {
        suggestion
            .suggested_file_name
            .trim_end_matches(".md")
            .to_string()
    } else {
        title.to_string()
    }
}

/// Write the raw section lines verbatim, joined by newlines.
fn write_section(
    document: &Document,
    suggestion: &ExtractionSuggestion,
    docs_dir: &Path,
    target: &Path,
) -> std::io::Result<()> {
    std::fs::create_dir_all(docs_dir)?;
    let body = document.lines[suggestion.start_line..=suggestion.end_line].join("\n");
    std::fs::write(target, body)
}

/// Build the new document in a single filter pass over original indices.
fn rebuild_document(document: &Document, extracted: &[(usize, usize, String)]) -> Document {
    let mut lines = Vec::with_capacity(document.line_count());
    for (idx, line) in document.lines.iter().enumerate() {
        if let Some((_, _, replacement)) = extracted
            .iter()
            .find(|(start, _, _)| *start == idx)
        {
            lines.push(replacement.clone());
            continue;
        }
        if extracted
            .iter()
            .any(|(start, end, _)| idx > *start && idx <= *end)
        {
            continue;
        }
        lines.push(line.clone());
    }
    document.with_lines(lines)
}
