use anyhow::Context;
use pagekeeper_analyzer::{sanitize_title, segment, Classifier, ExtractionSuggestion};
use pagekeeper_core::{CategoryTable, Config, Document, DocumentReference, SourceLock};
use pagekeeper_organizer::Organizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to pull out: an explicit 0-based inclusive line range, or every
/// section classified under a category. Explicit extraction bypasses the
/// planner's section-size floor entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub category: Option<String>,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutcome {
    pub success: bool,
    pub extracted_files: Vec<PathBuf>,
    pub references: Vec<DocumentReference>,
    pub errors: Vec<String>,
}

impl ExtractOutcome {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            extracted_files: Vec::new(),
            references: Vec::new(),
            errors: vec![message],
        }
    }
}

/// Extract content on explicit request, skipping the planner's thresholds.
pub fn extract(
    project_root: &Path,
    source_path: &Path,
    config: &Config,
    request: &ExtractRequest,
) -> ExtractOutcome {
    match run(project_root, source_path, config, request) {
        Ok(outcome) => outcome,
        Err(err) => ExtractOutcome::failure(format!("{err:#}")),
    }
}

fn run(
    project_root: &Path,
    source_path: &Path,
    config: &Config,
    request: &ExtractRequest,
) -> anyhow::Result<ExtractOutcome> {
    // extraction is always live; lock before reading the snapshot
    let _lock = SourceLock::acquire(source_path)
        .with_context(|| format!("locking {}", source_path.display()))?;
    let document = Document::load(source_path)
        .with_context(|| format!("loading {}", source_path.display()))?;
    let table = CategoryTable::builtin();
    let classifier = Classifier::new(table.clone());

    let suggestions = match (request.start_line, request.end_line) {
        (Some(start), Some(end)) => {
            vec![range_suggestion(&document, &classifier, request, start, end)]
        }
        (None, None) => {
            let Some(category) = request.category.as_deref() else {
                return Ok(ExtractOutcome::failure(
                    "either a line range or a category is required".to_string(),
                ));
            };
            let matched = category_suggestions(&document, &classifier, category);
            if matched.is_empty() {
                return Ok(ExtractOutcome::failure(format!(
                    "no sections classified as '{category}'"
                )));
            }
            matched
        }
        _ => {
            return Ok(ExtractOutcome::failure(
                "startLine and endLine must be given together".to_string(),
            ));
        }
    };

    let applied =
        Organizer::new(table).apply(&document, &suggestions, config, project_root, false);
    Ok(ExtractOutcome {
        success: applied.success(),
        extracted_files: applied.extracted_files,
        references: applied.updated_references,
        errors: applied.errors,
    })
}

/// One suggestion for an explicit range. The range need not start at a
/// heading; the filename falls back to the category when it does not.
fn range_suggestion(
    document: &Document,
    classifier: &Classifier,
    request: &ExtractRequest,
    start: usize,
    end: usize,
) -> ExtractionSuggestion {
    let body = document
        .lines
        .get(start..=end.min(document.line_count().saturating_sub(1)))
        .unwrap_or_default()
        .join("\n");
    let category = request
        .category
        .clone()
        .unwrap_or_else(|| classifier.classify(&body).to_string());

    let title = document
        .lines
        .get(start)
        .map(|line| line.trim_start_matches('#').trim())
        .unwrap_or_default();
    let suggested_file_name = file_name(title, &category);

    ExtractionSuggestion {
        category,
        start_line: start,
        end_line: end,
        suggested_file_name,
        reason: "explicitly requested range".to_string(),
    }
}

/// Every section whose classified category matches, regardless of size.
fn category_suggestions(
    document: &Document,
    classifier: &Classifier,
    category: &str,
) -> Vec<ExtractionSuggestion> {
    segment(&document.lines)
        .into_iter()
        .filter(|section| classifier.classify(&section.body_text()) == category)
        .map(|section| ExtractionSuggestion {
            category: category.to_string(),
            start_line: section.start_line,
            end_line: section.end_line,
            suggested_file_name: file_name(&section.title, category),
            reason: format!("explicitly requested '{category}' content"),
        })
        .collect()
}

fn file_name(title: &str, category: &str) -> String {
    let sanitized = sanitize_title(title);
    if sanitized.is_empty() {
        format!("{}.md", category.to_ascii_uppercase())
    } else {
        format!("{sanitized}.md")
    }
}
