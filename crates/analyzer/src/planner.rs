use crate::{segment, Classifier};
use pagekeeper_core::{CategoryTable, Config, Document};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A proposed split of one section into its own file.
///
/// Line numbers are valid only against the document snapshot the plan was
/// computed from; applying any extraction stales every other suggestion, so
/// a whole plan must be applied in a single pass from the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionSuggestion {
    pub category: String,
    pub start_line: usize,
    pub end_line: usize,
    pub suggested_file_name: String,
    pub reason: String,
}

/// Outcome of planning one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Total line count of the analyzed snapshot, reported even when no
    /// extraction is needed
    pub line_count: usize,
    pub needs_extraction: bool,
    pub suggestions: Vec<ExtractionSuggestion>,
}

/// Combines segmentation and classification into extraction suggestions.
pub struct Planner {
    classifier: Classifier,
    clock: fn() -> u64,
}

impl Planner {
    #[must_use]
    pub fn new(table: CategoryTable) -> Self {
        Self::with_clock(table, current_unix_ms)
    }

    /// Inject a clock for the timestamp filename fallback. That fallback is
    /// the only non-deterministic output in the pipeline; tests pin it here.
    #[must_use]
    pub fn with_clock(table: CategoryTable, clock: fn() -> u64) -> Self {
        Self {
            classifier: Classifier::new(table),
            clock,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Decide, per section, whether it is worth splitting out.
    ///
    /// Documents at or under `thresholds.extract_at_lines` produce no
    /// suggestions; otherwise every section with at least
    /// `thresholds.min_section_lines` body lines is classified and mapped to
    /// a deterministic target filename.
    #[must_use]
    pub fn plan(&self, document: &Document, config: &Config) -> AnalysisReport {
        let line_count = document.line_count();
        let needs_extraction = line_count > config.thresholds.extract_at_lines;
        if !needs_extraction {
            log::debug!(
                "{} has {line_count} lines (threshold {}), nothing to extract",
                document.path.display(),
                config.thresholds.extract_at_lines
            );
            return AnalysisReport {
                line_count,
                needs_extraction,
                suggestions: Vec::new(),
            };
        }

        let mut suggestions = Vec::new();
        for section in segment(&document.lines) {
            let body_lines = section.body_line_count();
            if body_lines < config.thresholds.min_section_lines {
                continue;
            }

            let body = section.body_text();
            let (category, score) = self.classifier.classify_scored(&body);
            let label = self.classifier.table().label_for(category).to_string();
            let suggested_file_name = self.file_name_for(&section.title, category);

            suggestions.push(ExtractionSuggestion {
                category: category.to_string(),
                start_line: section.start_line,
                end_line: section.end_line,
                suggested_file_name,
                reason: format!(
                    "Section '{}' has {body_lines} body lines of {label} content \
                     (keyword score {score})",
                    section.title
                ),
            });
        }

        AnalysisReport {
            line_count,
            needs_extraction,
            suggestions,
        }
    }

    fn file_name_for(&self, title: &str, category: &str) -> String {
        let sanitized = sanitize_title(title);
        if sanitized.is_empty() {
            // only reachable for titles with no alphanumeric content
            format!("{}_{}.md", category.to_ascii_uppercase(), (self.clock)())
        } else {
            format!("{sanitized}.md")
        }
    }
}

/// Uppercase the title, collapse non-alphanumeric runs to single
/// underscores, and trim leading/trailing underscores.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_uppercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|dur| u64::try_from(dur.as_millis()).ok())
        .unwrap_or(0)
}
