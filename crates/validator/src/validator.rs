use crate::Result;
use once_cell::sync::Lazy;
use pagekeeper_core::markers::{CRITICAL_MARKER, REFERENCE_MARKER_ALIASES};
use pagekeeper_core::{Config, Document, IssueKind, MarkdownScanner, ValidationIssue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The document every project is expected to carry at its root.
const SOURCE_FILE_NAME: &str = "CLAUDE.md";

// Inline code spans that look like file references. Extensions limited to
// the formats documentation actually points at; bare identifiers in
// backticks stay untouched.
static FILE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([^`\s]+\.(?:md|mdx|markdown|txt|json|ya?ml|toml))`")
        .expect("valid file reference regex")
});

/// Counters describing the scope of one audit pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationStats {
    pub files_scanned: usize,
    pub total_lines: usize,
    pub references_checked: usize,
    /// Root-relative path of the largest file seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_file: Option<String>,
    pub largest_file_lines: usize,
}

/// Outcome of one audit pass. `valid` is simply "no issues".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub stats: ValidationStats,
}

impl ValidationReport {
    fn new(issues: Vec<ValidationIssue>, stats: ValidationStats) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
            stats,
        }
    }
}

/// Audits a project's documentation without modifying anything.
pub struct StructureValidator;

impl StructureValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the full audit: source document presence, per-file size limits,
    /// file reference resolvability and the critical block requirement.
    ///
    /// A project without its source document short-circuits to exactly one
    /// `missing_file` issue; nothing else is worth reporting about a
    /// project that has not been set up.
    pub fn validate(&self, project_root: &Path, config: &Config) -> Result<ValidationReport> {
        let source_path = project_root.join(SOURCE_FILE_NAME);
        if !source_path.is_file() {
            let issue = ValidationIssue::new(
                IssueKind::MissingFile,
                format!("/{SOURCE_FILE_NAME}"),
                format!("{SOURCE_FILE_NAME} not found at project root"),
            );
            return Ok(ValidationReport::new(vec![issue], ValidationStats::default()));
        }

        let mut issues = Vec::new();
        let mut stats = ValidationStats::default();

        for path in MarkdownScanner::new(project_root).scan() {
            let document = match Document::load(&path) {
                Ok(document) => document,
                Err(err) => {
                    log::warn!("Skipping unreadable {}: {err}", path.display());
                    continue;
                }
            };
            stats.files_scanned += 1;
            stats.total_lines += document.line_count();
            let display = root_relative(project_root, &path);
            if document.line_count() > stats.largest_file_lines {
                stats.largest_file_lines = document.line_count();
                stats.largest_file = Some(display.clone());
            }

            if document.line_count() > config.thresholds.claude_md_max_lines {
                issues.push(ValidationIssue::new(
                    IssueKind::OversizedFile,
                    display.clone(),
                    format!(
                        "{} lines exceeds the {}-line limit",
                        document.line_count(),
                        config.thresholds.claude_md_max_lines
                    ),
                ));
            }

            if config.monitoring.validate_links {
                self.check_references(project_root, &path, &document, &display, &mut issues, &mut stats);
            }
        }

        // both maintained blocks are required in the source document when
        // critical-section enforcement is on
        if config.patterns.enforce_critical_section {
            let source = Document::load(&source_path)?;
            if !contains_marker(&source, &[CRITICAL_MARKER]) {
                issues.push(ValidationIssue::new(
                    IssueKind::MissingCriticalSection,
                    format!("/{SOURCE_FILE_NAME}"),
                    "critical documentation block is required but missing".to_string(),
                ));
            }
            if !contains_marker(&source, REFERENCE_MARKER_ALIASES) {
                issues.push(ValidationIssue::new(
                    IssueKind::MissingCriticalSection,
                    format!("/{SOURCE_FILE_NAME}"),
                    "documentation reference block is required but missing".to_string(),
                ));
            }
        }

        Ok(ValidationReport::new(issues, stats))
    }

    /// Flag inline file references that resolve to nothing. References with
    /// a leading `/` resolve against the project root; relative ones are
    /// tried against the containing file's directory first, then the root.
    fn check_references(
        &self,
        project_root: &Path,
        path: &Path,
        document: &Document,
        display: &str,
        issues: &mut Vec<ValidationIssue>,
        stats: &mut ValidationStats,
    ) {
        for (idx, line) in document.lines.iter().enumerate() {
            for caps in FILE_REFERENCE.captures_iter(line) {
                let reference = &caps[1];
                stats.references_checked += 1;
                if resolves(project_root, path, reference) {
                    continue;
                }
                issues.push(
                    ValidationIssue::new(
                        IssueKind::BrokenReference,
                        display.to_string(),
                        format!("reference `{reference}` does not resolve to a file"),
                    )
                    .at_line(idx + 1),
                );
            }
        }
    }
}

impl Default for StructureValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_marker(document: &Document, markers: &[&str]) -> bool {
    document.lines.iter().any(|line| {
        let lowered = line.to_lowercase();
        markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    })
}

fn resolves(project_root: &Path, containing: &Path, reference: &str) -> bool {
    if let Some(rooted) = reference.strip_prefix('/') {
        return project_root.join(rooted).is_file();
    }
    if let Some(parent) = containing.parent() {
        if parent.join(reference).is_file() {
            return true;
        }
    }
    project_root.join(reference).is_file()
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
