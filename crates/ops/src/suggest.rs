use anyhow::Context;
use pagekeeper_analyzer::{segment, ExtractionSuggestion, Planner};
use pagekeeper_core::markers::{CRITICAL_MARKER, REFERENCE_MARKER_ALIASES};
use pagekeeper_core::{CategoryTable, Config, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only analysis of the source document: statistics, category
/// distribution and human-readable recommendations. Nothing is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestOutcome {
    pub success: bool,
    pub line_count: usize,
    pub section_count: usize,
    pub needs_extraction: bool,
    /// Sections per classified category
    pub category_distribution: BTreeMap<String, usize>,
    pub suggestions: Vec<ExtractionSuggestion>,
    pub recommendations: Vec<String>,
    pub errors: Vec<String>,
}

pub fn suggest_improvements(
    project_root: &Path,
    source_path: &Path,
    config: &Config,
) -> SuggestOutcome {
    match run(project_root, source_path, config) {
        Ok(outcome) => outcome,
        Err(err) => SuggestOutcome {
            success: false,
            line_count: 0,
            section_count: 0,
            needs_extraction: false,
            category_distribution: BTreeMap::new(),
            suggestions: Vec::new(),
            recommendations: Vec::new(),
            errors: vec![format!("{err:#}")],
        },
    }
}

fn run(project_root: &Path, source_path: &Path, config: &Config) -> anyhow::Result<SuggestOutcome> {
    log::debug!(
        "Analyzing {} in {}",
        source_path.display(),
        project_root.display()
    );
    let document = Document::load(source_path)
        .with_context(|| format!("loading {}", source_path.display()))?;

    let planner = Planner::new(CategoryTable::builtin());
    let report = planner.plan(&document, config);

    let sections = segment(&document.lines);
    let mut category_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for section in &sections {
        let category = planner.classifier().classify(&section.body_text());
        *category_distribution.entry(category.to_string()).or_default() += 1;
    }

    let mut recommendations = Vec::new();
    if report.line_count > config.thresholds.claude_md_max_lines {
        recommendations.push(format!(
            "Document has {} lines, above the {}-line limit",
            report.line_count, config.thresholds.claude_md_max_lines
        ));
    }
    for suggestion in &report.suggestions {
        recommendations.push(format!(
            "Extract to {}: {}",
            config.reference_path(&suggestion.suggested_file_name),
            suggestion.reason
        ));
    }
    if !has_marker(&document, REFERENCE_MARKER_ALIASES) {
        recommendations
            .push("Add a documentation reference block to index extracted files".to_string());
    }
    if config.patterns.enforce_critical_section && !has_marker(&document, &[CRITICAL_MARKER]) {
        recommendations
            .push("Add a critical documentation block listing must-read files".to_string());
    }

    Ok(SuggestOutcome {
        success: true,
        line_count: report.line_count,
        section_count: sections.len(),
        needs_extraction: report.needs_extraction,
        category_distribution,
        suggestions: report.suggestions,
        recommendations,
        errors: Vec::new(),
    })
}

fn has_marker(document: &Document, markers: &[&str]) -> bool {
    document.lines.iter().any(|line| {
        let lowered = line.to_lowercase();
        markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    })
}
