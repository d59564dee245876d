use pagekeeper_core::{Config, ValidationIssue};
use pagekeeper_validator::{StructureValidator, ValidationStats};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateOutcome {
    /// Whether the audit itself ran; a project full of issues still audits
    /// successfully
    pub success: bool,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub stats: ValidationStats,
    pub errors: Vec<String>,
}

/// Audit the project's documentation structure.
pub fn validate(project_root: &Path, config: &Config) -> ValidateOutcome {
    match StructureValidator::new().validate(project_root, config) {
        Ok(report) => ValidateOutcome {
            success: true,
            valid: report.valid,
            issues: report.issues,
            stats: report.stats,
            errors: Vec::new(),
        },
        Err(err) => ValidateOutcome {
            success: false,
            valid: false,
            issues: Vec::new(),
            stats: ValidationStats::default(),
            errors: vec![err.to_string()],
        },
    }
}
