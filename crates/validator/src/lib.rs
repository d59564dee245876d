//! # Pagekeeper Validator
//!
//! Read-only auditing of a project's documentation structure: presence of
//! the source document, file size limits, resolvability of file references
//! and the maintained critical block. Findings are reported, never fixed;
//! repair belongs to the organizer.

mod error;
mod validator;

pub use error::{Result, ValidatorError};
pub use validator::{StructureValidator, ValidationReport, ValidationStats};
