//! # Pagekeeper Core
//!
//! Shared data model and thin I/O for the document organization pipeline:
//!
//! - [`Category`] / [`CategoryTable`]: topical buckets used for scoring
//! - [`Document`]: a markdown file as an ordered line sequence
//! - [`DocumentReference`]: one entry of the maintained reference index
//! - [`ValidationIssue`]: read-only audit findings
//! - [`Config`]: thresholds, organization, patterns and monitoring options
//! - [`MarkdownScanner`]: gitignore-aware project walker
//! - [`SourceLock`]: per-path advisory write lock
//!
//! Everything here is plain data plus single-pass file reads/writes; the
//! analysis and rewriting logic lives in the `analyzer`, `organizer` and
//! `validator` crates.

mod config;
mod error;
mod lock;
pub mod markers;
mod scanner;
mod types;

pub use config::{
    Config, MonitoringConfig, OrganizationConfig, PatternConfig, ThresholdConfig,
};
pub use error::{CoreError, Result};
pub use lock::SourceLock;
pub use scanner::MarkdownScanner;
pub use types::{
    Category, CategoryTable, Document, DocumentReference, IssueKind, ValidationIssue,
    DEFAULT_CATEGORY_ID,
};
