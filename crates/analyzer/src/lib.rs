//! # Pagekeeper Analyzer
//!
//! Document analysis pipeline: heading-based segmentation, keyword-count
//! category classification, and extraction planning.
//!
//! ```text
//! Document lines
//!     │
//!     ├──> Segmenter ─> Section[] (## delimited, contiguous)
//!     │
//!     ├──> Classifier (per section body, whole-word keyword counts)
//!     │
//!     └──> Planner ─> AnalysisReport { needs_extraction, suggestions }
//! ```
//!
//! Every stage is pure over its inputs; the only non-deterministic output in
//! the whole pipeline is the timestamp-based filename fallback, isolated
//! behind the planner's injectable clock.

mod classifier;
mod planner;
mod segmenter;

pub use classifier::Classifier;
pub use planner::{sanitize_title, AnalysisReport, ExtractionSuggestion, Planner};
pub use segmenter::{segment, Section};
