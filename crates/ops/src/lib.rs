//! # Pagekeeper Ops
//!
//! The callable operations of the pipeline, one module per operation. Every
//! function returns a serializable outcome struct carrying `success` and
//! `errors`; internal failures are converted into those fields and never
//! cross the boundary as panics, so callers (the CLI, embedding hosts) can
//! serialize whatever comes back.

mod critical;
mod extract;
mod organize;
mod reference;
mod suggest;
mod validate;

pub use critical::{track_critical, TrackOutcome};
pub use extract::{extract, ExtractOutcome, ExtractRequest};
pub use organize::{organize, OrganizeOutcome};
pub use reference::{create_reference, ReferenceOutcome, ReferenceRequest};
pub use suggest::{suggest_improvements, SuggestOutcome};
pub use validate::{validate, ValidateOutcome};
