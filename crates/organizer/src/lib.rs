//! # Pagekeeper Organizer
//!
//! Executes extraction plans against the filesystem and keeps the source
//! document's embedded blocks synchronized:
//!
//! - [`Organizer`]: writes extracted sections to the docs folder and
//!   rebuilds the source document in a single filter pass
//! - [`ReferenceSynchronizer`]: full-block replacement of the reference
//!   index (idempotent)
//! - [`CriticalTracker`]: project-wide critical document discovery, the
//!   critical documentation block, and read-first flag back-propagation
//! - [`MarkedBlock`]: the one primitive behind both maintained blocks
//!
//! The source document is the only shared resource; every live
//! read-modify-write runs under the core advisory lock, taken before the
//! document snapshot is read.

mod block;
mod critical;
mod error;
mod organize;
mod reference;

pub use block::{InsertAt, MarkedBlock};
pub use critical::{CriticalTracker, TrackReport};
pub use error::{OrganizerError, Result};
pub use organize::{ApplyOutcome, Organizer};
pub use reference::{format_entry, parse_entries, ReferenceSynchronizer};
