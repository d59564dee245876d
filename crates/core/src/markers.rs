//! Marker phrases anchoring the maintained markdown blocks.
//!
//! Both blocks are plain text embedded in the source document; these
//! constants are the only coupling between the writers (organizer) and the
//! auditor (validator).

/// Heading emitted when the reference block is created.
pub const REFERENCE_BLOCK_HEADING: &str = "## 📚 DOCUMENTATION REFERENCES";

/// Accepted spellings locating an existing reference block. Matched
/// case-insensitively as a substring of a line.
pub const REFERENCE_MARKER_ALIASES: &[&str] = &["DOCUMENTATION REFERENCES", "DOCUMENTATION INDEX"];

/// Heading emitted when the critical documentation block is created.
pub const CRITICAL_BLOCK_HEADING: &str = "## 🚨 CRITICAL DOCUMENTATION";

/// Marker locating the critical documentation block.
pub const CRITICAL_MARKER: &str = "CRITICAL DOCUMENTATION";

/// Suffix appended to reference entries pointing at critical documents.
pub const READ_FIRST_SUFFIX: &str = " 🚨 READ THIS FIRST!";
