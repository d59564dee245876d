use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Exactly two markers, then whitespace, then text. `###` never matches
// because its third character is `#`, not whitespace.
static SECTION_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##[ \t]+(\S.*)$").expect("valid boundary regex"));

/// A second-level-heading-delimited span of a document.
///
/// `lines` covers the heading line through the last body line;
/// `start_line`/`end_line` are 0-based indices into the source document,
/// end inclusive. Sections are produced fresh on every call and never
/// mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub start_line: usize,
    pub end_line: usize,
    pub lines: Vec<String>,
}

impl Section {
    /// Lines in the section excluding the heading itself.
    #[must_use]
    pub fn body_line_count(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Body text (everything under the heading) joined with newlines.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.lines[1..].join("\n")
    }
}

/// Partition `lines` into `##`-delimited sections.
///
/// Content before the first boundary is not a section and is discarded.
/// Each section runs from its boundary line to the line before the next
/// boundary; the trailing section is flushed explicitly and extends to the
/// last line of the document. Resulting sections are contiguous and
/// non-overlapping: `sections[n + 1].start_line == sections[n].end_line + 1`.
#[must_use]
pub fn segment(lines: &[String]) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut open: Option<(String, usize)> = None; // (title, start index)

    for (idx, line) in lines.iter().enumerate() {
        let Some(caps) = SECTION_BOUNDARY.captures(line) else {
            continue;
        };
        if let Some((title, start)) = open.take() {
            sections.push(Section {
                title,
                start_line: start,
                end_line: idx - 1,
                lines: lines[start..idx].to_vec(),
            });
        }
        open = Some((caps[1].trim().to_string(), idx));
    }

    // trailing section has no following boundary; flush it to EOF
    if let Some((title, start)) = open {
        sections.push(Section {
            title,
            start_line: start,
            end_line: lines.len() - 1,
            lines: lines[start..].to_vec(),
        });
    }

    sections
}
