/// Where to place a block that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    /// Directly after the document's first top-level heading (or at the top
    /// of the document when there is none)
    AfterFirstHeading,
    /// Directly before the given line index
    BeforeLine(usize),
}

/// A maintained "tagged block of formatted entries" inside a markdown
/// document: a marker heading followed by entry lines, terminated by the
/// first blank line or heading.
///
/// Both the reference index and the critical documentation block are
/// instances of this primitive; they differ only in marker text and in how
/// their entries are formatted and sorted. Replacement is wholesale, never
/// a merge, which is what makes repeated synchronization byte-identical.
#[derive(Debug, Clone)]
pub struct MarkedBlock {
    heading: String,
    markers: Vec<String>,
}

impl MarkedBlock {
    /// `heading` is emitted when the block is created; `markers` are the
    /// accepted spellings used to find an existing block, matched
    /// case-insensitively as substrings.
    pub fn new(heading: impl Into<String>, markers: &[&str]) -> Self {
        Self {
            heading: heading.into(),
            markers: markers.iter().map(|m| m.to_lowercase()).collect(),
        }
    }

    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Index of the marker line, if the block exists.
    #[must_use]
    pub fn locate(&self, lines: &[String]) -> Option<usize> {
        lines.iter().position(|line| {
            let lowered = line.to_lowercase();
            self.markers.iter().any(|marker| lowered.contains(marker))
        })
    }

    /// Entry span following the marker: `[start, end)` where `end` is the
    /// first blank line or heading after the marker (or EOF).
    #[must_use]
    pub fn entry_span(&self, lines: &[String], marker_idx: usize) -> (usize, usize) {
        let start = marker_idx + 1;
        let end = lines[start..]
            .iter()
            .position(|line| line.trim().is_empty() || line.starts_with('#'))
            .map_or(lines.len(), |offset| start + offset);
        (start, end)
    }

    /// Replace the block's entries with `entries`, creating the block at
    /// `insert_at` when it does not exist. Returns a new line array; the
    /// input is never mutated.
    #[must_use]
    pub fn upsert(&self, lines: &[String], entries: &[String], insert_at: InsertAt) -> Vec<String> {
        if let Some(marker_idx) = self.locate(lines) {
            let (start, end) = self.entry_span(lines, marker_idx);
            let mut out = Vec::with_capacity(lines.len() + entries.len());
            out.extend_from_slice(&lines[..start]);
            out.extend_from_slice(entries);
            out.extend_from_slice(&lines[end..]);
            return out;
        }

        let at = match insert_at {
            InsertAt::AfterFirstHeading => lines
                .iter()
                .position(|line| line.starts_with("# "))
                .map_or(0, |idx| idx + 1),
            InsertAt::BeforeLine(idx) => idx.min(lines.len()),
        };

        // reuse adjacent blank lines instead of stacking new ones
        let mut out = Vec::with_capacity(lines.len() + entries.len() + 3);
        out.extend_from_slice(&lines[..at]);
        if at > 0 && !lines[at - 1].trim().is_empty() {
            out.push(String::new());
        }
        out.push(self.heading.clone());
        out.extend_from_slice(entries);
        if !matches!(lines.get(at), Some(next) if next.trim().is_empty()) {
            out.push(String::new());
        }
        out.extend_from_slice(&lines[at..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn block() -> MarkedBlock {
        MarkedBlock::new("## INDEX", &["INDEX"])
    }

    #[test]
    fn locates_markers_case_insensitively() {
        let lines = lines("# Doc\n\n## index of things\n- a\n");
        assert_eq!(block().locate(&lines), Some(2));
    }

    #[test]
    fn entry_span_ends_at_blank_or_heading() {
        let blank_terminated = lines("## INDEX\n- a\n- b\n\ntail\n");
        assert_eq!(block().entry_span(&blank_terminated, 0), (1, 3));

        let heading_terminated = lines("## INDEX\n- a\n## Next\n");
        assert_eq!(block().entry_span(&heading_terminated, 0), (1, 2));

        let eof_terminated = lines("## INDEX\n- a");
        assert_eq!(block().entry_span(&eof_terminated, 0), (1, 2));
    }

    #[test]
    fn upsert_replaces_existing_entries_wholesale() {
        let before = lines("# Doc\n\n## INDEX\n- stale\n- stale2\n\ntail\n");
        let after = block().upsert(&before, &["- fresh".to_string()], InsertAt::AfterFirstHeading);
        assert_eq!(after, lines("# Doc\n\n## INDEX\n- fresh\n\ntail\n"));
    }

    #[test]
    fn upsert_creates_block_after_first_heading() {
        let before = lines("# Doc\nintro\n");
        let after = block().upsert(&before, &["- a".to_string()], InsertAt::AfterFirstHeading);
        assert_eq!(after, lines("# Doc\n\n## INDEX\n- a\n\nintro\n"));
    }

    #[test]
    fn upsert_creates_block_before_given_line() {
        let before = lines("# Doc\n\n## Other\n");
        let after = block().upsert(&before, &["- a".to_string()], InsertAt::BeforeLine(2));
        assert_eq!(after, lines("# Doc\n\n## INDEX\n- a\n\n## Other\n"));
    }

    #[test]
    fn upsert_does_not_stack_blank_separators() {
        // blank already above the anchor: reused, not duplicated
        let before = lines("# Doc\n\ntail\n");
        let after = block().upsert(&before, &["- a".to_string()], InsertAt::BeforeLine(2));
        assert_eq!(after, lines("# Doc\n\n## INDEX\n- a\n\ntail\n"));

        // blank already below the insertion point: reused as well
        let before = lines("# Doc\n\nbody\n");
        let after = block().upsert(&before, &["- a".to_string()], InsertAt::AfterFirstHeading);
        assert_eq!(after, lines("# Doc\n\n## INDEX\n- a\n\nbody\n"));
    }

    #[test]
    fn upsert_twice_is_idempotent() {
        let before = lines("# Doc\nbody\n");
        let entries = vec!["- a".to_string(), "- b".to_string()];
        let once = block().upsert(&before, &entries, InsertAt::AfterFirstHeading);
        let twice = block().upsert(&once, &entries, InsertAt::AfterFirstHeading);
        assert_eq!(once, twice);
    }
}
