use crate::{InsertAt, MarkedBlock};
use once_cell::sync::Lazy;
use pagekeeper_core::markers::{
    READ_FIRST_SUFFIX, REFERENCE_BLOCK_HEADING, REFERENCE_MARKER_ALIASES,
};
use pagekeeper_core::{CategoryTable, Document, DocumentReference};
use regex::Regex;

static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^- \*\*(.+)\*\*: `([^`]+)`( 🚨 READ THIS FIRST!)?\s*$")
        .expect("valid entry regex")
});

/// Format one reference as a block entry line.
#[must_use]
pub fn format_entry(reference: &DocumentReference, use_emojis: bool) -> String {
    let bold = if use_emojis && !reference.emoji.is_empty() {
        format!("{} {}", reference.emoji, reference.title)
    } else {
        reference.title.clone()
    };
    let suffix = if reference.critical { READ_FIRST_SUFFIX } else { "" };
    format!("- **{bold}**: `{}`{suffix}", reference.path)
}

/// Parse block entry lines back into references (the inverse of
/// [`format_entry`]). Lines that do not look like entries are skipped.
/// Category is recovered from the emoji via the table; entries without a
/// recognizable emoji fall back to the table's default category.
#[must_use]
pub fn parse_entries(lines: &[String], table: &CategoryTable) -> Vec<DocumentReference> {
    lines
        .iter()
        .filter_map(|line| parse_entry(line, table))
        .collect()
}

fn parse_entry(line: &str, table: &CategoryTable) -> Option<DocumentReference> {
    let caps = ENTRY_LINE.captures(line)?;
    let bold = caps[1].to_string();
    let path = caps[2].to_string();
    let critical = caps.get(3).is_some();

    // leading token with no alphanumeric content is the emoji prefix
    let (emoji, title) = match bold.split_once(' ') {
        Some((first, rest)) if !first.chars().any(char::is_alphanumeric) => {
            (first.to_string(), rest.to_string())
        }
        _ => (String::new(), bold),
    };

    let category = table
        .by_emoji(&emoji)
        .map_or_else(|| table.default_id().to_string(), |c| c.id.clone());

    Some(
        DocumentReference {
            path,
            category,
            emoji,
            title,
            critical: false,
            description: None,
        }
        .critical(critical),
    )
}

/// Maintains the reference index block inside a source document.
///
/// `sync` is a full block replace, not a merge: handing it the same
/// reference set twice produces byte-identical output the second time.
pub struct ReferenceSynchronizer {
    table: CategoryTable,
    use_emojis: bool,
    block: MarkedBlock,
}

impl ReferenceSynchronizer {
    #[must_use]
    pub fn new(table: CategoryTable, use_emojis: bool) -> Self {
        Self {
            table,
            use_emojis,
            block: MarkedBlock::new(REFERENCE_BLOCK_HEADING, REFERENCE_MARKER_ALIASES),
        }
    }

    #[must_use]
    pub fn block(&self) -> &MarkedBlock {
        &self.block
    }

    /// Entries currently present in the document's reference block.
    #[must_use]
    pub fn existing_references(&self, document: &Document) -> Vec<DocumentReference> {
        match self.block.locate(&document.lines) {
            Some(marker_idx) => {
                let (start, end) = self.block.entry_span(&document.lines, marker_idx);
                parse_entries(&document.lines[start..end], &self.table)
            }
            None => Vec::new(),
        }
    }

    /// Replace the block's entries with `references`, creating the block
    /// after the first top-level heading when absent.
    #[must_use]
    pub fn sync(&self, document: &Document, references: &[DocumentReference]) -> Document {
        let ordered = order_references(references);
        let entries: Vec<String> = ordered
            .iter()
            .map(|reference| format_entry(reference, self.use_emojis))
            .collect();
        let lines = self
            .block
            .upsert(&document.lines, &entries, InsertAt::AfterFirstHeading);
        document.with_lines(lines)
    }

    /// Merge `new_references` over whatever the block currently holds (new
    /// entries win on path collisions) and re-sync.
    #[must_use]
    pub fn upsert_references(
        &self,
        document: &Document,
        new_references: &[DocumentReference],
    ) -> Document {
        let mut merged = self.existing_references(document);
        merged.extend_from_slice(new_references);
        self.sync(document, &merged)
    }
}

/// Deduplicate by path (later entries win, keeping the earlier position),
/// group by category in first-appearance order, then stably sort: category
/// groups containing a critical entry first, and critical entries first
/// within each group.
fn order_references(references: &[DocumentReference]) -> Vec<DocumentReference> {
    let mut deduped: Vec<DocumentReference> = Vec::with_capacity(references.len());
    for reference in references {
        match deduped.iter_mut().find(|r| r.path == reference.path) {
            Some(slot) => *slot = reference.clone(),
            None => deduped.push(reference.clone()),
        }
    }

    let mut groups: Vec<(String, Vec<DocumentReference>)> = Vec::new();
    for reference in deduped {
        match groups.iter_mut().find(|(cat, _)| *cat == reference.category) {
            Some((_, group)) => group.push(reference),
            None => groups.push((reference.category.clone(), vec![reference])),
        }
    }

    groups.sort_by_key(|(_, group)| !group.iter().any(|r| r.critical));

    let mut out = Vec::new();
    for (_, mut group) in groups {
        group.sort_by_key(|r| !r.critical);
        out.extend(group);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekeeper_core::{CategoryTable, Document};
    use pretty_assertions::assert_eq;

    fn synchronizer() -> ReferenceSynchronizer {
        ReferenceSynchronizer::new(CategoryTable::builtin(), true)
    }

    fn api_reference() -> DocumentReference {
        DocumentReference::new("/docs/API.md", "api", "🌐", "API")
    }

    #[test]
    fn creates_block_with_exact_entry_line() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n\nSome intro.\n");
        let synced = synchronizer().sync(&doc, &[api_reference()]);

        let text = synced.text();
        assert!(text.contains("## 📚 DOCUMENTATION REFERENCES"));
        assert!(synced
            .lines
            .iter()
            .any(|line| line == "- **🌐 API**: `/docs/API.md`"));
    }

    #[test]
    fn sync_twice_is_byte_identical() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n\nintro\n\n## Tail\nbody\n");
        let refs = vec![
            api_reference(),
            DocumentReference::new("/docs/SECURITY.md", "security", "🔐", "Security")
                .critical(true),
        ];

        let once = synchronizer().sync(&doc, &refs);
        let twice = synchronizer().sync(&once, &refs);
        assert_eq!(once.text(), twice.text());
    }

    #[test]
    fn critical_categories_sort_first() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n");
        // api listed first, but security carries the critical entry
        let refs = vec![
            api_reference(),
            DocumentReference::new("/docs/SECURITY.md", "security", "🔐", "Security")
                .critical(true),
        ];
        let synced = synchronizer().sync(&doc, &refs);

        let security_idx = synced
            .lines
            .iter()
            .position(|l| l.contains("SECURITY.md"))
            .unwrap();
        let api_idx = synced
            .lines
            .iter()
            .position(|l| l.contains("API.md"))
            .unwrap();
        assert!(security_idx < api_idx);
        assert!(synced.lines[security_idx].ends_with("🚨 READ THIS FIRST!"));
    }

    #[test]
    fn critical_entries_sort_first_within_category() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n");
        let refs = vec![
            DocumentReference::new("/docs/A.md", "api", "🌐", "A"),
            DocumentReference::new("/docs/B.md", "api", "🌐", "B").critical(true),
        ];
        let synced = synchronizer().sync(&doc, &refs);

        let a = synced.lines.iter().position(|l| l.contains("/docs/A.md")).unwrap();
        let b = synced.lines.iter().position(|l| l.contains("/docs/B.md")).unwrap();
        assert!(b < a);
    }

    #[test]
    fn duplicate_paths_keep_one_entry_with_latest_fields() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n");
        let refs = vec![
            api_reference(),
            DocumentReference::new("/docs/API.md", "api", "🌐", "API v2"),
        ];
        let synced = synchronizer().sync(&doc, &refs);

        let entries: Vec<_> = synced
            .lines
            .iter()
            .filter(|l| l.contains("/docs/API.md"))
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("API v2"));
    }

    #[test]
    fn entry_lines_round_trip_through_parser() {
        let table = CategoryTable::builtin();
        let reference = DocumentReference::new("/docs/SECURITY.md", "security", "🔐", "Security")
            .critical(true);
        let line = format_entry(&reference, true);
        let parsed = parse_entries(&[line], &table);
        assert_eq!(parsed, vec![reference]);
    }

    #[test]
    fn parser_tolerates_plain_entries() {
        let table = CategoryTable::builtin();
        let parsed = parse_entries(&["- **Guide**: `/docs/GUIDE.md`".to_string()], &table);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "Guide");
        assert_eq!(parsed[0].emoji, "");
        assert_eq!(parsed[0].category, "features");
        assert!(!parsed[0].critical);
    }

    #[test]
    fn upsert_references_merges_over_existing_block() {
        let doc = Document::from_text("CLAUDE.md", "# Project\n");
        let synced = synchronizer().sync(&doc, &[api_reference()]);

        let update = vec![
            DocumentReference::new("/docs/API.md", "api", "🌐", "API v2"),
            DocumentReference::new("/docs/DB.md", "database", "🗄️", "Database"),
        ];
        let merged = synchronizer().upsert_references(&synced, &update);

        assert!(merged.lines.iter().any(|l| l.contains("API v2")));
        assert!(merged.lines.iter().any(|l| l.contains("/docs/DB.md")));
        assert_eq!(
            merged
                .lines
                .iter()
                .filter(|l| l.contains("/docs/API.md"))
                .count(),
            1
        );
    }
}
