use pagekeeper_core::CategoryTable;
use regex::Regex;

/// Keyword-count category classifier.
///
/// Scores text against every category of the injected table by counting
/// case-insensitive whole-word occurrences of each keyword; a category's
/// score is the sum of its keyword match counts. No partial credit for
/// substrings. Ties go to the earlier category in table order, and a total
/// score of zero falls back to the table's default category.
///
/// Pure and side-effect-free: the same input always yields the same id,
/// independent of call order.
pub struct Classifier {
    table: CategoryTable,
    // one compiled whole-word regex per keyword, per category, in table order
    keyword_patterns: Vec<Vec<Regex>>,
}

impl Classifier {
    /// Compile keyword patterns for `table`. Keywords that fail to compile
    /// (pathological injected input) are skipped with a warning rather than
    /// failing the whole table.
    #[must_use]
    pub fn new(table: CategoryTable) -> Self {
        let keyword_patterns = table
            .categories()
            .iter()
            .map(|category| {
                category
                    .keywords
                    .iter()
                    .filter_map(|keyword| {
                        let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
                        match Regex::new(&pattern) {
                            Ok(re) => Some(re),
                            Err(err) => {
                                log::warn!("Skipping keyword {keyword:?}: {err}");
                                None
                            }
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            table,
            keyword_patterns,
        }
    }

    #[must_use]
    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Classify `text`, returning the best category id.
    #[must_use]
    pub fn classify(&self, text: &str) -> &str {
        self.classify_scored(text).0
    }

    /// Classify `text`, returning the best category id together with its
    /// score (total whole-word keyword matches). A zero score means the
    /// default category was chosen.
    #[must_use]
    pub fn classify_scored(&self, text: &str) -> (&str, usize) {
        let mut best: Option<(usize, usize)> = None; // (category index, score)

        for (idx, patterns) in self.keyword_patterns.iter().enumerate() {
            let score: usize = patterns.iter().map(|re| re.find_iter(text).count()).sum();
            if score == 0 {
                continue;
            }
            // strictly-greater keeps the first category on ties
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((idx, score)),
            }
        }

        match best {
            Some((idx, score)) => (self.table.categories()[idx].id.as_str(), score),
            None => (self.table.default_id(), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekeeper_core::{Category, CategoryTable};
    use pretty_assertions::assert_eq;

    fn classifier() -> Classifier {
        Classifier::new(CategoryTable::builtin())
    }

    #[test]
    fn repeated_keyword_wins() {
        let c = classifier();
        assert_eq!(c.classify("auth auth auth"), "security");
    }

    #[test]
    fn zero_score_falls_back_to_features() {
        let c = classifier();
        let (id, score) = c.classify_scored("nothing relevant whatsoever");
        assert_eq!(id, "features");
        assert_eq!(score, 0);
    }

    #[test]
    fn whole_words_only() {
        let c = classifier();
        // "authentic" must not count toward the "auth" keyword
        let (id, score) = c.classify_scored("an authentic statement");
        assert_eq!((id, score), ("features", 0));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let c = classifier();
        let (id, score) = c.classify_scored("DATABASE Database database");
        assert_eq!(id, "database");
        assert_eq!(score, 3);
    }

    #[test]
    fn ties_break_by_table_order() {
        let table = CategoryTable::new(
            vec![
                Category::new("first", "First", "1️⃣", &["alpha"]),
                Category::new("second", "Second", "2️⃣", &["beta"]),
            ],
            "first",
        );
        let c = Classifier::new(table);
        // one match each: the earlier category wins
        assert_eq!(c.classify("alpha beta"), "first");
        // and a higher later score still beats an earlier lower one
        assert_eq!(c.classify("alpha beta beta"), "second");
    }

    #[test]
    fn classification_is_deterministic_across_calls() {
        let c = classifier();
        let text = "deploy the release pipeline to production";
        let first = c.classify(text).to_string();
        for _ in 0..10 {
            assert_eq!(c.classify(text), first);
        }
    }
}
