use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Category id returned when no keyword scores at all.
pub const DEFAULT_CATEGORY_ID: &str = "features";

/// A topical bucket used to classify extracted content.
///
/// Categories are plain data records; the set in use is injected into the
/// classifier rather than baked into its code, so callers can extend or
/// replace the table without touching scoring logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Stable identifier (`security`, `api`, ...)
    pub id: String,

    /// Human-readable display label
    pub label: String,

    /// Emoji shown in reference entries
    pub emoji: String,

    /// Case-insensitive whole-word keywords that score toward this category
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        emoji: impl Into<String>,
        keywords: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            emoji: emoji.into(),
            keywords: keywords.iter().map(|kw| (*kw).to_string()).collect(),
        }
    }
}

/// Ordered category table.
///
/// Iteration order is significant: classifier ties are broken by the first
/// category in table order, so the order below is part of the contract and
/// covered by tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
    default_id: String,
}

impl CategoryTable {
    /// Build a table from explicit categories. `default_id` is returned by
    /// the classifier when every category scores zero.
    pub fn new(categories: Vec<Category>, default_id: impl Into<String>) -> Self {
        Self {
            categories,
            default_id: default_id.into(),
        }
    }

    /// The built-in table. Declaration order is the documented tie-break
    /// total order.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = vec![
            Category::new(
                "architecture",
                "Architecture",
                "🏗️",
                &[
                    "architecture",
                    "design",
                    "structure",
                    "pattern",
                    "component",
                    "module",
                    "service",
                ],
            ),
            Category::new(
                "database",
                "Database",
                "🗄️",
                &[
                    "database", "sql", "nosql", "schema", "migration", "query", "postgres",
                    "mysql", "mongodb", "redis",
                ],
            ),
            Category::new(
                "security",
                "Security",
                "🔐",
                &[
                    "security",
                    "auth",
                    "authentication",
                    "authorization",
                    "encryption",
                    "vulnerability",
                    "password",
                    "token",
                    "credential",
                ],
            ),
            Category::new(
                "features",
                "Features",
                "✅",
                &["feature", "functionality", "requirement", "capability"],
            ),
            Category::new(
                "monitoring",
                "Monitoring",
                "📊",
                &[
                    "monitoring",
                    "logging",
                    "metrics",
                    "observability",
                    "alerting",
                    "dashboard",
                ],
            ),
            Category::new(
                "critical",
                "Critical",
                "🚨",
                &["critical", "urgent", "emergency", "breaking", "severe", "blocker"],
            ),
            Category::new(
                "setup",
                "Setup",
                "📋",
                &["setup", "installation", "install", "initialization", "bootstrap"],
            ),
            Category::new(
                "api",
                "API",
                "🌐",
                &["api", "endpoint", "rest", "graphql", "webhook", "integration"],
            ),
            Category::new(
                "testing",
                "Testing",
                "🧪",
                &["test", "tests", "testing", "coverage", "e2e"],
            ),
            Category::new(
                "performance",
                "Performance",
                "⚡",
                &[
                    "performance",
                    "optimization",
                    "speed",
                    "latency",
                    "throughput",
                    "scalability",
                ],
            ),
            Category::new(
                "documentation",
                "Documentation",
                "📚",
                &["documentation", "docs", "readme", "guide", "tutorial", "reference"],
            ),
            Category::new(
                "deployment",
                "Deployment",
                "🚀",
                &[
                    "deployment",
                    "deploy",
                    "release",
                    "pipeline",
                    "production",
                    "docker",
                    "kubernetes",
                ],
            ),
            Category::new(
                "configuration",
                "Configuration",
                "⚙️",
                &["configuration", "config", "settings", "environment", "variable", "option"],
            ),
            Category::new(
                "dependencies",
                "Dependencies",
                "📦",
                &["dependency", "dependencies", "package", "library", "import"],
            ),
        ];
        Self::new(categories, DEFAULT_CATEGORY_ID)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Look up a category by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a category by its emoji (used when parsing reference entries
    /// back out of a document).
    #[must_use]
    pub fn by_emoji(&self, emoji: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.emoji == emoji)
    }

    /// Emoji for an id, falling back to the default category's emoji.
    #[must_use]
    pub fn emoji_for(&self, id: &str) -> &str {
        self.get(id)
            .or_else(|| self.get(&self.default_id))
            .map_or("📄", |c| c.emoji.as_str())
    }

    /// Label for an id, falling back to the id itself.
    #[must_use]
    pub fn label_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |c| c.label.as_str())
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A named text resource, held as an ordered sequence of lines.
///
/// Line count and section structure are always derived from `lines`, never
/// stored alongside them. Edits produce a new `Document`; nothing mutates
/// the line array in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub lines: Vec<String>,
}

impl Document {
    /// Wrap pre-split lines.
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    /// Split `text` into lines. A single trailing newline does not produce
    /// an extra empty line.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        let trimmed = text.strip_suffix('\n').unwrap_or(text);
        let lines = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('\n').map(str::to_string).collect()
        };
        Self::new(path, lines)
    }

    /// Read a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| CoreError::InvalidPath(format!("{}: {err}", path.display())))?;
        Ok(Self::from_text(path, &text))
    }

    /// Write the document back to its own path, joined with `\n` and a
    /// single trailing newline.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.text())?;
        Ok(())
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Replace the line array, keeping the path.
    #[must_use]
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        Self {
            path: self.path.clone(),
            lines,
        }
    }
}

/// One entry of the maintained reference index.
///
/// Identity is `path` (project-root-relative with a leading `/`): at most
/// one live reference per path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentReference {
    pub path: String,
    pub category: String,
    pub emoji: String,
    pub title: String,
    pub critical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocumentReference {
    pub fn new(
        path: impl Into<String>,
        category: impl Into<String>,
        emoji: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            category: category.into(),
            emoji: emoji.into(),
            title: title.into(),
            critical: false,
            description: None,
        }
    }

    /// Builder: mark the reference critical.
    #[must_use]
    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }

    /// Builder: attach a description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Kind of structural problem found by the validator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingFile,
    BrokenReference,
    OversizedFile,
    MissingCriticalSection,
}

impl IssueKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::BrokenReference => "broken_reference",
            Self::OversizedFile => "oversized_file",
            Self::MissingCriticalSection => "missing_critical_section",
        }
    }
}

/// A single audit finding. Produced, reported, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub file: String,
    pub message: String,
    /// 1-based line number when the issue points at a specific line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            message: message.into(),
            line: None,
        }
    }

    /// Builder: attach a 1-based line number.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
