use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Scanner for finding markdown documents in a project (.gitignore aware).
pub struct MarkdownScanner {
    root: PathBuf,
}

impl MarkdownScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Walk the project tree and collect markdown files, skipping hidden
    /// files, gitignored paths and build/vendor scopes. Results are sorted
    /// for deterministic downstream output.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        builder.filter_entry(move |entry| !MarkdownScanner::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    if !Self::is_markdown_file(path) {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::debug!("Found {} markdown files under {}", files.len(), self.root.display());
        files
    }

    fn is_markdown_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                MARKDOWN_EXTENSIONS.iter().any(|candidate| candidate == &ext)
            })
            .unwrap_or(false)
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let std::path::Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    // caches / builds
    ".cache",
    "node_modules",
    "build",
    "dist",
    "coverage",
    "target",
    "tmp",
    ".venv",
    "__pycache__",
    // data / vendor
    "vendor",
    "third_party",
    "third-party",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx", "markdown"];

#[cfg(test)]
mod tests {
    use super::MarkdownScanner;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_only_markdown_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("CLAUDE.md"), "# Main\n").unwrap();
        fs::write(temp.path().join("notes.mdx"), "# Notes\n").unwrap();
        fs::write(temp.path().join("main.rs"), "fn main() {}\n").unwrap();

        let scanner = MarkdownScanner::new(temp.path());
        let files = scanner.scan();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("CLAUDE.md")));
        assert!(files.iter().any(|p| p.ends_with("notes.mdx")));
    }

    #[test]
    fn skips_vendor_scopes() {
        let temp = tempdir().unwrap();
        let vendored = temp.path().join("node_modules").join("pkg");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("README.md"), "# Vendored\n").unwrap();
        fs::write(temp.path().join("README.md"), "# Ours\n").unwrap();

        let scanner = MarkdownScanner::new(temp.path());
        let files = scanner.scan();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("README.md"));
        assert!(!files[0].to_string_lossy().contains("node_modules"));
    }

    #[test]
    fn results_are_sorted() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("b.md"), "b\n").unwrap();
        fs::write(temp.path().join("a.md"), "a\n").unwrap();

        let files = MarkdownScanner::new(temp.path()).scan();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }
}
