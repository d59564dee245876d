use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Size thresholds driving extraction decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ThresholdConfig {
    /// Maximum acceptable line count for a markdown file before the
    /// validator flags it oversized
    pub claude_md_max_lines: usize,

    /// Document line count above which extraction suggestions are produced
    pub extract_at_lines: usize,

    /// Minimum body lines a section needs before it is worth extracting
    pub min_section_lines: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            claude_md_max_lines: 500,
            extract_at_lines: 200,
            min_section_lines: 50,
        }
    }
}

/// Where extracted files land and how references are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationConfig {
    /// Destination folder for extracted sections, relative to the project
    /// root (a leading `/` is tolerated and stripped)
    pub docs_folder: String,

    /// Prefix reference entries with category emojis
    pub use_emojis: bool,

    /// Keep the reference index in sync after extraction
    pub auto_reference: bool,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            docs_folder: "/docs".to_string(),
            use_emojis: true,
            auto_reference: true,
        }
    }
}

/// Enforcement switches for the maintained markdown blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternConfig {
    /// Require and maintain the critical documentation block
    pub enforce_critical_section: bool,

    /// Back-propagate "READ THIS FIRST!" flags onto reference entries
    pub require_read_first_flags: bool,

    /// Treat troubleshooting-style documents as critical automatically
    pub auto_troubleshooting_docs: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            enforce_critical_section: true,
            require_read_first_flags: true,
            auto_troubleshooting_docs: true,
        }
    }
}

/// Options consumed by the surrounding watch/health collaborators; the core
/// only reads `validate_links`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringConfig {
    pub watch_mode: bool,
    pub validate_links: bool,
    pub health_checks: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            watch_mode: true,
            validate_links: true,
            health_checks: true,
        }
    }
}

/// Top-level configuration, deserialized from TOML with camelCase keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub organization: OrganizationConfig,
    pub patterns: PatternConfig,
    pub monitoring: MonitoringConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults silently; a malformed file or one
    /// that fails threshold validation is a recoverable configuration error
    /// and also yields the defaults, with a warning logged.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };

        match toml::from_str::<Self>(&raw) {
            Ok(config) => match config.validate() {
                Ok(()) => Ok(config),
                Err(err) => {
                    log::warn!(
                        "Invalid config {}: {err}; falling back to defaults",
                        path.display()
                    );
                    Ok(Self::default())
                }
            },
            Err(err) => {
                log::warn!(
                    "Malformed config {}: {err}; falling back to defaults",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Sanity-check threshold relationships.
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.extract_at_lines == 0 {
            return Err(crate::CoreError::ConfigError(
                "thresholds.extractAtLines must be > 0".to_string(),
            ));
        }
        if self.thresholds.min_section_lines == 0 {
            return Err(crate::CoreError::ConfigError(
                "thresholds.minSectionLines must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Absolute docs folder for a project root.
    #[must_use]
    pub fn docs_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.organization.docs_folder.trim_start_matches('/'))
    }

    /// Project-root-relative reference path (leading `/`) for an extracted
    /// file name.
    #[must_use]
    pub fn reference_path(&self, file_name: &str) -> String {
        let folder = self.organization.docs_folder.trim_matches('/');
        if folder.is_empty() {
            format!("/{file_name}")
        } else {
            format!("/{folder}/{file_name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.thresholds.claude_md_max_lines, 500);
        assert_eq!(config.thresholds.extract_at_lines, 200);
        assert_eq!(config.thresholds.min_section_lines, 50);
        assert_eq!(config.organization.docs_folder, "/docs");
        assert!(config.organization.use_emojis);
        assert!(config.organization.auto_reference);
        assert!(config.patterns.enforce_critical_section);
        assert!(config.patterns.require_read_first_flags);
        assert!(config.monitoring.validate_links);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_camel_case_keys() {
        let config: Config = toml::from_str(
            r#"
            [thresholds]
            claudeMdMaxLines = 300
            extractAtLines = 120

            [organization]
            docsFolder = "/notes"
            useEmojis = false
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.claude_md_max_lines, 300);
        assert_eq!(config.thresholds.extract_at_lines, 120);
        // untouched sections keep defaults
        assert_eq!(config.thresholds.min_section_lines, 50);
        assert_eq!(config.organization.docs_folder, "/notes");
        assert!(!config.organization.use_emojis);
        assert!(config.patterns.enforce_critical_section);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load("/definitely/not/here.toml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pagekeeper.toml");
        std::fs::write(&path, "thresholds = \"not a table\"").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_thresholds_fall_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pagekeeper.toml");
        std::fs::write(&path, "[thresholds]\nextractAtLines = 0\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn docs_dir_strips_leading_slash() {
        let config = Config::default();
        let dir = config.docs_dir(&PathBuf::from("/project"));
        assert_eq!(dir, PathBuf::from("/project/docs"));
        assert_eq!(config.reference_path("API.md"), "/docs/API.md");
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        let mut config = Config::default();
        config.thresholds.extract_at_lines = 0;
        assert!(config.validate().is_err());
    }
}
