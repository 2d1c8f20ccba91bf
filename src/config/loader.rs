use super::markers::{MarkerSet, RuleProfile, CAN_IGNORE_RETURN_VALUE};
use super::properties::ProjectProperties;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for checkreturnvalue analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target directories to analyze
    pub targets: Vec<PathBuf>,

    /// Patterns to exclude from analysis
    pub exclude: Vec<String>,

    /// Preset marker list
    pub profile: RuleProfile,

    /// Marker and exemption annotation configuration
    pub annotations: AnnotationConfig,

    /// Extra explanations appended when a marker has no suggestion
    pub explanations: Vec<ExplanationEntry>,

    /// Which checks run
    pub checks: ChecksConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Markers added to the profile defaults
    pub custom: Vec<String>,

    /// Markers removed from the effective set
    pub exclude: Vec<String>,

    /// Annotation that cancels markers in its scope
    pub exemption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationEntry {
    /// Qualified name of the declaring type
    pub owner: String,
    pub method: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Report discarded results of marked methods
    pub ignored_return: bool,

    /// Report conflicting or misplaced marker annotations
    pub misuse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json, sarif
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/build/**".to_string(),
                "**/generated/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.idea/**".to_string(),
            ],
            profile: RuleProfile::default(),
            annotations: AnnotationConfig::default(),
            explanations: vec![],
            checks: ChecksConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            custom: vec![],
            exclude: vec![],
            exemption: CAN_IGNORE_RETURN_VALUE.to_string(),
        }
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            ignored_return: true,
            misuse: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".checkreturnvalue.yml",
            ".checkreturnvalue.yaml",
            ".checkreturnvalue.toml",
            "checkreturnvalue.yml",
            "checkreturnvalue.yaml",
            "checkreturnvalue.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                debug!("Using config file: {}", path.display());
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if a pattern matches for exclusion
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }

    /// Effective markers from the profile, this config and the project properties
    pub fn marker_set(&self, properties: &ProjectProperties) -> MarkerSet {
        let mut custom = self.annotations.custom.clone();
        custom.extend(properties.custom_annotations());
        let mut excluded = self.annotations.exclude.clone();
        excluded.extend(properties.exclude_annotations());

        MarkerSet::resolve(self.profile, &custom, &excluded, &self.annotations.exemption)
    }
}

/// Simple glob matching for patterns like "*Test.kt" or "**/build/**"
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern.starts_with('*') && !pattern.contains('/') {
        // Pattern like "*Test.java" matches "src/FooTest.java"
        return text.ends_with(&pattern[1..]);
    }

    if pattern.ends_with('*') && !pattern.contains('/') {
        return text.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains("**") {
        // "**/build/**" must match a complete directory name, not a substring
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern.trim_start_matches("**/").trim_end_matches("/**");
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern) || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}
