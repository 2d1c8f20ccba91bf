//! Reader for the project's `gradle.properties`
//!
//! Only the two annotation list keys are consumed; everything else in the
//! file is parsed and ignored. Lists are colon separated:
//!
//! ```properties
//! configurableCheckReturnValue.customAnnotations=com.example.Pure:MustUse
//! configurableCheckReturnValue.excludeAnnotations=javax.annotation.CheckReturnValue
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const PROPERTY_FILE: &str = "gradle.properties";
pub const CUSTOM_ANNOTATIONS_KEY: &str = "configurableCheckReturnValue.customAnnotations";
pub const EXCLUDE_ANNOTATIONS_KEY: &str = "configurableCheckReturnValue.excludeAnnotations";

const BARE_CUSTOM_KEY: &str = "customAnnotations";
const BARE_EXCLUDE_KEY: &str = "excludeAnnotations";

#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed \\uXXXX escape on line {line}")]
    InvalidEscape { line: usize },
}

/// Parsed key/value pairs of a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectProperties {
    entries: BTreeMap<String, String>,
}

impl ProjectProperties {
    pub fn load(path: &Path) -> Result<Self, PropertiesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PropertiesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Load the properties file, falling back to no properties when it is absent or malformed
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No properties file at {}", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(properties) => {
                debug!("Loaded {} properties from {}", properties.len(), path.display());
                properties
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, PropertiesError> {
        let mut entries = BTreeMap::new();

        for (line_number, logical) in logical_lines(contents) {
            let (key, value) = split_entry(&logical);
            let key = unescape(key, line_number)?;
            let value = unescape(value, line_number)?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Colon separated list value; blank entries are dropped
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| {
            value
                .split(':')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    pub fn custom_annotations(&self) -> Vec<String> {
        self.list(CUSTOM_ANNOTATIONS_KEY)
            .or_else(|| self.list(BARE_CUSTOM_KEY))
            .unwrap_or_default()
    }

    pub fn exclude_annotations(&self) -> Vec<String> {
        self.list(EXCLUDE_ANNOTATIONS_KEY)
            .or_else(|| self.list(BARE_EXCLUDE_KEY))
            .unwrap_or_default()
    }
}

/// Join continuation lines and drop blanks and comments; yields (first line number, text)
fn logical_lines(contents: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim_start();

        let (start, mut text) = match current.take() {
            Some((start, text)) => (start, text),
            None => {
                if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                    continue;
                }
                (index + 1, String::new())
            }
        };

        // an odd number of trailing backslashes continues the entry
        let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            text.push_str(&line[..line.len() - 1]);
            current = Some((start, text));
        } else {
            text.push_str(line);
            lines.push((start, text));
        }
    }

    if let Some(pending) = current {
        lines.push(pending);
    }
    lines
}

/// Split at the first unescaped `=`, `:` or whitespace
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..index], line[index + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[index..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..index], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let digits: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or(PropertiesError::InvalidEscape { line })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}
