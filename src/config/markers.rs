use crate::index::{short_name, Annotation};
use serde::{Deserialize, Serialize};

pub const CAN_IGNORE_RETURN_VALUE: &str = "com.google.errorprone.annotations.CanIgnoreReturnValue";
pub const OPTIONAL_CHECK_RETURN_VALUE: &str = "io.reactivex.annotations.OptionalCheckReturnValue";

/// Markers checked by the `configurable` profile
pub const DEFAULT_MARKERS: &[&str] = &[
    "CheckReturnValue",
    "androidx.annotation.CheckResult",
    "com.support.annotation.CheckResult",
    "edu.umd.cs.findbugs.annotations.CheckReturnValue",
    "javax.annotation.CheckReturnValue",
    "io.reactivex.annotations.CheckReturnValue",
    "com.google.errorprone.annotations.CheckReturnValue",
];

/// Preset default marker list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuleProfile {
    /// Common `@CheckReturnValue`/`@CheckResult` annotations
    #[default]
    Configurable,
    /// RxJava's `@OptionalCheckReturnValue` only
    Optional,
}

impl RuleProfile {
    pub fn default_markers(&self) -> &'static [&'static str] {
        match self {
            RuleProfile::Configurable => DEFAULT_MARKERS,
            RuleProfile::Optional => &[OPTIONAL_CHECK_RETURN_VALUE],
        }
    }

    /// Rule identifier used in reports
    pub fn rule_id(&self) -> &'static str {
        match self {
            RuleProfile::Configurable => "ConfigurableCheckReturnValue",
            RuleProfile::Optional => "OptionalCheckReturnValue",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleProfile::Configurable => "configurable",
            RuleProfile::Optional => "optional",
        }
    }
}

impl std::fmt::Display for RuleProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Effective marker names plus the exemption annotation that cancels them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<String>,
    /// Excluded names, matched the same way as markers
    excluded: Vec<String>,
    exemption: String,
}

impl MarkerSet {
    /// `defaults ∪ custom \ excluded`, never containing the exemption
    pub fn resolve(profile: RuleProfile, custom: &[String], excluded: &[String], exemption: &str) -> Self {
        let mut markers: Vec<String> = Vec::new();
        let candidates = profile
            .default_markers()
            .iter()
            .map(|name| name.to_string())
            .chain(custom.iter().cloned());

        for name in candidates {
            let is_exemption = name == exemption || name == short_name(exemption);
            if is_exemption || excluded.contains(&name) || markers.contains(&name) {
                continue;
            }
            markers.push(name);
        }

        Self {
            markers,
            excluded: excluded.to_vec(),
            exemption: exemption.to_string(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn exemption(&self) -> &str {
        &self.exemption
    }

    pub fn is_marker(&self, annotation: &Annotation) -> bool {
        self.markers.iter().any(|marker| annotation.matches(marker))
            && !self.excluded.iter().any(|name| annotation.matches(name))
    }

    /// The exemption matches by qualified name or, for custom copies of the
    /// annotation, by simple name
    pub fn is_exemption(&self, annotation: &Annotation) -> bool {
        annotation.matches(&self.exemption) || annotation.matches(short_name(&self.exemption))
    }

    /// First marker among `annotations`
    pub fn find_marker<'a>(&self, annotations: &'a [Annotation]) -> Option<&'a Annotation> {
        annotations.iter().find(|annotation| self.is_marker(annotation))
    }

    pub fn find_exemption<'a>(&self, annotations: &'a [Annotation]) -> Option<&'a Annotation> {
        annotations.iter().find(|annotation| self.is_exemption(annotation))
    }

    pub fn contains_exemption(&self, annotations: &[Annotation]) -> bool {
        self.find_exemption(annotations).is_some()
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::resolve(RuleProfile::default(), &[], &[], CAN_IGNORE_RETURN_VALUE)
    }
}
