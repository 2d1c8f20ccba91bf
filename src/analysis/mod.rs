mod analyzer;
pub mod detectors;
pub mod policy;
pub mod resolve;
pub mod usage;

pub use analyzer::Analyzer;
pub use detectors::{AnnotationMisuseDetector, CheckReturnValueDetector, Detector};
pub use policy::{AnnotationPolicy, CallTarget, ExplanationTable, ReturnValueReport, ScopeAnnotations};
pub use resolve::{CallResolver, ResolvedTarget};
pub use usage::{is_value_discarded, nearest_expression};

use crate::index::Location;

/// A problem reported by a detector
#[derive(Debug, Clone)]
pub struct Finding {
    /// The kind of issue
    pub issue: IssueKind,

    /// Severity level
    pub severity: Severity,

    /// Where the issue was found
    pub location: Location,

    /// Name of the called or annotated declaration
    pub name: String,

    /// Human readable message
    pub message: String,

    /// Suggested replacement, if any
    pub fix: Option<String>,
}

impl Finding {
    pub fn new(issue: IssueKind, location: Location, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issue,
            severity: issue.default_severity(),
            location,
            name: name.into(),
            message: message.into(),
            fix: None,
        }
    }

    /// Finding for a discarded result of a marked method
    pub fn ignored_return(location: Location, report: &ReturnValueReport) -> Self {
        let mut finding = Self::new(
            IssueKind::IgnoredReturnValue,
            location,
            report.method.clone(),
            report.message(),
        );
        finding.fix = report.suggestion.clone();
        finding
    }
}

/// Sort findings by file, line and column
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.location
            .file
            .cmp(&b.location.file)
            .then(a.location.line.cmp(&b.location.line))
            .then(a.location.column.cmp(&b.location.column))
            .then(a.issue.code().cmp(b.issue.code()))
    });
}

/// Types of issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Result of a method that must be consumed is discarded
    IgnoredReturnValue,

    /// Marker and exemption on the same declaration
    ConflictingAnnotations,

    /// Marker or exemption on a method without a result
    AnnotationOnVoidMethod,
}

impl IssueKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueKind::IgnoredReturnValue => Severity::Error,
            IssueKind::ConflictingAnnotations => Severity::Warning,
            IssueKind::AnnotationOnVoidMethod => Severity::Warning,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::IgnoredReturnValue => "CRV001",
            IssueKind::ConflictingAnnotations => "CRV002",
            IssueKind::AnnotationOnVoidMethod => "CRV003",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IssueKind::IgnoredReturnValue => "Ignored return value",
            IssueKind::ConflictingAnnotations => "Conflicting annotations",
            IssueKind::AnnotationOnVoidMethod => "Annotation on void method",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IssueKind::IgnoredReturnValue => {
                "Some methods have no side effects, and calling them without doing something with the result is suspicious."
            }
            IssueKind::ConflictingAnnotations => {
                "A return value cannot be both required and ignorable on the same declaration."
            }
            IssueKind::AnnotationOnVoidMethod => {
                "A method without a return value has no result to check."
            }
        }
    }

    pub fn all() -> &'static [IssueKind] {
        &[
            IssueKind::IgnoredReturnValue,
            IssueKind::ConflictingAnnotations,
            IssueKind::AnnotationOnVoidMethod,
        ]
    }
}

/// Severity levels for issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
