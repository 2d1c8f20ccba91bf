use crate::analysis::{Finding, Severity};
use crate::config::RuleProfile;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    profile: RuleProfile,
}

impl JsonReporter {
    pub fn new(profile: RuleProfile) -> Self {
        Self { profile }
    }

    pub fn render(&self, findings: &[Finding]) -> Result<String> {
        let report = JsonReport::from_findings(self.profile, findings);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    rule: &'static str,
    total_issues: usize,
    issues: Vec<JsonIssue>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonIssue {
    code: &'static str,
    severity: &'static str,
    name: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<String>,
    file: String,
    line: usize,
    column: usize,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
}

impl JsonReport {
    fn from_findings(profile: RuleProfile, findings: &[Finding]) -> Self {
        let mut summary = JsonSummary {
            errors: 0,
            warnings: 0,
            infos: 0,
        };

        let issues = findings
            .iter()
            .map(|finding| {
                match finding.severity {
                    Severity::Error => summary.errors += 1,
                    Severity::Warning => summary.warnings += 1,
                    Severity::Info => summary.infos += 1,
                }

                JsonIssue {
                    code: finding.issue.code(),
                    severity: finding.severity.as_str(),
                    name: finding.name.clone(),
                    message: finding.message.clone(),
                    fix: finding.fix.clone(),
                    file: finding.location.file.to_string_lossy().to_string(),
                    line: finding.location.line,
                    column: finding.location.column,
                }
            })
            .collect();

        Self {
            version: "1.0",
            rule: profile.rule_id(),
            total_issues: findings.len(),
            issues,
            summary,
        }
    }
}
