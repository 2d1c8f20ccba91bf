use crate::analysis::{Finding, IssueKind, Severity};
use crate::config::RuleProfile;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// SARIF reporter for CI/CD integration (GitHub, Azure DevOps, etc.)
pub struct SarifReporter {
    profile: RuleProfile,
}

impl SarifReporter {
    pub fn new(profile: RuleProfile) -> Self {
        Self { profile }
    }

    pub fn render(&self, findings: &[Finding]) -> Result<String> {
        let sarif = SarifReport::from_findings(self.profile, findings);
        serde_json::to_string_pretty(&sarif).into_diagnostic()
    }
}

/// SARIF 2.1.0 format
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    #[serde(rename = "informationUri")]
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    properties: SarifProperties,
}

#[derive(Serialize)]
struct SarifProperties {
    rule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fix: Option<String>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
}

fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

impl SarifReport {
    fn from_findings(profile: RuleProfile, findings: &[Finding]) -> Self {
        let rules = IssueKind::all()
            .iter()
            .map(|kind| SarifRule {
                id: kind.code(),
                name: kind.display_name().to_lowercase().replace(' ', "-"),
                short_description: SarifMessage {
                    text: kind.display_name().to_string(),
                },
                full_description: SarifMessage {
                    text: kind.description().to_string(),
                },
                default_configuration: SarifConfiguration {
                    level: sarif_level(kind.default_severity()),
                },
            })
            .collect();

        let results = findings
            .iter()
            .map(|finding| SarifResult {
                rule_id: finding.issue.code(),
                level: sarif_level(finding.severity),
                message: SarifMessage {
                    text: finding.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: finding.location.file.to_string_lossy().replace('\\', "/"),
                        },
                        region: SarifRegion {
                            start_line: finding.location.line,
                            start_column: finding.location.column,
                        },
                    },
                }],
                properties: SarifProperties {
                    rule: profile.rule_id(),
                    fix: finding.fix.clone(),
                },
            })
            .collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "checkreturnvalue",
                        version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/KevinDoremy/checkreturnvalue",
                        rules,
                    },
                },
                results,
            }],
        }
    }
}
