mod json;
mod sarif;
mod terminal;

pub use json::JsonReporter;
pub use sarif::SarifReporter;
pub use terminal::TerminalReporter;

use crate::analysis::Finding;
use crate::config::RuleProfile;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
}

impl ReportFormat {
    /// Parse the `report.format` value of a config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "terminal" | "text" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            "sarif" => Some(ReportFormat::Sarif),
            _ => None,
        }
    }
}

/// Reporter for outputting findings
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    profile: RuleProfile,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>, profile: RuleProfile) -> Self {
        Self {
            format,
            output_path,
            profile,
        }
    }

    /// Report the findings
    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new(self.profile).report(findings),
            ReportFormat::Json => {
                let json = JsonReporter::new(self.profile).render(findings)?;
                self.emit(&json, "Report")
            }
            ReportFormat::Sarif => {
                let sarif = SarifReporter::new(self.profile).render(findings)?;
                self.emit(&sarif, "SARIF report")
            }
        }
    }

    fn emit(&self, contents: &str, label: &str) -> Result<()> {
        match &self.output_path {
            Some(path) => {
                write_report(path, contents)?;
                println!("{} written to: {}", label, path.display());
            }
            None => println!("{}", contents),
        }
        Ok(())
    }
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write report to {}", path.display()))
}
