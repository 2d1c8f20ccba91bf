use crate::analysis::{Finding, IssueKind, Severity};
use crate::config::RuleProfile;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    profile: RuleProfile,
}

impl TerminalReporter {
    pub fn new(profile: RuleProfile) -> Self {
        Self { profile }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No ignored return values found!".green().bold());
            return Ok(());
        }

        // Group by file
        let mut by_file: BTreeMap<PathBuf, Vec<&Finding>> = BTreeMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.clone())
                .or_default()
                .push(finding);
        }

        println!();
        println!(
            "{}",
            format!("Found {} issues ({}):", findings.len(), self.profile.rule_id())
                .yellow()
                .bold()
        );
        println!();

        for (file, items) in &by_file {
            println!("{}", file.display().to_string().cyan().bold());

            for item in items {
                self.print_item(item);
            }

            println!();
        }

        self.print_summary(findings);

        Ok(())
    }

    fn print_item(&self, item: &Finding) {
        let severity_str = match item.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };

        let location = format!("{}:{}", item.location.line, item.location.column);

        println!(
            "  {} {} [{}] {}",
            location.dimmed(),
            severity_str,
            item.issue.code().dimmed(),
            item.message
        );

        if let Some(fix) = &item.fix {
            println!(
                "    {} replace '{}' with '{}'",
                "fix:".green(),
                item.name.white(),
                fix.white().bold()
            );
        }
    }

    fn print_summary(&self, findings: &[Finding]) {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;

        for item in findings {
            match item.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
        }

        println!("{}", "─".repeat(60).dimmed());

        let mut severity_parts = Vec::new();
        if errors > 0 {
            severity_parts.push(format!("{} errors", errors).red().to_string());
        }
        if warnings > 0 {
            severity_parts.push(format!("{} warnings", warnings).yellow().to_string());
        }
        if infos > 0 {
            severity_parts.push(format!("{} info", infos).blue().to_string());
        }
        println!("Summary: {}", severity_parts.join(", "));

        for kind in IssueKind::all() {
            let count = findings.iter().filter(|f| f.issue == *kind).count();
            if count > 0 {
                println!(
                    "  {} {}",
                    kind.code().dimmed(),
                    format!("{} × {}", count, kind.display_name()).dimmed()
                );
            }
        }
        println!();
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new(RuleProfile::default())
    }
}
