use checkreturnvalue::analysis::{Analyzer, Finding, Severity};
use checkreturnvalue::config::{Config, ProjectProperties, RuleProfile, PROPERTY_FILE};
use checkreturnvalue::discovery::{FileFinder, FileStats};
use checkreturnvalue::index::{IndexBuilder, ParallelIndexBuilder};
use checkreturnvalue::report::{ReportFormat, Reporter};
use clap::Parser;
use colored::Colorize;
use miette::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// checkreturnvalue - Find ignored return values of annotated methods (Kotlin/Java)
#[derive(Parser, Debug)]
#[command(name = "checkreturnvalue")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory (or a single source file) to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the properties file holding custom/excluded annotations
    /// (default: <PATH>/gradle.properties)
    #[arg(long, value_name = "FILE")]
    properties: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format (default: from config, else terminal)
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Output file (for json/sarif formats)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Preset marker list
    #[arg(long, value_enum)]
    profile: Option<RuleProfile>,

    /// Additional marker annotation (can be specified multiple times)
    #[arg(long, value_name = "NAME")]
    custom_annotation: Vec<String>,

    /// Marker annotation to ignore (can be specified multiple times)
    #[arg(long, value_name = "NAME")]
    exclude_annotation: Vec<String>,

    /// Annotation that cancels markers in its scope
    #[arg(long, value_name = "NAME")]
    exemption: Option<String>,

    /// Skip validation of marker placement
    #[arg(long)]
    no_misuse_check: bool,

    /// Enable parallel parsing for faster analysis
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("checkreturnvalue v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let properties = ProjectProperties::load_or_default(&properties_path(&cli));

    let findings = run_analysis(&config, &properties, &cli)?;

    let format = match cli.format {
        Some(format) => format,
        None => ReportFormat::from_name(&config.report.format).unwrap_or_else(|| {
            warn!("Unknown report format '{}', using terminal", config.report.format);
            ReportFormat::Terminal
        }),
    };
    let reporter = Reporter::new(format, cli.output.clone(), config.profile);
    reporter.report(&findings)?;

    if findings.iter().any(|f| f.severity == Severity::Error) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(project_root(&cli.path))?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    config
        .annotations
        .custom
        .extend(cli.custom_annotation.iter().cloned());
    config
        .annotations
        .exclude
        .extend(cli.exclude_annotation.iter().cloned());
    if let Some(exemption) = &cli.exemption {
        config.annotations.exemption = exemption.clone();
    }
    if cli.no_misuse_check {
        config.checks.misuse = false;
    }

    Ok(config)
}

/// Directory holding the project files, also when a single file is analyzed
fn project_root(path: &Path) -> &Path {
    if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    }
}

fn properties_path(cli: &Cli) -> PathBuf {
    cli.properties
        .clone()
        .unwrap_or_else(|| project_root(&cli.path).join(PROPERTY_FILE))
}

fn run_analysis(config: &Config, properties: &ProjectProperties, cli: &Cli) -> Result<Vec<Finding>> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder.find_files(&cli.path)?;

    let stats = FileStats::from_files(&files);
    info!(
        "Found {} files to analyze ({} Kotlin, {} Java)",
        stats.total(),
        stats.kotlin_files,
        stats.java_files
    );

    if files.is_empty() {
        if !cli.quiet {
            eprintln!("{}", "No Kotlin or Java files found.".yellow());
        }
        return Ok(Vec::new());
    }

    // Step 2: Parse and index
    let index = if cli.parallel {
        ParallelIndexBuilder::new().build_from_files(&files)
    } else {
        let pb = if cli.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(files.len() as u64)
        };
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        info!("Parsing files...");
        let mut index_builder = IndexBuilder::new();
        for file in &files {
            index_builder.process_file(file)?;
            pb.inc(1);
        }
        pb.finish_and_clear();
        index_builder.build()
    };

    // Step 3: Detect
    let analyzer = Analyzer::from_config(config, properties);
    let findings = analyzer.analyze(&index);

    info!(
        "Analysis complete in {:.2}s: {} findings",
        start_time.elapsed().as_secs_f64(),
        findings.len()
    );

    Ok(findings)
}
