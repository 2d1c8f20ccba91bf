//! checkreturnvalue - Find ignored return values in Kotlin/Java projects
//!
//! Methods, classes or packages annotated with a marker such as
//! `@CheckReturnValue` declare that a call's result must be consumed. This
//! library finds call sites that throw such results away, using the shape of
//! the syntax tree alone.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all .kt, .kts and .java files
//! 2. **Parsing** - Parse source files with tree-sitter and lower them into a syntax arena
//! 3. **Indexing** - Collect declared classes, methods and their annotations
//! 4. **Resolution** - Match call sites to marked declarations
//! 5. **Usage Analysis** - Decide whether each call's value is consumed
//! 6. **Reporting** - Output results in various formats

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod index;
pub mod parser;
pub mod report;
pub mod tree;

pub use analysis::{is_value_discarded, Analyzer, Finding, IssueKind, Severity};
pub use config::{Config, MarkerSet, ProjectProperties, RuleProfile};
pub use discovery::FileFinder;
pub use index::{IndexBuilder, ParallelIndexBuilder, ProjectIndex};
pub use report::{ReportFormat, Reporter};
pub use tree::{SyntaxArena, SyntaxTree};
