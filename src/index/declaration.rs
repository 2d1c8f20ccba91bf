use crate::tree::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Starting byte offset
    pub start_byte: usize,
    /// Ending byte offset
    pub end_byte: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Kotlin,
    Java,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Kotlin => "kotlin",
            Language::Java => "java",
        }
    }
}

/// An annotation applied to a declaration, package or file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Name as written in source, without `@` or use-site target
    pub name: String,
    /// Name resolved against the file's imports and package
    pub qualified_name: String,
    /// String-valued arguments; a lone positional string is stored as `value`
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn simple_name(&self) -> &str {
        short_name(&self.qualified_name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Match against a configured annotation name.
    ///
    /// Names without a dot match any annotation with that simple name,
    /// dotted names must match the resolved qualified name exactly.
    pub fn matches(&self, configured: &str) -> bool {
        if configured.contains('.') {
            self.qualified_name == configured
        } else {
            self.simple_name() == configured
        }
    }
}

/// Last segment of a dotted name
pub fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Simple name of a written type: `java.util.List<String>` is `List`,
/// `Foo?` and `Foo[]` are `Foo`. Inferred `var`/`val` have no name.
pub fn simple_type_name(written: &str) -> Option<String> {
    let base = written.split('<').next().unwrap_or(written);
    let base = base.trim().trim_end_matches('?').trim_end_matches("[]").trim();
    let simple = short_name(base);
    if simple.is_empty() || simple == "var" || !simple.chars().all(|c| c.is_alphanumeric() || c == '_') {
        None
    } else {
        Some(simple.to_string())
    }
}

/// Resolve a type name as written in source to a qualified name
pub fn resolve_type_name(written: &str, imports: &[String], package: Option<&str>) -> String {
    if written.contains('.') {
        return written.to_string();
    }

    if let Some(import) = imports
        .iter()
        .find(|import| !import.ends_with('*') && short_name(import) == written)
    {
        return import.clone();
    }

    match package {
        Some(package) if !package.is_empty() => format!("{}.{}", package, written),
        _ => written.to_string(),
    }
}

/// A class-like declaration (class, interface, enum, object, companion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub qualified_name: String,
    pub annotations: Vec<Annotation>,
    /// Enclosing class, by index in the same unit
    pub parent: Option<usize>,
    pub location: Location,
}

/// A method, function or constructor declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// Declaring class, by index in the same unit; `None` for top-level functions
    pub owner: Option<usize>,
    pub annotations: Vec<Annotation>,
    pub is_constructor: bool,
    /// `Some(true)` for `void`/`Unit`, `None` when the return type is inferred
    pub returns_void: Option<bool>,
    /// Fewest arguments a call must pass
    pub min_arity: usize,
    /// Most arguments a call may pass; `None` for varargs
    pub max_arity: Option<usize>,
    /// Receiver type of a Kotlin extension function (`fun Type.name()`)
    pub extension_of: Option<String>,
    pub location: Location,
}

impl MethodDecl {
    pub fn accepts_arity(&self, arity: usize) -> bool {
        arity >= self.min_arity && self.max_arity.map_or(true, |max| arity <= max)
    }
}

/// Receiver of a call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// `foo()`
    Implicit,
    /// `this.foo()` or `super.foo()`
    This,
    /// `Name.foo()` where `Name` is a plain identifier
    Named(String),
    /// Any other receiver expression
    Expression,
}

/// A call expression found while lowering a file
#[derive(Debug, Clone)]
pub struct CallSite {
    /// The call node in the unit's tree
    pub node: NodeId,
    /// Simple name of the invoked method
    pub name: String,
    /// Number of arguments, trailing lambdas included
    pub arity: usize,
    pub receiver: Receiver,
    /// Simple type name a [`Receiver::Named`] variable is declared with
    pub receiver_type: Option<String>,
    pub location: Location,
}
