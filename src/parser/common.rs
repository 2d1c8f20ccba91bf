use crate::index::{
    resolve_type_name, Annotation, CallSite, ClassDecl, Language, Location, MethodDecl, Receiver,
};
use crate::tree::{ancestors, Binding, NodeId, NodeKind, Span, SyntaxArena, TreeBuilder};
use miette::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// A source file lowered into a syntax arena plus its declaration tables
#[derive(Debug)]
pub struct ParsedUnit {
    pub path: PathBuf,
    pub language: Language,

    /// Package/namespace of the file
    pub package: Option<String>,

    /// Import statements, wildcard imports keep their `.*` suffix
    pub imports: Vec<String>,

    /// Java package annotations or Kotlin `@file:` annotations
    pub file_annotations: Vec<Annotation>,

    pub tree: SyntaxArena,
    pub classes: Vec<ClassDecl>,
    pub methods: Vec<MethodDecl>,
    pub calls: Vec<CallSite>,
}

impl ParsedUnit {
    /// Method whose body contains `node`, innermost first
    pub fn enclosing_method(&self, node: NodeId) -> Option<usize> {
        ancestors(&self.tree, node).find_map(|ancestor| match self.tree.binding(ancestor) {
            Some(Binding::Method(index)) => Some(index),
            _ => None,
        })
    }

    /// Classes lexically enclosing `node`, innermost first
    pub fn enclosing_classes(&self, node: NodeId) -> Vec<usize> {
        ancestors(&self.tree, node)
            .filter_map(|ancestor| match self.tree.binding(ancestor) {
                Some(Binding::Class(index)) => Some(index),
                _ => None,
            })
            .collect()
    }

    /// `class` followed by its enclosing classes
    pub fn class_chain(&self, class: usize) -> impl Iterator<Item = &ClassDecl> + '_ {
        std::iter::successors(self.classes.get(class), move |decl| {
            decl.parent.and_then(|parent| self.classes.get(parent))
        })
    }

    pub fn is_package_info(&self) -> bool {
        self.path
            .file_name()
            .map(|name| name == "package-info.java")
            .unwrap_or(false)
    }
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Parse a source file and lower it into a [`ParsedUnit`]
    fn parse(&self, path: &Path, contents: &str) -> Result<ParsedUnit>;
}

/// Helper to convert tree-sitter Point to Location
pub fn point_to_location(
    file: &Path,
    start: tree_sitter::Point,
    start_byte: usize,
    end_byte: usize,
) -> Location {
    Location::new(
        file.to_path_buf(),
        start.row + 1,    // tree-sitter uses 0-indexed lines
        start.column + 1, // tree-sitter uses 0-indexed columns
        start_byte,
        end_byte,
    )
}

/// Extract text from a node
pub fn node_text<'a>(node: tree_sitter::Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Named children of a node, comments excluded
pub fn named_children(node: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// First child of the given kind
pub fn child_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(\w+)\s*=\s*"((?:[^"\\]|\\.)*)""#).expect("attribute pattern is valid")
    })
}

fn positional_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\s*"((?:[^"\\]|\\.)*)"\s*$"#).expect("positional pattern is valid")
    })
}

/// Parse the source text of one annotation node.
///
/// Accepts `@Name`, `@a.b.Name(...)`, Kotlin use-site targets (`@get:Name`,
/// `@file:Name`) and bracketed groups (`@file:[A B]`), which yield several
/// annotations.
pub fn parse_annotation_text(text: &str, imports: &[String], package: Option<&str>) -> Vec<Annotation> {
    let Some(body) = text.trim().strip_prefix('@') else {
        return Vec::new();
    };

    let body = strip_use_site_target(body);
    if let Some(group) = body.strip_prefix('[') {
        let group = group.trim_end().strip_suffix(']').unwrap_or(group);
        return split_annotation_group(group)
            .into_iter()
            .filter_map(|entry| parse_single(entry, imports, package))
            .collect();
    }

    parse_single(body, imports, package).into_iter().collect()
}

fn strip_use_site_target(body: &str) -> &str {
    let name_end = body
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    match body[name_end..].trim_start().strip_prefix(':') {
        Some(rest) => rest.trim_start(),
        None => body,
    }
}

/// Split `A B(x = "1") C` at top-level whitespace
fn split_annotation_group(group: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = None;

    for (index, c) in group.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 && !in_string => {
                if let Some(begin) = start.take() {
                    entries.push(&group[begin..index]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        entries.push(&group[begin..]);
    }
    entries
}

fn parse_single(entry: &str, imports: &[String], package: Option<&str>) -> Option<Annotation> {
    let (name_part, arguments) = match entry.find('(') {
        Some(open) => {
            let close = entry.rfind(')').unwrap_or(entry.len());
            (&entry[..open], Some(&entry[open + 1..close.max(open + 1)]))
        }
        None => (entry, None),
    };

    // drop generic arguments and whitespace around dotted names
    let name: String = name_part
        .split('<')
        .next()
        .unwrap_or(name_part)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if name.is_empty() {
        return None;
    }

    let qualified_name = resolve_type_name(&name, imports, package);
    let mut annotation = Annotation::new(name, qualified_name);

    if let Some(arguments) = arguments {
        for capture in attribute_pattern().captures_iter(arguments) {
            annotation
                .attributes
                .insert(capture[1].to_string(), unescape(&capture[2]));
        }
        if annotation.attributes.is_empty() {
            if let Some(capture) = positional_pattern().captures(arguments) {
                annotation
                    .attributes
                    .insert("value".to_string(), unescape(&capture[1]));
            }
        }
    }

    Some(annotation)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Accumulates the arena and declaration tables while a parser walks a file
pub(crate) struct UnitBuilder<'s> {
    path: &'s Path,
    source: &'s str,
    package: Option<String>,
    imports: Vec<String>,
    tree: TreeBuilder,
    file_annotations: Vec<Annotation>,
    classes: Vec<ClassDecl>,
    methods: Vec<MethodDecl>,
    calls: Vec<CallSite>,
}

impl<'s> UnitBuilder<'s> {
    pub fn new(path: &'s Path, source: &'s str, package: Option<String>, imports: Vec<String>) -> Self {
        Self {
            path,
            source,
            package,
            imports,
            tree: TreeBuilder::new(),
            file_annotations: Vec::new(),
            classes: Vec::new(),
            methods: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn text(&self, node: tree_sitter::Node<'_>) -> &'s str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    pub fn location(&self, node: tree_sitter::Node<'_>) -> Location {
        point_to_location(self.path, node.start_position(), node.start_byte(), node.end_byte())
    }

    /// Push a node covering the whole of `node`
    pub fn push(&mut self, kind: NodeKind, parent: Option<NodeId>, node: tree_sitter::Node<'_>) -> NodeId {
        self.tree
            .push(kind, parent, Span::new(node.start_byte(), node.end_byte()))
    }

    pub fn push_span(&mut self, kind: NodeKind, parent: Option<NodeId>, span: Span) -> NodeId {
        self.tree.push(kind, parent, span)
    }

    pub fn set_selector(&mut self, qualified: NodeId, selector: NodeId) {
        self.tree.set_selector(qualified, selector);
    }

    /// Parse every annotation node in `nodes`
    pub fn annotations<'t>(&self, nodes: impl IntoIterator<Item = tree_sitter::Node<'t>>) -> Vec<Annotation> {
        nodes
            .into_iter()
            .flat_map(|node| {
                parse_annotation_text(self.text(node), &self.imports, self.package.as_deref())
            })
            .collect()
    }

    pub fn add_file_annotations(&mut self, annotations: Vec<Annotation>) {
        self.file_annotations.extend(annotations);
    }

    pub fn qualify(&self, name: &str, enclosing: Option<usize>) -> String {
        match enclosing.and_then(|index| self.classes.get(index)) {
            Some(outer) => format!("{}.{}", outer.qualified_name, name),
            None => match &self.package {
                Some(package) if !package.is_empty() => format!("{}.{}", package, name),
                _ => name.to_string(),
            },
        }
    }

    pub fn add_class(&mut self, node: NodeId, decl: ClassDecl) -> usize {
        let index = self.classes.len();
        self.classes.push(decl);
        self.tree.bind(node, Binding::Class(index));
        index
    }

    pub fn add_method(&mut self, node: NodeId, decl: MethodDecl) -> usize {
        let index = self.methods.len();
        self.methods.push(decl);
        self.tree.bind(node, Binding::Method(index));
        index
    }

    pub fn add_call(
        &mut self,
        node: NodeId,
        name: String,
        arity: usize,
        receiver: Receiver,
        receiver_type: Option<String>,
        at: tree_sitter::Node<'_>,
    ) {
        let index = self.calls.len();
        let location = self.location(at);
        self.calls.push(CallSite {
            node,
            name,
            arity,
            receiver,
            receiver_type,
            location,
        });
        self.tree.bind(node, Binding::Call(index));
    }

    pub fn class_name(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|class| class.name.as_str())
    }

    pub fn finish(self, language: Language) -> ParsedUnit {
        ParsedUnit {
            path: self.path.to_path_buf(),
            language,
            package: self.package,
            imports: self.imports,
            file_annotations: self.file_annotations,
            tree: self.tree.finish(),
            classes: self.classes,
            methods: self.methods,
            calls: self.calls,
        }
    }
}
