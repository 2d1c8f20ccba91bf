use super::common::{child_of_kind, named_children, node_text, ParsedUnit, Parser, UnitBuilder};
use crate::index::{simple_type_name, Annotation, ClassDecl, Language, MethodDecl, Receiver};
use crate::tree::{NodeId, NodeKind, Span};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser as TsParser};

/// Kotlin source code parser using tree-sitter
pub struct KotlinParser;

impl KotlinParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let header = child_of_kind(root, "package_header")?;
        child_of_kind(header, "identifier").map(|id| node_text(id, source).to_string())
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<String> {
        let mut imports = Vec::new();
        let Some(list) = child_of_kind(root, "import_list") else {
            return imports;
        };

        for import in named_children(list) {
            if import.kind() != "import_header" {
                continue;
            }
            // tree-sitter-kotlin doesn't use field names for import identifiers
            if let Some(identifier) = child_of_kind(import, "identifier") {
                let text = node_text(identifier, source);
                if child_of_kind(import, "wildcard_import").is_some() {
                    imports.push(format!("{}.*", text));
                } else {
                    imports.push(text.to_string());
                }
            }
        }

        imports
    }

    fn extract_file_annotations(&self, unit: &mut UnitBuilder, root: Node) {
        let annotations = unit.annotations(
            named_children(root)
                .into_iter()
                .filter(|child| child.kind() == "file_annotation"),
        );
        unit.add_file_annotations(annotations);
    }

    fn declaration_annotations(&self, unit: &UnitBuilder, node: Node) -> Vec<Annotation> {
        let mut nodes = Vec::new();
        if let Some(modifiers) = child_of_kind(node, "modifiers") {
            nodes.extend(
                named_children(modifiers)
                    .into_iter()
                    .filter(|m| m.kind() == "annotation"),
            );
        }

        // tree-sitter-kotlin sometimes places annotations in a preceding
        // prefix_expression sibling instead of in modifiers
        if let Some(previous) = node.prev_named_sibling() {
            if previous.kind() == "prefix_expression" {
                nodes.extend(
                    named_children(previous)
                        .into_iter()
                        .filter(|c| c.kind() == "annotation"),
                );
            }
        }

        unit.annotations(nodes)
    }

    fn lower(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        if node.is_extra() {
            return;
        }

        match node.kind() {
            "package_header" | "import_list" | "file_annotation" | "shebang_line" | "modifiers"
            | "annotation" => {}

            "function_body"
            | "control_structure_body"
            | "call_suffix"
            | "value_arguments"
            | "value_argument"
            | "annotated_lambda" => self.lower_children(unit, node, parent, class),

            "statements" => {
                self.lower_as(unit, NodeKind::Block, node, parent, class);
            }
            "lambda_literal" | "anonymous_function" => {
                self.lower_as(unit, NodeKind::Lambda, node, parent, class);
            }

            "function_declaration" => self.lower_function(unit, node, parent, class),
            "secondary_constructor" => self.lower_constructor(unit, node, parent, class),
            "getter" | "setter" => {
                self.lower_as(unit, NodeKind::Callable { constructor: false }, node, parent, class);
            }
            "anonymous_initializer" => {
                self.lower_as(unit, NodeKind::ClassInitializer, node, parent, class);
            }

            "class_declaration" | "object_declaration" | "companion_object" => {
                self.lower_type(unit, node, parent, class)
            }

            "call_expression" => self.lower_call(unit, node, parent, class),
            "navigation_expression" => self.lower_navigation(unit, node, parent, class),

            "source_file"
            | "class_body"
            | "enum_class_body"
            | "primary_constructor"
            | "class_parameters"
            | "class_parameter"
            | "function_value_parameters"
            | "parameter"
            | "property_declaration"
            | "variable_declaration"
            | "when_entry"
            | "catch_block"
            | "finally_block" => {
                self.lower_as(unit, NodeKind::Other, node, parent, class);
            }

            _ => {
                self.lower_as(unit, NodeKind::Expression, node, parent, class);
            }
        }
    }

    fn lower_as(
        &self,
        unit: &mut UnitBuilder,
        kind: NodeKind,
        node: Node,
        parent: Option<NodeId>,
        class: Option<usize>,
    ) -> NodeId {
        let id = unit.push(kind, parent, node);
        self.lower_children(unit, node, Some(id), class);
        id
    }

    fn lower_children(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        for child in named_children(node) {
            self.lower(unit, child, parent, class);
        }
    }

    fn lower_type(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let name = named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "type_identifier" | "simple_identifier"))
            .map(|c| unit.text(c).to_string())
            .unwrap_or_else(|| {
                if node.kind() == "companion_object" {
                    "Companion".to_string()
                } else {
                    "<anonymous>".to_string()
                }
            });

        let id = unit.push(NodeKind::TypeDeclaration, parent, node);
        let decl = ClassDecl {
            qualified_name: unit.qualify(&name, class),
            name,
            annotations: self.declaration_annotations(unit, node),
            parent: class,
            location: unit.location(node),
        };
        let index = unit.add_class(id, decl);

        self.lower_children(unit, node, Some(id), Some(index));
    }

    fn lower_function(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let name = self
            .function_name(node)
            .map(|n| unit.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let (min_arity, max_arity) = child_of_kind(node, "function_value_parameters")
            .map(|parameters| parameter_arity(parameters, unit.source()))
            .unwrap_or((0, Some(0)));

        let id = unit.push(NodeKind::Callable { constructor: false }, parent, node);
        let decl = MethodDecl {
            name,
            owner: class,
            annotations: self.declaration_annotations(unit, node),
            is_constructor: false,
            returns_void: self.returns_unit(unit, node),
            min_arity,
            max_arity,
            extension_of: self.extension_receiver(node, unit.source()),
            location: unit.location(node),
        };
        unit.add_method(id, decl);

        self.lower_children(unit, node, Some(id), class);
    }

    fn lower_constructor(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let name = class
            .and_then(|c| unit.class_name(c))
            .unwrap_or("constructor")
            .to_string();
        let (min_arity, max_arity) = child_of_kind(node, "function_value_parameters")
            .map(|parameters| parameter_arity(parameters, unit.source()))
            .unwrap_or((0, Some(0)));

        let id = unit.push(NodeKind::Callable { constructor: true }, parent, node);
        let decl = MethodDecl {
            name,
            owner: class,
            annotations: self.declaration_annotations(unit, node),
            is_constructor: true,
            returns_void: None,
            min_arity,
            max_arity,
            extension_of: None,
            location: unit.location(node),
        };
        unit.add_method(id, decl);

        self.lower_children(unit, node, Some(id), class);
    }

    /// Name of a function; for `fun Type.name()` the identifier after the receiver
    fn function_name<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if let Some(name) = node.child_by_field_name("name") {
            return Some(name);
        }
        let mut name = None;
        for child in named_children(node) {
            match child.kind() {
                "simple_identifier" => name = Some(child),
                "function_value_parameters" => break,
                _ => {}
            }
        }
        name
    }

    /// `Type` in `fun Type.name()`
    fn extension_receiver(&self, node: Node, source: &str) -> Option<String> {
        for child in named_children(node) {
            match child.kind() {
                "user_type" | "nullable_type" => return simple_type_name(node_text(child, source)),
                "simple_identifier" | "function_value_parameters" => return None,
                _ => {}
            }
        }
        None
    }

    /// `Some(true)` for an explicit or implied `Unit`, `None` for an inferred expression body
    fn returns_unit(&self, unit: &UnitBuilder, node: Node) -> Option<bool> {
        let mut cursor = node.walk();
        let mut after_colon = false;
        for child in node.children(&mut cursor) {
            if child.kind() == ":" {
                after_colon = true;
                continue;
            }
            if after_colon && child.is_named() {
                let written = unit.text(child).trim();
                return Some(written == "Unit" || written == "kotlin.Unit");
            }
        }

        match child_of_kind(node, "function_body") {
            Some(body) if child_of_kind(body, "=").is_some() => None,
            _ => Some(true),
        }
    }

    /// `recv.name(args)` becomes `Qualified[recv, Call]`, `name(args)` a plain `Call`
    fn lower_call(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let Some(callee) = named_children(node).into_iter().next() else {
            self.lower_as(unit, NodeKind::Expression, node, parent, class);
            return;
        };
        let suffix = child_of_kind(node, "call_suffix");
        let arity = suffix.map(argument_count).unwrap_or(0);

        match callee.kind() {
            "simple_identifier" => {
                let call = unit.push(NodeKind::Call, parent, node);
                let name = unit.text(callee).to_string();
                unit.add_call(call, name, arity, Receiver::Implicit, None, callee);
                if let Some(suffix) = suffix {
                    self.lower_children(unit, suffix, Some(call), class);
                }
            }
            "navigation_expression" => {
                let receiver = named_children(callee).into_iter().next();
                let navigation = child_of_kind(callee, "navigation_suffix");
                let identifier = navigation.and_then(|n| child_of_kind(n, "simple_identifier"));

                let (Some(receiver), Some(navigation), Some(identifier)) = (receiver, navigation, identifier) else {
                    self.lower_as(unit, NodeKind::Expression, node, parent, class);
                    return;
                };

                let qualified = unit.push(NodeKind::QualifiedReference, parent, node);
                self.lower(unit, receiver, Some(qualified), class);

                let span = Span::new(navigation.start_byte(), node.end_byte());
                let call = unit.push_span(NodeKind::Call, Some(qualified), span);
                unit.set_selector(qualified, call);

                let (receiver, receiver_type) = match receiver.kind() {
                    "this_expression" | "super_expression" => (Receiver::This, None),
                    "simple_identifier" => {
                        let variable = unit.text(receiver);
                        (
                            Receiver::Named(variable.to_string()),
                            declared_type(receiver, variable, unit.source()),
                        )
                    }
                    _ => (Receiver::Expression, None),
                };
                let name = unit.text(identifier).to_string();
                unit.add_call(call, name, arity, receiver, receiver_type, identifier);

                if let Some(suffix) = suffix {
                    self.lower_children(unit, suffix, Some(call), class);
                }
            }
            _ => {
                self.lower_as(unit, NodeKind::Expression, node, parent, class);
            }
        }
    }

    /// Property access `a.b` outside a call
    fn lower_navigation(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let receiver = named_children(node).into_iter().next();
        let navigation = child_of_kind(node, "navigation_suffix");
        let (Some(receiver), Some(navigation)) = (receiver, navigation) else {
            self.lower_as(unit, NodeKind::Expression, node, parent, class);
            return;
        };

        let qualified = unit.push(NodeKind::QualifiedReference, parent, node);
        self.lower(unit, receiver, Some(qualified), class);
        let selector = self.lower_as(unit, NodeKind::Expression, navigation, Some(qualified), class);
        unit.set_selector(qualified, selector);
    }
}

/// Type the variable `name` is declared with in a scope enclosing `at`,
/// innermost scope first. `val x = Type()` counts as declaring `Type`.
fn declared_type(at: Node, name: &str, source: &str) -> Option<String> {
    let mut scope = at.parent();
    while let Some(node) = scope {
        for child in named_children(node) {
            if let Some(found) = declaration_type(child, name, source) {
                return Some(found);
            }
        }
        scope = node.parent();
    }
    None
}

fn declaration_type(node: Node, name: &str, source: &str) -> Option<String> {
    match node.kind() {
        "property_declaration" => {
            let variable = child_of_kind(node, "variable_declaration")?;
            if !declares(variable, name, source) {
                return None;
            }
            written_type(variable, source).or_else(|| constructed_type(node, source))
        }
        "variable_declaration" | "parameter" | "class_parameter" if declares(node, name, source) => {
            written_type(node, source)
        }
        "function_value_parameters" | "class_parameters" | "primary_constructor" | "lambda_parameters" => {
            named_children(node)
                .into_iter()
                .find_map(|child| declaration_type(child, name, source))
        }
        _ => None,
    }
}

fn declares(node: Node, name: &str, source: &str) -> bool {
    child_of_kind(node, "simple_identifier")
        .map(|identifier| node_text(identifier, source) == name)
        .unwrap_or(false)
}

fn written_type(node: Node, source: &str) -> Option<String> {
    named_children(node)
        .into_iter()
        .find(|child| matches!(child.kind(), "user_type" | "nullable_type"))
        .and_then(|ty| simple_type_name(node_text(ty, source)))
}

/// `Type` of an initializer written as a constructor call `Type(...)`
fn constructed_type(property: Node, source: &str) -> Option<String> {
    let call = child_of_kind(property, "call_expression")?;
    let callee = named_children(call).into_iter().next()?;
    let text = node_text(callee, source);
    let is_constructor = callee.kind() == "simple_identifier"
        && text.chars().next().map(char::is_uppercase).unwrap_or(false);
    if is_constructor {
        Some(text.to_string())
    } else {
        None
    }
}

/// Value arguments plus a trailing lambda
fn argument_count(suffix: Node) -> usize {
    let values = child_of_kind(suffix, "value_arguments")
        .map(|args| {
            named_children(args)
                .into_iter()
                .filter(|a| a.kind() == "value_argument")
                .count()
        })
        .unwrap_or(0);
    let trailing = usize::from(child_of_kind(suffix, "annotated_lambda").is_some());
    values + trailing
}

/// (min, max) arguments accepted; defaults lower the minimum, `vararg` lifts the maximum
fn parameter_arity(parameters: Node, source: &str) -> (usize, Option<usize>) {
    let mut count = 0usize;
    let mut optional = 0usize;
    let mut vararg = false;
    let mut pending_vararg = false;

    let mut cursor = parameters.walk();
    for child in parameters.children(&mut cursor) {
        match child.kind() {
            "parameter_modifiers" => {
                pending_vararg = node_text(child, source)
                    .split_whitespace()
                    .any(|modifier| modifier == "vararg");
            }
            "parameter" => {
                count += 1;
                if pending_vararg {
                    vararg = true;
                    optional += 1;
                    pending_vararg = false;
                }
            }
            "=" => optional += 1,
            _ => {}
        }
    }

    let min = count.saturating_sub(optional);
    if vararg {
        (min, None)
    } else {
        (min, Some(count))
    }
}

impl Parser for KotlinParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParsedUnit> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_kotlin::language())
            .into_diagnostic()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Kotlin file"))?;

        let root = tree.root_node();
        let package = self.extract_package(root, contents);
        let imports = self.extract_imports(root, contents);

        let mut unit = UnitBuilder::new(path, contents, package, imports);
        self.extract_file_annotations(&mut unit, root);
        self.lower(&mut unit, root, None, None);
        let unit = unit.finish(Language::Kotlin);

        debug!(
            "Parsed {}: {} classes, {} methods, {} calls",
            path.display(),
            unit.classes.len(),
            unit.methods.len(),
            unit.calls.len()
        );

        Ok(unit)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}
