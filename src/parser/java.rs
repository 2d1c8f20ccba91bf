use super::common::{child_of_kind, named_children, node_text, ParsedUnit, Parser, UnitBuilder};
use crate::index::{simple_type_name, ClassDecl, Language, MethodDecl, Receiver};
use crate::tree::{NodeId, NodeKind, Span};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tracing::debug;
use tree_sitter::{Node, Parser as TsParser};

/// Java source code parser using tree-sitter
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let package = child_of_kind(root, "package_declaration")?;
        let mut cursor = package.walk();
        let name = package
            .children(&mut cursor)
            .find(|child| child.kind() == "scoped_identifier" || child.kind() == "identifier")
            .map(|child| node_text(child, source).to_string());
        name
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<String> {
        let mut imports = Vec::new();

        for child in named_children(root) {
            if child.kind() != "import_declaration" {
                continue;
            }
            let name = named_children(child)
                .into_iter()
                .find(|n| n.kind() == "scoped_identifier" || n.kind() == "identifier");
            if let Some(name) = name {
                let text = node_text(name, source);
                if child_of_kind(child, "asterisk").is_some() {
                    imports.push(format!("{}.*", text));
                } else {
                    imports.push(text.to_string());
                }
            }
        }

        imports
    }

    /// Annotations written before `package` in package-info.java
    fn extract_package_annotations(&self, unit: &mut UnitBuilder, root: Node) {
        if let Some(package) = child_of_kind(root, "package_declaration") {
            let annotations = unit.annotations(
                named_children(package)
                    .into_iter()
                    .filter(|n| is_annotation(*n)),
            );
            unit.add_file_annotations(annotations);
        }
    }

    fn modifier_annotations(&self, unit: &UnitBuilder, node: Node) -> Vec<crate::index::Annotation> {
        match child_of_kind(node, "modifiers") {
            Some(modifiers) => unit.annotations(
                named_children(modifiers)
                    .into_iter()
                    .filter(|n| is_annotation(*n)),
            ),
            None => Vec::new(),
        }
    }

    fn lower(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        if node.is_extra() {
            return;
        }

        match node.kind() {
            "package_declaration" | "import_declaration" | "modifiers" => {}

            // statement wrappers and argument lists add no structure of their own
            "expression_statement" | "argument_list" => {
                self.lower_children(unit, node, parent, class);
            }

            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => self.lower_type(unit, node, parent, class),

            "method_declaration" => self.lower_callable(unit, node, parent, class, false),
            "constructor_declaration" | "compact_constructor_declaration" => {
                self.lower_callable(unit, node, parent, class, true)
            }

            "block" => {
                let in_class_body = node
                    .parent()
                    .map(|p| matches!(p.kind(), "class_body" | "enum_body_declarations"))
                    .unwrap_or(false);
                if in_class_body {
                    // instance initializer
                    let initializer = unit.push(NodeKind::ClassInitializer, parent, node);
                    self.lower_as(unit, NodeKind::Block, node, Some(initializer), class);
                } else {
                    self.lower_as(unit, NodeKind::Block, node, parent, class);
                }
            }
            "constructor_body" => {
                self.lower_as(unit, NodeKind::Block, node, parent, class);
            }
            "static_initializer" => {
                self.lower_as(unit, NodeKind::ClassInitializer, node, parent, class);
            }
            "lambda_expression" => {
                self.lower_as(unit, NodeKind::Lambda, node, parent, class);
            }
            "method_invocation" => self.lower_invocation(unit, node, parent, class),

            "switch_block_statement_group" => {
                let block = unit.push(NodeKind::Block, parent, node);
                for child in named_children(node) {
                    if child.kind() != "switch_label" {
                        self.lower(unit, child, Some(block), class);
                    }
                }
            }

            "program"
            | "class_body"
            | "interface_body"
            | "enum_body"
            | "enum_body_declarations"
            | "annotation_type_body"
            | "field_declaration"
            | "variable_declarator"
            | "formal_parameters"
            | "formal_parameter"
            | "catch_clause"
            | "finally_clause"
            | "switch_block" => {
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
        let name = node
            .child_by_field_name("name")
            .map(|n| unit.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let id = unit.push(NodeKind::TypeDeclaration, parent, node);
        let decl = ClassDecl {
            qualified_name: unit.qualify(&name, class),
            name,
            annotations: self.modifier_annotations(unit, node),
            parent: class,
            location: unit.location(node),
        };
        let index = unit.add_class(id, decl);

        self.lower_children(unit, node, Some(id), Some(index));
    }

    fn lower_callable(
        &self,
        unit: &mut UnitBuilder,
        node: Node,
        parent: Option<NodeId>,
        class: Option<usize>,
        constructor: bool,
    ) {
        let name = node
            .child_by_field_name("name")
            .map(|n| unit.text(n).to_string())
            .or_else(|| class.and_then(|c| unit.class_name(c)).map(str::to_string))
            .unwrap_or_else(|| "<init>".to_string());

        let returns_void = if constructor {
            None
        } else {
            Some(
                node.child_by_field_name("type")
                    .map(|t| t.kind() == "void_type")
                    .unwrap_or(false),
            )
        };

        let (min_arity, max_arity) = node
            .child_by_field_name("parameters")
            .map(parameter_arity)
            .unwrap_or((0, Some(0)));

        let id = unit.push(NodeKind::Callable { constructor }, parent, node);
        let decl = MethodDecl {
            name,
            owner: class,
            annotations: self.modifier_annotations(unit, node),
            is_constructor: constructor,
            returns_void,
            min_arity,
            max_arity,
            extension_of: None,
            location: unit.location(node),
        };
        unit.add_method(id, decl);

        self.lower_children(unit, node, Some(id), class);
    }

    /// `recv.name(args)` becomes `Qualified[recv, Call]`, `name(args)` a plain `Call`
    fn lower_invocation(&self, unit: &mut UnitBuilder, node: Node, parent: Option<NodeId>, class: Option<usize>) {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.lower_as(unit, NodeKind::Expression, node, parent, class);
            return;
        };
        let name = unit.text(name_node).to_string();
        let arguments = node.child_by_field_name("arguments");
        let arity = arguments.map(|a| named_children(a).len()).unwrap_or(0);

        let call = match node.child_by_field_name("object") {
            Some(object) => {
                let qualified = unit.push(NodeKind::QualifiedReference, parent, node);
                self.lower(unit, object, Some(qualified), class);

                let span = Span::new(name_node.start_byte(), node.end_byte());
                let call = unit.push_span(NodeKind::Call, Some(qualified), span);
                unit.set_selector(qualified, call);

                let (receiver, receiver_type) = match object.kind() {
                    "this" | "super" => (Receiver::This, None),
                    "identifier" => {
                        let variable = unit.text(object);
                        (
                            Receiver::Named(variable.to_string()),
                            declared_type(object, variable, unit.source()),
                        )
                    }
                    _ => (Receiver::Expression, None),
                };
                unit.add_call(call, name, arity, receiver, receiver_type, name_node);
                call
            }
            None => {
                let call = unit.push(NodeKind::Call, parent, node);
                unit.add_call(call, name, arity, Receiver::Implicit, None, name_node);
                call
            }
        };

        if let Some(arguments) = arguments {
            self.lower_children(unit, arguments, Some(call), class);
        }
    }
}

fn is_annotation(node: Node) -> bool {
    matches!(node.kind(), "marker_annotation" | "annotation")
}

/// Type the variable `name` is declared with in a scope enclosing `at`.
/// Locals, parameters, fields and for-each variables are searched from the
/// innermost scope outward.
fn declared_type(at: Node, name: &str, source: &str) -> Option<String> {
    let mut scope = at.parent();
    while let Some(node) = scope {
        if node.kind() == "enhanced_for_statement" {
            if let Some(found) = typed_name(node, name, source) {
                return Some(found);
            }
        }
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
        "local_variable_declaration" | "field_declaration" => {
            let declares = named_children(node).into_iter().any(|declarator| {
                declarator.kind() == "variable_declarator"
                    && declarator
                        .child_by_field_name("name")
                        .map(|n| node_text(n, source) == name)
                        .unwrap_or(false)
            });
            if !declares {
                return None;
            }
            node.child_by_field_name("type")
                .and_then(|t| simple_type_name(node_text(t, source)))
        }
        "formal_parameters" => named_children(node)
            .into_iter()
            .find_map(|parameter| typed_name(parameter, name, source)),
        "formal_parameter" | "catch_formal_parameter" | "resource" => typed_name(node, name, source),
        _ => None,
    }
}

/// `type` field of a node whose `name` field is `name`
fn typed_name(node: Node, name: &str, source: &str) -> Option<String> {
    let declared = node.child_by_field_name("name")?;
    if node_text(declared, source) != name {
        return None;
    }
    node.child_by_field_name("type")
        .and_then(|t| simple_type_name(node_text(t, source)))
}

/// (min, max) number of arguments accepted by a formal parameter list
fn parameter_arity(parameters: Node) -> (usize, Option<usize>) {
    let mut count = 0;
    let mut varargs = false;
    for parameter in named_children(parameters) {
        match parameter.kind() {
            "formal_parameter" => count += 1,
            "spread_parameter" => {
                count += 1;
                varargs = true;
            }
            _ => {}
        }
    }

    if varargs {
        (count - 1, None)
    } else {
        (count, Some(count))
    }
}

impl Parser for JavaParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<ParsedUnit> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .into_diagnostic()?;

        let tree = parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Java file"))?;

        let root = tree.root_node();
        let package = self.extract_package(root, contents);
        let imports = self.extract_imports(root, contents);

        let mut unit = UnitBuilder::new(path, contents, package, imports);
        self.extract_package_annotations(&mut unit, root);
        self.lower(&mut unit, root, None, None);
        let unit = unit.finish(Language::Java);

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

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}
