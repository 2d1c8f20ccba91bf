//! Read-only syntax tree model
//!
//! The usage analysis only needs to walk a tree: look up a node's parent,
//! enumerate its children in source order and classify its shape. Parsers
//! lower tree-sitter concrete syntax into a [`SyntaxArena`], which owns the
//! nodes; everything downstream borrows it through the [`SyntaxTree`] trait.
//!
//! Parent links are arena indices, so they never keep a node alive and the
//! arena can be shared across threads once built.

mod arena;

pub use arena::{Binding, NodeId, Span, SyntaxArena, SyntaxNode, TreeBuilder};

/// Shape of a syntax node, as far as value-usage analysis is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Any value-producing expression or statement not listed below
    Expression,
    /// A method or function invocation
    Call,
    /// `receiver.selector` link of a chain; the selector is the rightmost operation
    QualifiedReference,
    /// Ordered statement sequence; only the last element can yield a value
    Block,
    /// Lambda literal or anonymous function
    Lambda,
    /// Method, function, accessor or constructor declaration
    Callable { constructor: bool },
    /// Static/instance initializer block or Kotlin `init`
    ClassInitializer,
    /// Class, interface, enum, object or companion declaration
    TypeDeclaration,
    /// Non-expression syntax: declarators, parameters, catch clauses, roots
    Other,
}

impl NodeKind {
    /// Whether nodes of this kind produce a value the enclosing syntax may consume
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Expression
                | NodeKind::Call
                | NodeKind::QualifiedReference
                | NodeKind::Block
                | NodeKind::Lambda
        )
    }
}

/// Traversal capability required by the analysis core
pub trait SyntaxTree {
    type NodeId: Copy + Eq;

    /// Shape of the node
    fn kind(&self, node: Self::NodeId) -> NodeKind;

    /// Syntactic parent; `None` only for the root
    fn parent(&self, node: Self::NodeId) -> Option<Self::NodeId>;

    /// Children in source order
    fn children(&self, node: Self::NodeId) -> &[Self::NodeId];

    /// Selector of a qualified reference, `None` for every other kind
    fn selector(&self, node: Self::NodeId) -> Option<Self::NodeId>;
}

/// Iterate over the strict ancestors of `node`, innermost first
pub fn ancestors<'a, T>(tree: &'a T, node: T::NodeId) -> impl Iterator<Item = T::NodeId> + 'a
where
    T: SyntaxTree,
    T::NodeId: 'a,
{
    std::iter::successors(tree.parent(node), move |&current| tree.parent(current))
}
