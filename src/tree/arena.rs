use super::{NodeKind, SyntaxTree};

/// Index of a node inside its [`SyntaxArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range of a node in its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Link from a node to the declaration tables of its parsed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Index into the unit's classes
    Class(usize),
    /// Index into the unit's methods
    Method(usize),
    /// Index into the unit's call sites
    Call(usize),
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set for qualified references only
    pub selector: Option<NodeId>,
    pub span: Span,
    pub binding: Option<Binding>,
}

/// Immutable tree of lowered syntax nodes
#[derive(Debug, Clone, Default)]
pub struct SyntaxArena {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxArena {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first node pushed, if any
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn binding(&self, id: NodeId) -> Option<Binding> {
        self.node(id).binding
    }
}

impl SyntaxTree for SyntaxArena {
    type NodeId = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    fn selector(&self, node: NodeId) -> Option<NodeId> {
        let node = self.node(node);
        match node.kind {
            NodeKind::QualifiedReference => node.selector,
            _ => None,
        }
    }
}

/// Append-only builder; nodes must be pushed parent first, children in source order
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, parent: Option<NodeId>, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode {
            kind,
            parent,
            children: Vec::new(),
            selector: None,
            span,
            binding: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    /// Mark `selector` as the selector of the qualified reference `qualified`
    pub fn set_selector(&mut self, qualified: NodeId, selector: NodeId) {
        self.nodes[qualified.index()].selector = Some(selector);
    }

    pub fn bind(&mut self, node: NodeId, binding: Binding) {
        self.nodes[node.index()].binding = Some(binding);
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node.index()].kind
    }

    pub fn finish(self) -> SyntaxArena {
        SyntaxArena { nodes: self.nodes }
    }
}
