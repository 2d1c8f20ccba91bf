//! Value usage analysis
//!
//! Decides from syntactic position alone whether the value produced at a
//! node is consumed by its surrounding context.
//!
//! ## Algorithm
//!
//! 1. Find the nearest expression at or above the node
//! 2. Climb through every qualified reference the expression is the selector of
//! 3. Inspect the parent of the outermost link:
//!    - a block consumes only its tail, and only when the block itself yields a value
//!    - a constructor body never yields a value
//!    - anything else (initializer, argument, return, expression body) consumes it
//!
//! A block tail that is not owned by a callable continues the walk from the
//! block's owner, so `if`, `when` and `try` used as values are followed outward.
//!
//! ```kotlin
//! fun a() { foo() }          // discarded
//! fun b() = foo()            // used
//! val c = if (x) { foo() } else { bar() }  // used
//! list.map { foo() }         // used, lambda tail
//! ```

use crate::tree::{NodeKind, SyntaxTree};

/// Nearest node at or above `node` that produces a value
pub fn nearest_expression<T: SyntaxTree>(tree: &T, node: T::NodeId) -> Option<T::NodeId> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if tree.kind(candidate).is_expression() {
            return Some(candidate);
        }
        current = tree.parent(candidate);
    }
    None
}

/// Returns true when the value produced at `node` is never consumed
pub fn is_value_discarded<T: SyntaxTree>(tree: &T, node: T::NodeId) -> bool {
    let mut start = node;

    loop {
        let Some(mut expression) = nearest_expression(tree, start) else {
            return true;
        };
        let Some(mut parent) = tree.parent(expression) else {
            return true;
        };

        // `a.b().c()` is judged on the context of the whole chain
        while tree.kind(parent) == NodeKind::QualifiedReference
            && tree.selector(parent) == Some(expression)
        {
            expression = parent;
            parent = match tree.parent(parent) {
                Some(next) => next,
                None => return true,
            };
        }

        match tree.kind(parent) {
            NodeKind::Block => {
                let owner = tree.parent(parent);
                if let Some(owner) = owner {
                    if tree.kind(owner) == NodeKind::Lambda {
                        return false;
                    }
                }

                let children = tree.children(parent);
                let Some(position) = children.iter().position(|&child| child == expression) else {
                    return false;
                };
                if position + 1 != children.len() {
                    return true;
                }

                match owner {
                    None => return true,
                    Some(owner) => match tree.kind(owner) {
                        NodeKind::Callable { .. } | NodeKind::ClassInitializer => return true,
                        _ => start = owner,
                    },
                }
            }
            NodeKind::Callable { constructor: true } => return true,
            _ => return false,
        }
    }
}
