//! Depth-first syntax tree traversal
//!
//! Listeners receive one callback per node and never drive the traversal
//! themselves.

use crate::ast::SyntaxNode;

/// Callbacks invoked while walking a syntax tree
pub trait Listener {
    /// Called before the node's children are visited
    fn enter(&mut self, node: &SyntaxNode);

    /// Called after the node's children are visited
    fn exit(&mut self, _node: &SyntaxNode) {}
}

/// Walk `tree` in document order, calling `listener` for every node
pub fn walk<L: Listener + ?Sized>(listener: &mut L, tree: &SyntaxNode) {
    listener.enter(tree);
    for child in &tree.children {
        walk(listener, child);
    }
    listener.exit(tree);
}
