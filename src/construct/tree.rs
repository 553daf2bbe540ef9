use crate::construct::node::{
    Delim,
    Node,
};

/// A line's nodes grouped by their delimiters.
/// Leaves borrow from the builder's node sequence;
/// delimiter nodes themselves are folded into `Group`.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree<'a> {
    Leaf(&'a Node),
    Group(Delim, Vec<Tree<'a>>),
}

impl<'a> Tree<'a> {
    pub fn node(&self) -> Option<&'a Node> {
        match self {
            Tree::Leaf(node) => Some(node),
            Tree::Group(..) => None,
        }
    }

    pub fn is_structural(&self, raw: &str) -> bool {
        self.node().map_or(false, |node| node.is_structural(raw))
    }

    /// Whether a `[` right after this tree indexes into it.
    pub fn ends_value(&self) -> bool {
        match self {
            Tree::Leaf(node) => node.ends_value(),
            Tree::Group(delim, _) => *delim != Delim::Curly,
        }
    }
}
