use std::mem;

use crate::{
    common::span::Span,
    compiler::syntax::{
        Stage,
        Syntax,
    },
    construct::{
        node::{
            Arity,
            Delim,
            Node,
        },
        tree::Tree,
    },
};

/// Groups one line's flat node sequence into trees.
/// Indentation and line endings carry no structure here
/// and are skipped.
pub struct Reader<'a> {
    span: &'a Span,
    current: Vec<Tree<'a>>,
    // stack of nested groupings, with the trees read
    // before each one was opened
    opening: Vec<(Delim, Vec<Tree<'a>>)>,
}

impl<'a> Reader<'a> {
    pub fn read(nodes: &'a [Node], span: &'a Span) -> Result<Vec<Tree<'a>>, Syntax> {
        let mut reader = Reader {
            span,
            current: vec![],
            opening: vec![],
        };

        for node in nodes {
            match node {
                Node::Space(_) | Node::EndOfLine => (),
                Node::Operator(op) if op.arity == Arity::Structural => {
                    if let Some(delim) = op.opening() {
                        reader.enter_group(delim);
                    } else if let Some(delim) = op.closing() {
                        reader.exit_group(delim)?;
                    } else {
                        reader.current.push(Tree::Leaf(node));
                    }
                },
                other => reader.current.push(Tree::Leaf(other)),
            }
        }

        if let Some((still_opened, _)) = reader.opening.last() {
            return Err(reader.error(&format!("Unclosed opening {}", still_opened)));
        }

        Ok(reader.current)
    }

    fn error(&self, reason: &str) -> Syntax { Syntax::error(Stage::Generate, reason, self.span) }

    fn enter_group(&mut self, delim: Delim) {
        let outer = mem::take(&mut self.current);
        self.opening.push((delim, outer));
    }

    fn exit_group(&mut self, closing: Delim) -> Result<(), Syntax> {
        let (opening, outer) = self
            .opening
            .pop()
            .ok_or_else(|| self.error(&format!("Unexpected closing {}", closing)))?;

        if opening != closing {
            return Err(self.error(&format!(
                "Mismatched opening {} and closing {}",
                opening, closing
            )));
        }

        let inner = mem::replace(&mut self.current, outer);
        self.current.push(Tree::Group(opening, inner));
        Ok(())
    }
}
