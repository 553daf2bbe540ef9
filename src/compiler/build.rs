use std::collections::HashMap;

use log::{
    debug,
    trace,
};

use crate::{
    common::span::{
        Span,
        Spanned,
    },
    compiler::{
        config::Config,
        syntax::{
            Note,
            Stage,
            Syntax,
        },
    },
    construct::{
        line::LogicalLine,
        node::{
            Arity,
            Delim,
            Keyword,
            Node,
            Nodes,
            Operator,
            STRUCTURAL,
        },
    },
};

/// Builds one node sequence per logical line.
/// Besides classifying lexical units, the builder checks
/// everything that can be checked without generating:
/// bracket matching, operator operands, positional
/// keywords, and consistent indentation.
pub struct Builder {
    /// The character the file indents with, and where it
    /// was first seen.
    indent_char: Option<(char, Span)>,
    /// Head keyword of the last statement at each open
    /// indentation level, innermost last.
    chain: Vec<(usize, Option<Keyword>)>,
    /// Emitted spelling of each identifier seen so far, with
    /// how it was written and where. `None` when names are
    /// prefixed instead, which can't collide.
    names: Option<HashMap<String, (String, Span)>>,
}

impl Builder {
    pub fn build(
        lines: &[LogicalLine],
        config: &Config,
    ) -> Result<Vec<Spanned<Nodes>>, Syntax> {
        trace!("building with tab width {}", config.tab_width);
        let mut builder = Builder {
            indent_char: None,
            chain: vec![],
            names: if config.prelude.is_on() { None } else { Some(HashMap::new()) },
        };

        let mut sequences = Vec::with_capacity(lines.len());
        for line in lines {
            let nodes = builder.line(line)?;
            sequences.push(Spanned::new(nodes, line.span.clone()));
        }

        debug!(
            "built {} node sequences ({} nodes)",
            sequences.len(),
            sequences.iter().map(|s| s.item.len()).sum::<usize>()
        );
        Ok(sequences)
    }

    fn line(&mut self, line: &LogicalLine) -> Result<Nodes, Syntax> {
        if line.is_blank() {
            return Ok(vec![Node::EndOfLine]);
        }

        self.check_indentation(line)?;

        let mut lexer = Lexer {
            line,
            index: line.leading().len(),
            nodes: vec![],
            cols: vec![],
            opening: vec![],
        };
        lexer.lex()?;
        lexer.check_operands()?;
        self.check_keyword(line, &lexer)?;
        self.check_names(line, &lexer)?;

        let mut nodes = Vec::with_capacity(lexer.nodes.len() + 2);
        if line.indent > 0 {
            nodes.push(Node::Space(line.indent));
        }
        nodes.extend(lexer.nodes);
        nodes.push(Node::EndOfLine);
        Ok(nodes)
    }

    fn check_indentation(&mut self, line: &LogicalLine) -> Result<(), Syntax> {
        let leading = line.leading();
        let first = match leading.chars().next() {
            Some(c) => c,
            None => return Ok(()),
        };
        let span = line.locate(0, leading.len());

        if leading.chars().any(|c| c != first) {
            return Err(Syntax::error(
                Stage::Build,
                "Indentation mixes tabs and spaces",
                &span,
            ));
        }

        match &self.indent_char {
            None => {
                self.indent_char = Some((first, span));
                Ok(())
            },
            Some((c, _)) if *c == first => Ok(()),
            Some((_, earlier)) => Err(Syntax::error_with_note(
                Stage::Build,
                "Indentation mixes tabs and spaces",
                Note::new_with_hint(
                    &format!("indented with {} here", name_indent(first)),
                    &span,
                ),
            )
            .add_note(Note::new_with_hint(
                "but indented differently here first",
                earlier,
            ))),
        }
    }

    /// `elif` and `else` must continue a statement at the
    /// same indentation that can take them.
    fn check_keyword(
        &mut self,
        line: &LogicalLine,
        lexer: &Lexer,
    ) -> Result<(), Syntax> {
        let head = lexer.nodes.first().and_then(Node::keyword);

        while matches!(self.chain.last(), Some((indent, _)) if *indent > line.indent) {
            self.chain.pop();
        }
        let previous = match self.chain.last() {
            Some((indent, keyword)) if *indent == line.indent => {
                let previous = *keyword;
                self.chain.pop();
                previous
            },
            _ => None,
        };
        self.chain.push((line.indent, head));

        let (keyword, allowed): (Keyword, &[Keyword]) = match head {
            Some(Keyword::Elif) => (Keyword::Elif, &[Keyword::If, Keyword::Elif][..]),
            Some(Keyword::Else) => (
                Keyword::Else,
                &[Keyword::If, Keyword::Elif, Keyword::For, Keyword::While][..],
            ),
            _ => return Ok(()),
        };

        if previous.map_or(false, |p| allowed.contains(&p)) {
            return Ok(());
        }

        let (col, len) = lexer.cols[0];
        Err(Syntax::error_with_note(
            Stage::Build,
            &format!("Unexpected {} without a preceding `if`", keyword),
            Note::new_with_hint(
                "this must continue a statement at the same indentation",
                &line.locate(col, len),
            ),
        ))
    }
}

impl Builder {
    /// A renamed reserved word (`class` to `class_`) must
    /// not land on a name the program spells that way
    /// itself.
    fn check_names(&mut self, line: &LogicalLine, lexer: &Lexer) -> Result<(), Syntax> {
        let names = match &mut self.names {
            Some(names) => names,
            None => return Ok(()),
        };

        for (node, (col, len)) in lexer.nodes.iter().zip(&lexer.cols) {
            let (raw, target) = match node {
                Node::Operand { raw, target } => (raw, target),
                _ => continue,
            };
            let span = line.locate(*col, *len);

            match names.get(target) {
                Some((seen, _)) if seen == raw => (),
                Some((seen, earlier)) => {
                    return Err(Syntax::error_with_note(
                        Stage::Build,
                        &format!("`{}` and `{}` would both become `{}`", raw, seen, target),
                        Note::new_with_hint(&format!("`{}` is used here", raw), &span),
                    )
                    .add_note(Note::new_with_hint(
                        &format!("`{}` is used here first", seen),
                        earlier,
                    )));
                },
                None => {
                    names.insert(target.clone(), (raw.clone(), span));
                },
            }
        }

        Ok(())
    }
}

fn name_indent(c: char) -> &'static str {
    if c == '\t' {
        "tabs"
    } else {
        "spaces"
    }
}

/// Splits the contents of a single logical line into
/// nodes, left to right with no backtracking.
struct Lexer<'a> {
    line: &'a LogicalLine,
    index: usize,
    nodes: Nodes,
    /// Byte column and length of each node in `nodes`.
    cols: Vec<(usize, usize)>,
    /// Stack of opened delimiters and their columns.
    opening: Vec<(Delim, usize)>,
}

impl<'a> Lexer<'a> {
    fn remaining(&self) -> &'a str { &self.line.text[self.index..] }

    fn error(&self, reason: &str, col: usize, len: usize) -> Syntax {
        Syntax::error(Stage::Build, reason, &self.line.locate(col, len))
    }

    fn push(&mut self, node: Node, len: usize) {
        self.nodes.push(node);
        self.cols.push((self.index, len));
        self.index += len;
    }

    fn previous_ends_value(&self) -> bool {
        self.nodes.last().map_or(false, Node::ends_value)
    }

    fn lex(&mut self) -> Result<(), Syntax> {
        loop {
            let skipped = self.remaining().len()
                - self.remaining().trim_start_matches([' ', '\t']).len();
            self.index += skipped;

            let rest = self.remaining();
            let mut chars = rest.chars();
            let c = match chars.next() {
                Some(c) => c,
                None => break,
            };
            let next = chars.next();

            match c {
                '"' | '\'' => self.string(c)?,
                c if c.is_ascii_digit() => self.number()?,
                '+' | '-'
                    if next.map_or(false, |n| n.is_ascii_digit())
                        && !self.previous_ends_value() =>
                {
                    self.number()?
                },
                '-' if next == Some('>') => {
                    self.push(Node::Keyword(Keyword::Return), 2)
                },
                c if c.is_alphabetic() || c == '_' => self.word(),
                _ => {
                    if let Some(op) = Operator::longest_prefix(rest) {
                        self.operator(op)
                    } else if STRUCTURAL.contains(c) {
                        self.structural(c)?
                    } else {
                        return Err(self.error(
                            &format!("Unexpected character `{}`", c),
                            self.index,
                            c.len_utf8(),
                        ));
                    }
                },
            }
        }

        if let Some((delim, col)) = self.opening.last() {
            return Err(self.error(&format!("Unclosed opening {}", delim), *col, 1));
        }

        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<(), Syntax> {
        let rest = self.remaining();
        let mut escape = false;

        for (index, c) in rest.char_indices().skip(1) {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == quote {
                let len = index + c.len_utf8();
                self.push(Node::string(&rest[..len]), len);
                return Ok(());
            }
        }

        Err(self.error("Unterminated string literal", self.index, rest.len()))
    }

    /// Digits with an optional sign and at most one decimal
    /// point. A `.` followed by another `.` is a range, not
    /// a decimal point.
    fn number(&mut self) -> Result<(), Syntax> {
        let rest = self.remaining();
        let bytes = rest.as_bytes();
        let digits = |from: usize| {
            from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count()
        };

        let sign = usize::from(bytes[0] == b'+' || bytes[0] == b'-');
        let mut len = digits(sign);
        if bytes.get(len) == Some(&b'.')
            && bytes.get(len + 1).map_or(false, u8::is_ascii_digit)
        {
            len = digits(len + 1);
        }

        let trailing = rest[len..].chars().next();
        let invalid = match trailing {
            Some(c) if c.is_alphanumeric() || c == '_' => true,
            Some('.') => !rest[len..].starts_with(".."),
            _ => false,
        };
        if invalid {
            let run = rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
                .unwrap_or(rest.len());
            return Err(self.error(
                &format!("Invalid numeric literal `{}`", &rest[..run]),
                self.index,
                run,
            ));
        }

        match Node::number(&rest[..len]) {
            Some(node) => {
                self.push(node, len);
                Ok(())
            },
            None => Err(self.error(
                &format!("Invalid numeric literal `{}`", &rest[..len]),
                self.index,
                len,
            )),
        }
    }

    fn word(&mut self) {
        let rest = self.remaining();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let word = &rest[..len];

        let node = match Keyword::try_new(word) {
            Some(keyword) => Node::Keyword(keyword),
            None => Node::operand(word),
        };
        self.push(node, len);
    }

    fn operator(&mut self, op: &str) {
        let arity = match op {
            "!" => Arity::Unary,
            "+" | "-" if !self.previous_ends_value() => Arity::Unary,
            _ => Arity::Binary,
        };
        self.push(Node::Operator(Operator::new(op, arity)), op.len());
    }

    fn structural(&mut self, c: char) -> Result<(), Syntax> {
        let op = Operator::new(&c.to_string(), Arity::Structural);

        if let Some(delim) = op.opening() {
            self.opening.push((delim, self.index));
        } else if let Some(delim) = op.closing() {
            let (opened, col) = self.opening.pop().ok_or_else(|| {
                self.error(&format!("Unexpected closing {}", delim), self.index, 1)
            })?;

            if opened != delim {
                let line = self.line;
                return Err(Syntax::error(
                    Stage::Build,
                    &format!(
                        "Mismatched opening {} and closing {}",
                        opened, delim
                    ),
                    &line.locate(self.index, 1),
                )
                .add_note(Note::new_with_hint(
                    "opened here",
                    &line.locate(col, 1),
                )));
            }
        }

        self.push(Node::Operator(op), 1);
        Ok(())
    }

    /// Every operator needs its operands: a value to the
    /// left of a binary operator, and a value to the right
    /// of any operator.
    fn check_operands(&self) -> Result<(), Syntax> {
        for (index, node) in self.nodes.iter().enumerate() {
            let op = match node {
                Node::Operator(op) if op.arity != Arity::Structural => op,
                _ => continue,
            };
            let (col, len) = self.cols[index];

            let left = index.checked_sub(1).map(|i| &self.nodes[i]);
            if op.arity == Arity::Binary && !left.map_or(false, Node::ends_value) {
                return Err(self.error(
                    &format!("Operator `{}` is missing its left operand", op.raw),
                    col,
                    len,
                ));
            }

            let right = self.nodes.get(index + 1);
            if !right.map_or(false, Node::starts_value) {
                return Err(self.error(
                    &format!("Operator `{}` is missing its right operand", op.raw),
                    col,
                    len,
                ));
            }
        }

        Ok(())
    }
}
