use std::rc::Rc;

use log::{
    debug,
    trace,
};

use crate::{
    common::{
        source::Source,
        span::Span,
    },
    compiler::{
        config::Config,
        syntax::{
            Note,
            Stage,
            Syntax,
        },
    },
    construct::line::{
        indent_width,
        LogicalLine,
    },
};

/// A physical line starting with one of these is dropped.
const LINE_COMMENTS: &[&str] = &["#", "//", ">>"];
const BLOCK_OPEN: &str = "/*";
const BLOCK_CLOSE: &str = "*/";

/// The opening quote of a string literal still being read.
#[derive(Debug, Clone, Copy)]
struct Open {
    quote: char,
    /// Byte offset of the quote in the source.
    offset: usize,
}

/// A logical line still being accumulated.
#[derive(Debug)]
struct Pending {
    text: String,
    first: usize,
    offset: usize,
}

/// What the normalizer is inside of at the start of a
/// physical line. Threaded from one line to the next.
#[derive(Debug)]
enum Mode {
    Code,
    /// Inside a string literal that crossed a newline.
    String { open: Open, line: Pending },
    /// Inside a block comment opened at `offset`.
    Comment { offset: usize },
}

/// Turns raw source text into logical lines.
/// Comments are dropped, multi-line strings are folded
/// onto the line they started on.
pub struct Normalizer {
    source: Rc<Source>,
    tab_width: usize,
    lines: Vec<LogicalLine>,
}

impl Normalizer {
    pub fn normalize(
        source: Rc<Source>,
        config: &Config,
    ) -> Result<Vec<LogicalLine>, Syntax> {
        let physical = physical_lines(&source.contents);
        let count = physical.len();

        let mut normalizer = Normalizer {
            source: Rc::clone(&source),
            tab_width: config.tab_width,
            lines: vec![],
        };

        let mut mode = Mode::Code;
        for (number, offset, text) in physical {
            mode = normalizer.step(mode, number, offset, text)?;
        }

        match mode {
            Mode::Code => (),
            Mode::String { open, .. } => {
                return Err(Syntax::error_with_note(
                    Stage::Normalize,
                    "Unterminated string literal",
                    Note::new_with_hint(
                        "the literal opened here is never closed",
                        &Span::new(&normalizer.source, open.offset, 1),
                    ),
                ));
            },
            Mode::Comment { offset } => {
                return Err(Syntax::error_with_note(
                    Stage::Normalize,
                    "Unclosed block comment",
                    Note::new_with_hint(
                        &format!(
                            "close it with `{}` at the start of a later line",
                            BLOCK_CLOSE
                        ),
                        &Span::new(&normalizer.source, offset, BLOCK_OPEN.len()),
                    ),
                ));
            },
        }

        debug!(
            "normalized {} physical lines into {} logical lines",
            count,
            normalizer.lines.len()
        );
        Ok(normalizer.lines)
    }

    /// Processes one physical line in the given mode,
    /// returning the mode the next line starts in.
    fn step(
        &mut self,
        mode: Mode,
        number: usize,
        offset: usize,
        text: &str,
    ) -> Result<Mode, Syntax> {
        match mode {
            Mode::Comment { .. } if text.starts_with(BLOCK_CLOSE) => {
                trace!("block comment closed on line {}", number);
                Ok(Mode::Code)
            },
            Mode::Comment { .. } => Ok(mode),

            Mode::String { open, mut line } => {
                line.text.push_str("\\n");
                Ok(self.scan(text, offset, Some(open), line, number))
            },

            Mode::Code if text.starts_with(BLOCK_OPEN) => {
                if text[BLOCK_OPEN.len()..].trim_end().ends_with(BLOCK_CLOSE) {
                    trace!("one-line block comment on line {}", number);
                    return Ok(Mode::Code);
                }
                trace!("block comment opened on line {}", number);
                Ok(Mode::Comment { offset })
            },
            Mode::Code if text.starts_with(BLOCK_CLOSE) => Err(Syntax::error(
                Stage::Normalize,
                "Block comment closed without being opened",
                &Span::new(&self.source, offset, BLOCK_CLOSE.len()),
            )),
            Mode::Code
                if LINE_COMMENTS.iter().any(|start| text.starts_with(start)) =>
            {
                trace!("dropped comment on line {}", number);
                Ok(Mode::Code)
            },
            Mode::Code => {
                let line = Pending {
                    text: String::new(),
                    first: number,
                    offset,
                };
                Ok(self.scan(text, offset, None, line, number))
            },
        }
    }

    /// Appends a physical line to `line`, tracking string
    /// literals. Finishes the logical line unless a string
    /// is still open at the end of it.
    fn scan(
        &mut self,
        text: &str,
        offset: usize,
        mut open: Option<Open>,
        mut line: Pending,
        number: usize,
    ) -> Mode {
        let mut escape = false;

        for (index, c) in text.char_indices() {
            line.text.push(c);
            match open {
                Some(_) if escape => escape = false,
                Some(_) if c == '\\' => escape = true,
                Some(Open { quote, .. }) if c == quote => open = None,
                Some(_) => (),
                None if c == '"' || c == '\'' => {
                    open = Some(Open {
                        quote: c,
                        offset: offset + index,
                    })
                },
                None => (),
            }
        }

        match open {
            Some(open) => Mode::String { open, line },
            None => {
                self.finish(line, number, offset + text.len());
                Mode::Code
            },
        }
    }

    fn finish(&mut self, line: Pending, last: usize, end: usize) {
        let leading = line.text.len() - line.text.trim_start_matches([' ', '\t']).len();
        let indent = indent_width(&line.text[..leading], self.tab_width);

        self.lines.push(LogicalLine {
            lines: line.first..=last,
            indent,
            span: Span::new(&self.source, line.offset, end - line.offset),
            text: line.text,
        });
    }
}

/// Splits source text into `(number, offset, text)`
/// triples: one-based line number, byte offset of the
/// line start, and the line without its line ending.
fn physical_lines(contents: &str) -> Vec<(usize, usize, &str)> {
    let mut lines = vec![];
    let mut offset = 0;

    for (index, segment) in contents.split('\n').enumerate() {
        let start = offset;
        offset += segment.len() + 1;
        // the empty remainder after a final newline is not
        // a line
        if start == contents.len() {
            break;
        }
        lines.push((index + 1, start, segment.trim_end_matches('\r')));
    }

    lines
}
