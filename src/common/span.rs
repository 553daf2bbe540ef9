use std::{
    fmt::{
        self,
        Debug,
        Display,
        Formatter,
    },
    rc::Rc,
};

use crate::common::source::Source;

/// A `Span` refers to a section of a source,
/// much like a `&str`, but with a reference to a `Source`
/// rather than a `String`. A `Span` is meant to be paired
/// with other datastructures, to be used during error
/// reporting.
#[derive(Clone, Eq, PartialEq)]
pub struct Span {
    source: Rc<Source>,
    offset: usize,
    length: usize,
}

impl Span {
    /// Create a new `Span` from an offset with a length.
    /// All `Span`s have access to the `Source` from whence
    /// they came, so they can't be misinterpreted or
    /// miscombined.
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span {
            source: Rc::clone(source),
            offset,
            length,
        }
    }

    /// A `Span` that points at a specific point in the
    /// source. Has a length of `0`.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span::new(source, offset, 0)
    }

    /// A `Span` covering an entire source.
    pub fn whole(source: &Rc<Source>) -> Span {
        Span::new(source, 0, source.contents.len())
    }

    pub fn source(&self) -> &Rc<Source> { &self.source }

    pub fn offset(&self) -> usize { self.offset }

    /// Return the index of the end of the `Span`.
    pub fn end(&self) -> usize { self.offset + self.length }

    pub fn len(&self) -> usize { self.length }

    pub fn is_empty(&self) -> bool { self.length == 0 }

    /// Creates a new `Span` which spans the space of the
    /// previous two.
    /// ```plain
    /// hello this is cool
    /// ^^^^^              | Span a
    ///            ^^      | Span b
    /// ^^^^^^^^^^^^^      | combined
    /// ```
    pub fn combine(a: &Span, b: &Span) -> Span {
        debug_assert!(
            a.source == b.source,
            "Can't combine two Spans with separate sources"
        );

        let offset = a.offset.min(b.offset);
        let end = a.end().max(b.end());
        Span::new(&a.source, offset, end - offset)
    }

    /// Combines a set of `Span`s (think fold-left over
    /// `Span::combine`). Returns `None` if there are no
    /// spans to join.
    pub fn join(spans: &[Span]) -> Option<Span> {
        let (first, rest) = spans.split_first()?;
        Some(rest.iter().fold(first.clone(), |a, b| Span::combine(&a, b)))
    }

    /// Returns the contents of a `Span`.
    /// Spans along an invalid char boundary yield an
    /// empty string.
    pub fn contents(&self) -> String {
        self.source
            .contents
            .get(self.offset..self.end())
            .unwrap_or("")
            .to_string()
    }

    /// Zero-based line of a byte index into the source.
    fn line_of(&self, index: usize) -> usize {
        let index = index.min(self.source.contents.len());
        self.source.contents.as_bytes()[..index]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
    }

    /// Zero-based column (in chars) of a byte index.
    fn col_of(&self, index: usize) -> usize {
        let prefix = self
            .source
            .contents
            .get(..index)
            .unwrap_or(&self.source.contents);
        match prefix.rfind('\n') {
            Some(newline) => prefix[newline + 1..].chars().count(),
            None => prefix.chars().count(),
        }
    }

    /// The zero-based line of the last character covered
    /// by this span. A span ending just past a newline
    /// does not reach onto the following line.
    fn last_line(&self) -> usize {
        if self.length == 0 {
            self.line_of(self.offset)
        } else {
            self.line_of(self.end() - 1)
        }
    }

    /// The one-based line number this span starts on.
    pub fn line(&self) -> usize { self.line_of(self.offset) + 1 }

    /// The source lines this span touches.
    pub fn lines(&self) -> Vec<String> {
        self.source
            .contents
            .split('\n')
            .skip(self.line_of(self.offset))
            .take(self.last_line() - self.line_of(self.offset) + 1)
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    }

    pub fn path(&self) -> String {
        self.source.path.to_string_lossy().to_string()
    }

    pub fn format(&self) -> FormattedSpan {
        let lines = self.lines();
        let start_col = self.col_of(self.offset);
        let end_col = if lines.len() == 1 {
            self.col_of(self.end())
        } else {
            start_col
        };

        FormattedSpan {
            path: self.path(),
            start: self.line_of(self.offset),
            lines,
            start_col,
            end_col,
        }
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("contents", &self.contents())
            .field("start", &self.offset)
            .field("end", &self.end())
            .finish()
    }
}

impl Display for Span {
    /// Given a `Span`, `fmt` will print out where the
    /// `Span` occurs in its source.
    /// Single-line `Span`s:
    /// ```plain
    /// 12 | x = [1, 2
    ///    |     ^
    /// ```
    /// Multi-line `Span`s:
    /// ```plain
    /// 12 > s = "one
    /// 13 > two"
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Represents a formatted span, ready to be displayed.
/// Contains information about where the span is from,
/// and where in the text it starts and ends
/// relative to the lines in the source.
pub struct FormattedSpan {
    pub path: String,
    /// Zero-based first line.
    pub start: usize,
    pub lines: Vec<String>,
    pub start_col: usize,
    pub end_col: usize,
}

impl FormattedSpan {
    pub fn is_multiline(&self) -> bool { self.lines.len() > 1 }

    pub fn gutter_padding(&self) -> usize {
        (self.start + self.lines.len()).to_string().len()
    }

    /// If a single line span, returns the number of carets
    /// between cols.
    pub fn carets(&self) -> Option<usize> {
        if self.is_multiline() {
            None
        } else {
            Some(self.end_col.saturating_sub(self.start_col).max(1))
        }
    }
}

impl Display for FormattedSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let gutter = " ".repeat(self.gutter_padding());
        writeln!(
            f,
            "In {}:{}:{}",
            self.path,
            self.start + 1,
            self.start_col + 1
        )?;
        writeln!(f, "{} |", gutter)?;

        match self.carets() {
            Some(carets) => {
                let line = self.lines.first().map(String::as_str).unwrap_or("");
                writeln!(
                    f,
                    "{:>width$} | {}",
                    self.start + 1,
                    line,
                    width = self.gutter_padding()
                )?;
                writeln!(
                    f,
                    "{} | {}{}",
                    gutter,
                    " ".repeat(self.start_col),
                    "^".repeat(carets)
                )?;
            },
            None => {
                for (index, line) in self.lines.iter().enumerate() {
                    writeln!(
                        f,
                        "{:>width$} > {}",
                        self.start + index + 1,
                        line,
                        width = self.gutter_padding()
                    )?;
                }
                writeln!(f, "{} |", gutter)?;
            },
        }

        Ok(())
    }
}

/// A wrapper for spanning types.
/// A node sequence, for instance, is spanned with the
/// physical lines it was built from (a `Spanned<Nodes>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Takes a generic item, and wraps in in a `Span` to
    /// make it `Spanned`.
    pub fn new(item: T, span: Span) -> Spanned<T> { Spanned { item, span } }

    /// Joins the spans of a slice of spanned items into a
    /// single span.
    pub fn build(spanneds: &[Spanned<T>]) -> Option<Span> {
        let spans = spanneds
            .iter()
            .map(|s| s.span.clone())
            .collect::<Vec<Span>>();
        Span::join(&spans)
    }

    /// Applies a function to a `Spanned`'s item.
    pub fn map<B>(self, f: impl FnOnce(T) -> B) -> Spanned<B> {
        Spanned::new(f(self.item), self.span)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combination() {
        let source = Source::source("heck, that's awesome");
        let a = Span::new(&source, 0, 5);
        let b = Span::new(&source, 11, 2);

        assert_eq!(Span::combine(&a, &b), Span::new(&source, 0, 13));
    }

    #[test]
    fn span_and_contents() {
        let source = Source::source("hello, this is some text!");
        let spans = vec![
            Span::new(&source, 0, 8),
            Span::new(&source, 7, 5),
            Span::new(&source, 12, 4),
        ];
        let result = Span::new(&source, 0, 16);

        assert_eq!(Span::join(&spans).unwrap().contents(), result.contents());
        assert!(Span::join(&[]).is_none());
    }

    #[test]
    fn line_numbers() {
        let source = Source::source("a = 1\nb = 2\nc = 3");
        assert_eq!(Span::point(&source, 0).line(), 1);
        assert_eq!(Span::point(&source, 6).line(), 2);
        assert_eq!(Span::new(&source, 12, 5).line(), 3);
        // a span ending on a newline stays on its own line
        assert_eq!(Span::new(&source, 0, 6).lines(), vec!["a = 1"]);
    }

    #[test]
    fn single_line_format() {
        let source = Source::source("x = 1\ny = [1, 2");
        let span = Span::new(&source, 10, 1);
        let target = "In ./source:2:5
  |
2 | y = [1, 2
  |     ^
";
        assert_eq!(format!("{}", span), target);
    }

    #[test]
    fn multi_line_format() {
        let source = Source::source("s = \"one\ntwo\"");
        let span = Span::whole(&source);
        let formatted = span.format();
        assert!(formatted.is_multiline());
        assert_eq!(formatted.carets(), None);
        assert!(format!("{}", span).contains("2 > two\""));
    }

    #[test]
    fn empty() {
        let source = Source::source("");
        let span = Span::point(&source, 0);
        assert_eq!(span.line(), 1);
        format!("{}", span);
    }
}
