use std::fmt;

use crate::common::span::Span;

/// The pipeline stage a `Syntax` error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Build,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Normalize => "normalize",
            Stage::Build => "build",
            Stage::Generate => "generate",
        };

        write!(f, "{}", name)
    }
}

/// Represents a note attached to a Syntax error,
/// i.e. a location in source code with an optional
/// specific hint or tip corresponding to this location.
#[derive(Debug, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note { Note { span, hint: None } }

    pub fn new_with_hint(hint: &str, span: &Span) -> Note {
        Note {
            span: span.clone(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Represents a static error found while transpiling.
/// Every stage fails fast, so a run produces at most one
/// of these. Usually, one `Note` per error is enough.
#[derive(Debug, PartialEq, Eq)]
pub struct Syntax {
    pub stage: Stage,
    pub reason: String,
    pub notes: Vec<Note>,
}

impl Syntax {
    /// Creates a new static error with a single note that
    /// does not have a hint.
    pub fn error(stage: Stage, reason: &str, span: &Span) -> Syntax {
        Syntax::error_with_note(stage, reason, Note::new(span.clone()))
    }

    /// Creates a new static error with a single note that
    /// may or may not have a hint.
    pub fn error_with_note(stage: Stage, reason: &str, note: Note) -> Syntax {
        Syntax {
            stage,
            reason: reason.to_string(),
            notes: vec![note],
        }
    }

    /// Creates a syntax error without a note. This error
    /// carries no location information, so only use it if
    /// you plan to add notes with [`Syntax::add_note`]
    /// later, or the failure has no location.
    pub fn error_no_note(stage: Stage, reason: &str) -> Syntax {
        Syntax {
            stage,
            reason: reason.to_string(),
            notes: vec![],
        }
    }

    /// Extend a syntax error by adding another note to the
    /// error.
    pub fn add_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// The one-based source line of the first note, when
    /// known.
    pub fn line(&self) -> Option<usize> {
        self.notes.first().map(|note| note.span.line())
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in self.notes.iter() {
            let formatted = note.span.format();

            match (&note.hint, formatted.carets()) {
                (Some(hint), Some(carets)) => {
                    let gutter = " ".repeat(formatted.gutter_padding());
                    writeln!(
                        f,
                        "In {}:{}:{}",
                        formatted.path,
                        formatted.start + 1,
                        formatted.start_col + 1
                    )?;
                    writeln!(f, "{} |", gutter)?;
                    writeln!(
                        f,
                        "{:>width$} | {}",
                        formatted.start + 1,
                        formatted.lines.first().map(String::as_str).unwrap_or(""),
                        width = formatted.gutter_padding(),
                    )?;
                    writeln!(
                        f,
                        "{} | {}{} note: {}",
                        gutter,
                        " ".repeat(formatted.start_col),
                        "^".repeat(carets),
                        hint,
                    )?;
                },
                (Some(hint), None) => {
                    write!(f, "{}", formatted)?;
                    writeln!(
                        f,
                        "{} |- note: {}",
                        " ".repeat(formatted.gutter_padding()),
                        hint
                    )?;
                },
                (None, _) => write!(f, "{}", formatted)?,
            }
        }
        write!(f, "Syntax Error ({}): {}", self.stage, self.reason)
    }
}

impl std::error::Error for Syntax {}
