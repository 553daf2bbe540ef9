use block::compiler::Syntax;
use colored::*;

/// What a line of CLI output reports, which picks the
/// colour of its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Success,
    Warn,
    Fatal,
}

impl Status {
    fn tag(&self) -> ColoredString {
        match self {
            Status::Info => "Info".blue(),
            Status::Success => "Success".green(),
            Status::Warn => "Warning".yellow(),
            Status::Fatal => "Fatal".red(),
        }
        .bold()
    }

    /// Writes a tagged message to stderr. Continuation
    /// lines are aligned under the first one.
    pub fn log(&self, message: &str) {
        let mut lines = message.lines();
        eprintln!("{:>12} {}", self.tag(), lines.next().unwrap_or(""));
        for line in lines {
            eprintln!("{:>12} {}", "", line);
        }
    }

    /// Reports a failed transpile: a one-line summary
    /// naming the stage and line, then the excerpt.
    pub fn syntax(error: &Syntax) {
        Status::Fatal.log(&summary(error));
        eprintln!("\n{}", error);
    }
}

fn summary(error: &Syntax) -> String {
    match error.line() {
        Some(line) => format!("syntax error in the {} stage at line {}", error.stage, line),
        None => format!("syntax error in the {} stage", error.stage),
    }
}
