use std::{
    borrow::Cow,
    fmt::Display,
};

/// Two-character operators come first so that lookups
/// match longest-first.
const OPERATORS: &[(&str, &str)] = &[
    ("..", "range"),
    ("==", "=="),
    ("!=", "!="),
    (">=", ">="),
    ("<=", "<="),
    ("//", "//"),
    ("+", "+"),
    ("-", "-"),
    ("*", "*"),
    ("/", "/"),
    ("%", "%"),
    ("^", "**"),
    ("=", "="),
    (">", ">"),
    ("<", "<"),
    ("!", "not"),
    ("&", "and"),
    ("|", "or"),
];

/// Operators rewritten structurally rather than
/// substituted symbol-for-symbol.
const SPECIAL: &[&str] = &[".."];

pub const STRUCTURAL: &str = "[](){},:";

/// Identifiers with a fixed spelling in the host
/// language.
const CONSTANTS: &[(&str, &str)] =
    &[("true", "True"), ("false", "False"), ("none", "None")];

/// Host-language reserved words that Block leaves free
/// for use as plain names. These get a trailing `_`; the
/// builder rejects a program that also spells the renamed
/// form itself.
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "except", "finally", "from", "global",
    "import", "is", "lambda", "nonlocal", "not", "or", "pass", "raise",
    "return", "try", "with", "yield",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Delim {
    Paren,
    Curly,
    Square,
}

impl Delim {
    pub fn open(&self) -> char {
        match self {
            Delim::Paren => '(',
            Delim::Curly => '{',
            Delim::Square => '[',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Delim::Paren => ')',
            Delim::Curly => '}',
            Delim::Square => ']',
        }
    }
}

impl Display for Delim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Delim::Paren => "parenthesis",
            Delim::Curly => "curly brackets",
            Delim::Square => "square brackets",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
    /// Delimiters and separators, which shape the
    /// surrounding expression instead of taking operands.
    Structural,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub raw: String,
    pub arity: Arity,
}

impl Operator {
    pub fn new(raw: &str, arity: Arity) -> Operator {
        Operator {
            raw: raw.to_string(),
            arity,
        }
    }

    /// Finds the longest operator spelling at the start of
    /// `remaining`, if any.
    pub fn longest_prefix(remaining: &str) -> Option<&'static str> {
        OPERATORS
            .iter()
            .map(|(raw, _)| *raw)
            .find(|raw| remaining.starts_with(raw))
    }

    /// The host-language spelling, `None` for symbols the
    /// generator has no mapping for.
    pub fn target(&self) -> Option<&'static str> {
        if self.arity == Arity::Structural {
            return STRUCTURAL
                .find(self.raw.as_str())
                .map(|index| &STRUCTURAL[index..index + 1])
                .filter(|_| self.raw.len() == 1);
        }

        OPERATORS
            .iter()
            .find(|(raw, _)| *raw == self.raw)
            .map(|(_, target)| *target)
    }

    pub fn is_special(&self) -> bool { SPECIAL.contains(&self.raw.as_str()) }

    pub fn is(&self, raw: &str) -> bool { self.raw == raw }

    pub fn opening(&self) -> Option<Delim> {
        match self.raw.as_str() {
            "(" => Some(Delim::Paren),
            "{" => Some(Delim::Curly),
            "[" => Some(Delim::Square),
            _ => None,
        }
    }

    pub fn closing(&self) -> Option<Delim> {
        match self.raw.as_str() {
            ")" => Some(Delim::Paren),
            "}" => Some(Delim::Curly),
            "]" => Some(Delim::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Keyword {
    For,
    While,
    If,
    Elif,
    Else,
    In,
    Fn,
    /// The return marker, `->`.
    Return,
}

impl Keyword {
    pub fn try_new(name: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match name {
            "for" => For,
            "while" => While,
            "if" => If,
            "elif" => Elif,
            "else" => Else,
            "in" => In,
            "fn" => Fn,
            "->" => Return,
            _ => {
                return None;
            },
        })
    }

    pub fn raw(&self) -> &'static str {
        use Keyword::*;
        match self {
            For => "for",
            While => "while",
            If => "if",
            Elif => "elif",
            Else => "else",
            In => "in",
            Fn => "fn",
            Return => "->",
        }
    }

    pub fn target(&self) -> &'static str {
        match self {
            Keyword::Fn => "def",
            Keyword::Return => "return",
            other => other.raw(),
        }
    }

    /// Keywords that open an indented block.
    pub fn is_header(&self) -> bool {
        !matches!(self, Keyword::In | Keyword::Return)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}`", self.raw())
    }
}

pub type Nodes = Vec<Node>;

/// One classified lexical unit of a logical line.
/// Each variant keeps the spelling as written (`raw`) and
/// the spelling as emitted (`target`).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    String { raw: String, target: String },
    Number { raw: String, target: String, value: f64 },
    Operator(Operator),
    Operand { raw: String, target: String },
    Keyword(Keyword),
    /// Indentation width of the line, in columns.
    Space(usize),
    EndOfLine,
}

/// Respells a numeric literal the way Python accepts it:
/// no leading `+`, no leading zeros on the whole part,
/// fraction kept as written.
fn canonical_number(raw: &str) -> String {
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => ("-", &raw[1..]),
        Some(b'+') => ("", &raw[1..]),
        _ => ("", raw),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let whole = match whole.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, whole, fraction),
        None => format!("{}{}", sign, whole),
    }
}

impl Node {
    /// Wraps a quoted literal, quotes included.
    pub fn string(raw: &str) -> Node {
        Node::String {
            raw: raw.to_string(),
            target: raw.to_string(),
        }
    }

    /// Parses a numeric spelling; `None` if it is not a
    /// number.
    pub fn number(raw: &str) -> Option<Node> {
        let value = raw.parse::<f64>().ok()?;
        Some(Node::Number {
            raw: raw.to_string(),
            target: canonical_number(raw),
            value,
        })
    }

    pub fn operand(raw: &str) -> Node {
        let target = CONSTANTS
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, target)| target.to_string())
            .unwrap_or_else(|| {
                if RESERVED.contains(&raw) {
                    format!("{}_", raw)
                } else {
                    raw.to_string()
                }
            });

        Node::Operand {
            raw: raw.to_string(),
            target,
        }
    }

    pub fn raw(&self) -> Cow<'_, str> {
        match self {
            Node::String { raw, .. }
            | Node::Number { raw, .. }
            | Node::Operand { raw, .. } => Cow::Borrowed(raw),
            Node::Operator(op) => Cow::Borrowed(&op.raw),
            Node::Keyword(k) => Cow::Borrowed(k.raw()),
            Node::Space(width) => Cow::Owned(" ".repeat(*width)),
            Node::EndOfLine => Cow::Borrowed("\n"),
        }
    }

    /// The emitted spelling. `None` only for operators
    /// without a host-language mapping.
    pub fn target(&self) -> Option<Cow<'_, str>> {
        Some(match self {
            Node::String { target, .. }
            | Node::Number { target, .. }
            | Node::Operand { target, .. } => Cow::Borrowed(target),
            Node::Operator(op) => Cow::Borrowed(op.target()?),
            Node::Keyword(k) => Cow::Borrowed(k.target()),
            Node::Space(width) => Cow::Owned(" ".repeat(*width)),
            Node::EndOfLine => Cow::Borrowed("\n"),
        })
    }

    pub fn operator(&self) -> Option<&Operator> {
        match self {
            Node::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self {
            Node::Keyword(k) => Some(*k),
            _ => None,
        }
    }

    /// True if this node is the structural operator `raw`.
    pub fn is_structural(&self, raw: &str) -> bool {
        matches!(self, Node::Operator(op) if op.arity == Arity::Structural && op.is(raw))
    }

    /// Whether this node can end a value, i.e. be the left
    /// operand of a binary operator.
    pub fn ends_value(&self) -> bool {
        match self {
            Node::String { .. } | Node::Number { .. } | Node::Operand { .. } => {
                true
            },
            Node::Operator(op) => op.closing().is_some(),
            _ => false,
        }
    }

    /// Whether this node can begin a value, i.e. be the
    /// right operand of an operator.
    pub fn starts_value(&self) -> bool {
        match self {
            Node::String { .. } | Node::Number { .. } | Node::Operand { .. } => {
                true
            },
            Node::Operator(op) => {
                op.opening().is_some() || op.arity == Arity::Unary
            },
            _ => false,
        }
    }

    /// The integer a number literal spells, if it is
    /// written without a fractional part.
    pub fn integer(&self) -> Option<i64> {
        match self {
            Node::Number { raw, .. } if !raw.contains('.') => {
                raw.parse::<i64>().ok()
            },
            _ => None,
        }
    }

    /// String contents without the surrounding quotes.
    pub fn string_contents(&self) -> Option<&str> {
        match self {
            Node::String { raw, .. } if raw.len() >= 2 => {
                Some(&raw[1..raw.len() - 1])
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn keyword_spellings_are_recognized(keyword: Keyword) {
            prop_assert_eq!(Keyword::try_new(keyword.raw()), Some(keyword));
        }

        #[test]
        fn delimiters_pair_up(delim: Delim) {
            let open = Operator::new(&delim.open().to_string(), Arity::Structural);
            let close = Operator::new(&delim.close().to_string(), Arity::Structural);
            prop_assert_eq!(open.opening(), Some(delim));
            prop_assert_eq!(close.closing(), Some(delim));
        }
    }

    #[test]
    fn longest_operator_first() {
        assert_eq!(Operator::longest_prefix("..5"), Some(".."));
        assert_eq!(Operator::longest_prefix("== 2"), Some("=="));
        assert_eq!(Operator::longest_prefix("= 2"), Some("="));
        assert_eq!(Operator::longest_prefix("//2"), Some("//"));
        assert_eq!(Operator::longest_prefix("x"), None);
    }

    #[test]
    fn operator_targets() {
        assert_eq!(Operator::new("^", Arity::Binary).target(), Some("**"));
        assert_eq!(Operator::new("&", Arity::Binary).target(), Some("and"));
        assert_eq!(Operator::new("!", Arity::Unary).target(), Some("not"));
        assert_eq!(Operator::new(",", Arity::Structural).target(), Some(","));
        assert_eq!(Operator::new("@", Arity::Binary).target(), None);
        assert!(Operator::new("..", Arity::Binary).is_special());
        assert!(!Operator::new("+", Arity::Binary).is_special());
    }

    #[test]
    fn operand_targets() {
        assert_eq!(Node::operand("true").target().unwrap(), "True");
        assert_eq!(Node::operand("none").target().unwrap(), "None");
        assert_eq!(Node::operand("lambda").target().unwrap(), "lambda_");
        assert_eq!(Node::operand("pass").target().unwrap(), "pass_");
        assert_eq!(Node::operand("total").target().unwrap(), "total");
        assert_eq!(Node::operand("lambda").raw(), "lambda");
    }

    #[test]
    fn numbers_are_unified() {
        let int = Node::number("5").unwrap();
        let float = Node::number("5.0").unwrap();
        match (&int, &float) {
            (Node::Number { value: a, .. }, Node::Number { value: b, .. }) => {
                assert_eq!(a, b)
            },
            _ => panic!("expected numbers"),
        }
        assert_eq!(int.integer(), Some(5));
        assert_eq!(float.integer(), None);
        assert_eq!(Node::number("+3").unwrap().target().unwrap(), "3");
        assert!(Node::number("3x").is_none());
    }

    #[test]
    fn leading_zeros_are_dropped() {
        assert_eq!(Node::number("007").unwrap().target().unwrap(), "7");
        assert_eq!(Node::number("-007").unwrap().target().unwrap(), "-7");
        assert_eq!(Node::number("000").unwrap().target().unwrap(), "0");
        assert_eq!(Node::number("00.50").unwrap().target().unwrap(), "0.50");
        assert_eq!(Node::number("10.25").unwrap().target().unwrap(), "10.25");
        assert_eq!(Node::number("007").unwrap().integer(), Some(7));
    }

    #[test]
    fn keyword_targets() {
        assert_eq!(Keyword::Fn.target(), "def");
        assert_eq!(Keyword::Return.target(), "return");
        assert_eq!(Keyword::Elif.target(), "elif");
        assert!(Keyword::try_new("format").is_none());
    }
}
