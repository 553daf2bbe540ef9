//! The few knobs the pipeline honours.
//!
//! Defaults are what the CLI uses without a `block.toml`.
//! With the `serde` feature, a `Config` deserializes from
//! the `[transpile]` table of that manifest.

use std::{
    fmt,
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::compiler::syntax::{
    Stage,
    Syntax,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Config {
    /// Spaces of output per nesting level.
    pub indent: usize,
    /// Columns a tab counts for in source indentation.
    pub tab_width: usize,
    /// Whether and how the builtin runtime is provided.
    pub prelude: Prelude,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: 4,
            tab_width: 4,
            prelude: Prelude::Off,
        }
    }
}

/// How generated code gets at the builtin runtime. With
/// any mode but `Off`, user names are prefixed with
/// `block_` so they can't shadow a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Prelude {
    /// Plain Python, builtins are not available.
    Off,
    /// The runtime is pasted above the generated code.
    Inline,
    /// The generated code imports the runtime module,
    /// which must sit next to it.
    Import,
}

impl Prelude {
    pub fn is_on(&self) -> bool { *self != Prelude::Off }
}

impl FromStr for Prelude {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Prelude::Off),
            "inline" => Ok(Prelude::Inline),
            "import" => Ok(Prelude::Import),
            other => Err(format!(
                "unknown prelude mode '{}', expected off, inline or import",
                other
            )),
        }
    }
}

impl fmt::Display for Prelude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Prelude::Off => "off",
            Prelude::Inline => "inline",
            Prelude::Import => "import",
        };

        write!(f, "{}", name)
    }
}

impl Config {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_prelude(mut self, prelude: Prelude) -> Self {
        self.prelude = prelude;
        self
    }

    /// Rejects settings that would produce unreadable
    /// output.
    pub fn validate(&self) -> Result<(), Syntax> {
        if self.indent == 0 {
            return Err(Syntax::error_no_note(
                Stage::Generate,
                "Output indentation must be at least one space",
            ));
        }
        if self.tab_width == 0 {
            return Err(Syntax::error_no_note(
                Stage::Normalize,
                "Tab width must be at least one column",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.indent, 4);
        assert_eq!(config.tab_width, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_indent_rejected() {
        let error = Config::default().with_indent(0).validate().unwrap_err();
        assert_eq!(error.stage, Stage::Generate);
        assert!(Config::default().with_tab_width(0).validate().is_err());
    }

    #[test]
    fn prelude_modes() {
        assert_eq!(Config::default().prelude, Prelude::Off);
        assert_eq!("inline".parse::<Prelude>(), Ok(Prelude::Inline));
        assert_eq!("import".parse::<Prelude>(), Ok(Prelude::Import));
        assert!("always".parse::<Prelude>().is_err());
        assert_eq!(Prelude::Import.to_string(), "import");
        assert!(!Prelude::Off.is_on());
    }
}
