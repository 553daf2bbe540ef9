//! # Block
//! This crate contains the core of the Block transpiler,
//! which turns programs written in Block, a small
//! functional scripting language, into Python 3 source.
//! If you're looking for the command line tool, see the
//! `block-cli` crate in this workspace.
//!
//! ## Embedding Block in Rust
//! Add block to your `Cargo.toml`:
//! ```toml
//! block = "0.1"
//! ```
//! Then simply:
//! ```
//! let python = block::transpile("for i in 1..3: print(i)").unwrap();
//! assert_eq!(python, "for i in range(1, 4): print(i)\n");
//! ```
//!
//! ## Overview of the transpilation process
//! Within the pipeline, source code is represented as a
//! `Source` object, which is normalized into logical
//! lines, built into node sequences, and generated into
//! Python. See the `compiler` module for the details of
//! each step.

use std::rc::Rc;

pub mod common;
pub mod compiler;
pub mod construct;

use crate::{
    common::source::Source,
    compiler::{
        config::Config,
        syntax::Syntax,
    },
};

/// Transpiles a string of Block source with the default
/// configuration.
pub fn transpile(source: &str) -> Result<String, Syntax> {
    transpile_source(Source::source(source), &Config::default())
}

/// Transpiles a `Source`, e.g. one read from a file with
/// [`Source::path`].
pub fn transpile_source(source: Rc<Source>, config: &Config) -> Result<String, Syntax> {
    compiler::gen_with(source, config)
}
