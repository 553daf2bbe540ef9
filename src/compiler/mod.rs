//! This module contains the transpiler implementation.
//!
//! Each step in the pipeline turns one datatype into another,
//! starting with `Source` (string + path):
//!
//! 1. Logical lines:  `normalize.rs`
//! 2. Node sequences: `build.rs`
//! 3. Python source:  `gen.rs` (grouping via `read.rs` first)
//!
//! `prelude.rs` holds the builtin runtime that generated
//! code may import or carry inline.
//!
//! Every step fails fast with a single `Syntax` error.
//! The free functions below chain the steps, so
//! `gen(source)` runs the whole pipeline.

use std::rc::Rc;

use crate::{
    common::{
        source::Source,
        span::Spanned,
    },
    construct::{
        line::LogicalLine,
        node::Nodes,
    },
};

pub mod build;
pub mod gen;
pub mod normalize;
pub mod read;

pub mod config;
pub mod prelude;
pub mod syntax;

pub use build::Builder;
pub use config::{
    Config,
    Prelude,
};
pub use gen::Generator;
pub use normalize::Normalizer;
pub use syntax::Syntax;

pub fn normalize(source: Rc<Source>) -> Result<Vec<LogicalLine>, Syntax> {
    normalize_with(source, &Config::default())
}

pub fn build(source: Rc<Source>) -> Result<Vec<Spanned<Nodes>>, Syntax> {
    build_with(source, &Config::default())
}

pub fn gen(source: Rc<Source>) -> Result<String, Syntax> { gen_with(source, &Config::default()) }

pub fn normalize_with(
    source: Rc<Source>,
    config: &Config,
) -> Result<Vec<LogicalLine>, Syntax> {
    config.validate()?;
    Normalizer::normalize(source, config)
}

pub fn build_with(
    source: Rc<Source>,
    config: &Config,
) -> Result<Vec<Spanned<Nodes>>, Syntax> {
    let lines = normalize_with(source, config)?;
    Builder::build(&lines, config)
}

pub fn gen_with(source: Rc<Source>, config: &Config) -> Result<String, Syntax> {
    let sequences = build_with(source, config)?;
    Generator::generate(&sequences, config)
}
