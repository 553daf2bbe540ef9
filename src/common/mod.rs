//! Contains datastructures and utility functions
//! shared by every stage of the transpiler.
//!
//! - Source code representation.
//! - Span annotations for diagnostics.

pub mod source;
pub mod span;

pub use source::Source;
pub use span::{
    Span,
    Spanned,
};
