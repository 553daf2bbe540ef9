//! The datastructures passed between pipeline stages:
//! logical lines out of the normalizer, node sequences
//! out of the builder, and the per-line trees the
//! generator reads them into.

pub mod line;
pub mod node;
pub mod tree;
