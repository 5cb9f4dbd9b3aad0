//! SQL dump parsing

pub mod splitter;

pub use splitter::*;
