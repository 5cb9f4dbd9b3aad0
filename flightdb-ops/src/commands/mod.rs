//! Subcommand implementations

pub mod archive;
pub mod bench;
pub mod check;
pub mod export;
pub mod import;
pub mod parallel;
pub mod ping;
