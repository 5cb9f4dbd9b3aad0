//! # flightdb Common Library
//!
//! Shared code for the flightdb tools including:
//! - Configuration loading (TOML file, environment, CLI overrides)
//! - Connection establishment with retry
//! - SQL dump statement splitting
//! - Dump import and export engines
//! - ZIP archive helpers

pub mod archive;
pub mod config;
pub mod db;
pub mod dump;
pub mod error;

pub use error::{Error, Result};
