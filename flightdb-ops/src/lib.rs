//! Operations toolkit for the flight reservation database
//!
//! Library target backing the `flightdb-ops` binary. The modules here are
//! exposed so integration tests can drive subcommand logic directly:
//! - `cli`: clap argument definitions
//! - `commands`: one module per subcommand
//! - `checks`: built-in consistency check catalog and runner
//! - `report`: JSON/human report types shared by check, bench and
//!   parallel-import

pub mod checks;
pub mod cli;
pub mod commands;
pub mod report;
