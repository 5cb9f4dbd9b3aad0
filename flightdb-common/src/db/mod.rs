//! Database access: connection management, dump import and export

pub mod connect;
pub mod export;
pub mod import;
pub mod values;

pub use connect::*;
pub use export::*;
pub use import::*;
pub use values::*;
