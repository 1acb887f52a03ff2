//! Command implementations
//!
//! - install: converge the extension directory on a requested set
//! - list: show catalog extensions and their versions

pub mod install;
pub mod list;
