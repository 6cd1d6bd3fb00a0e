//! Configuration and dependency wiring for the importer.

mod cli;
mod dependencies;

pub use cli::{Cli, ImportConfig};
pub use dependencies::Dependencies;
