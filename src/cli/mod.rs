//! Command-line interface for labelforge.
//!
//! Provides commands for request file generation, cost estimation, batch
//! job submission and retrieval, and direct concurrent processing.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
