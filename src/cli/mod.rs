//! Command-line interface
//!
//! - kinds: list entity kinds and required fields
//! - export: print or save the active schema definitions
//! - validate: validate one document (or partial update) from stdin
//! - check: validate newline-delimited requests from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, export, kinds, run, run_command, validate, Config};
pub use errors::{CliError, CliResult};
pub use io::{read_request, read_requests, read_requests_from, write_error, write_response};
