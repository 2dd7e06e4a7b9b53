//! rato-schema entry point
//!
//! Parses arguments and dispatches through `cli::run`. Errors are printed
//! as a JSON error envelope and the process exits non-zero.

use rato_schema::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::write_error(e.code(), &e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
