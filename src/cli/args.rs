//! CLI argument definitions using clap
//!
//! Commands:
//! - rato-schema kinds [--config <path>]
//! - rato-schema export [--config <path>] [--output <path>]
//! - rato-schema validate --kind <kind> [--partial] [--config <path>]
//! - rato-schema check [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schema validation and referential integrity for the music platform store
#[derive(Parser, Debug)]
#[command(name = "rato-schema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List entity kinds and their required fields
    Kinds {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the active schema definitions as JSON
    Export {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write to a new file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate one document read from stdin
    Validate {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Entity kind, by name or collection name
        #[arg(long)]
        kind: String,

        /// Treat the document as a partial update
        #[arg(long)]
        partial: bool,
    },

    /// Validate newline-delimited {"kind", "document", "partial"?} requests from stdin
    Check {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["rato-schema", "validate", "--kind", "avaliacoes"]).unwrap();
        match cli.command {
            Command::Validate {
                config,
                kind,
                partial,
            } => {
                assert!(config.is_none());
                assert_eq!(kind, "avaliacoes");
                assert!(!partial);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_partial_flag() {
        let cli =
            Cli::try_parse_from(["rato-schema", "validate", "--kind", "colecoes", "--partial"])
                .unwrap();
        assert!(matches!(cli.command, Command::Validate { partial: true, .. }));
    }

    #[test]
    fn test_validate_requires_kind() {
        assert!(Cli::try_parse_from(["rato-schema", "validate"]).is_err());
    }
}
