//! CLI module - Command-line interface for devcore
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// devcore - chat service with admin-approved personas
#[derive(Parser)]
#[command(name = "devcore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    Init,

    /// Provision the bootstrap admin identity from the config
    SeedAdmin,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::parse_from(["devcore"]);
        assert_eq!(cli.command(), &Commands::Serve);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["devcore", "seed-admin"]);
        assert_eq!(cli.command(), &Commands::SeedAdmin);

        let cli = Cli::parse_from(["devcore", "daemon"]);
        assert_eq!(cli.command(), &Commands::Serve);
    }
}
