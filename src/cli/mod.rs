//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod analyze;
pub mod config;

use clap::{Parser, Subcommand};

/// Yield map interpolation and management zone delineation
#[derive(Parser)]
#[command(name = "yield-zones")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interpolate a harvest file and delineate management zones
    Analyze(analyze::AnalyzeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::Config(args) => config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["yield-zones", "analyze", "field.csv", "-f", "json"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyze(_)));

        let cli = Cli::try_parse_from(["yield-zones", "config", "idw.power", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
