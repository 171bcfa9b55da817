//! Command-line interface for erbeds.
//!
//! This module provides the CLI structure for the `erbeds` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    BedsCommand, ConfigCommand, LocateCommand, OutputFormat, RegionsCommand, ServeCommand,
    ShowCommand,
};

/// erbeds - Real-time emergency room bed availability
///
/// Queries the national emergency medical center API for available ER beds,
/// either from the command line or through a small HTTP API.
#[derive(Debug, Parser)]
#[command(name = "erbeds")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeCommand),

    /// List ER bed availability
    Beds(BedsCommand),

    /// Show details for one hospital
    Show(ShowCommand),

    /// Look up a hospital's location
    Locate(LocateCommand),

    /// List the known provinces and districts
    Regions(RegionsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Regions(RegionsCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "erbeds");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["erbeds", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:8080")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_beds() {
        let args = [
            "erbeds", "beds", "--stage1", "서울특별시", "--stage2", "종로구", "-r", "20", "-s",
            "대학", "--locate", "-f", "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Beds(cmd) => {
                assert_eq!(cmd.region().to_string(), "서울특별시 종로구");
                assert_eq!(cmd.rows, Some(20));
                assert_eq!(cmd.search, "대학");
                assert!(cmd.locate);
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_beds_defaults() {
        let cli = Cli::try_parse_from(["erbeds", "beds"]).unwrap();
        match cli.command {
            Command::Beds(cmd) => {
                assert!(cmd.region().is_nationwide());
                assert_eq!(cmd.rows, None);
                assert!(!cmd.locate);
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_beds_rows_range() {
        assert!(Cli::try_parse_from(["erbeds", "beds", "--rows", "0"]).is_err());
        assert!(Cli::try_parse_from(["erbeds", "beds", "--rows", "5000"]).is_err());
        assert!(Cli::try_parse_from(["erbeds", "beds", "--rows", "-1"]).is_err());

        let cli = Cli::try_parse_from(["erbeds", "beds", "--rows", "1000"]).unwrap();
        assert!(matches!(cli.command, Command::Beds(BedsCommand { rows: Some(1000), .. })));
    }

    #[test]
    fn test_parse_show_and_locate() {
        let cli = Cli::try_parse_from(["erbeds", "show", "A1100010", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Show(ShowCommand { json: true, .. })));

        let cli = Cli::try_parse_from(["erbeds", "locate", "서울대학교병원"]).unwrap();
        match cli.command {
            Command::Locate(cmd) => assert_eq!(cmd.name, "서울대학교병원"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["erbeds", "config", "validate", "-f", "/tmp/erbeds.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["erbeds", "-c", "/custom/config.toml", "regions"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from(["erbeds", "regions", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["erbeds", "beds", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
