//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::region::RegionQuery;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Beds command arguments.
#[derive(Debug, Args)]
pub struct BedsCommand {
    /// Province (e.g. "서울특별시"); omit for nationwide
    #[arg(long, default_value = "")]
    pub stage1: String,

    /// District within the province (e.g. "강남구")
    #[arg(long, default_value = "")]
    pub stage2: String,

    /// Number of rows to request, 1 to 1000 (defaults to `beds.default_rows`)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub rows: Option<u32>,

    /// Only show hospitals whose name contains this text
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Look up coordinates for each hospital
    #[arg(short, long)]
    pub locate: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl BedsCommand {
    /// Region selected by the arguments.
    #[must_use]
    pub fn region(&self) -> RegionQuery {
        RegionQuery::new(self.stage1.as_str(), self.stage2.as_str())
    }
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Institution id (hpid)
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Locate command arguments.
#[derive(Debug, Args)]
pub struct LocateCommand {
    /// Hospital name to search for
    pub name: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Regions command arguments.
#[derive(Debug, Args)]
pub struct RegionsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
