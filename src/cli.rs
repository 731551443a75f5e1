use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::csv_import::Dialect;
use crate::event::EventId;

/// EventDesk - manage an event catalogue, import CSV and export CSV or iCalendar
#[derive(Debug, Parser)]
#[command(name = "eventdesk")]
#[command(about = "Manage an event catalogue with CSV import and CSV/iCalendar export", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute (if not specified, enters interactive mode)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding persisted state
    #[arg(long = "state-dir", global = true)]
    pub state_dir: Option<PathBuf>,

    /// CSV dialect used for import and export
    #[arg(long, value_enum, global = true)]
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List events
    #[command(alias = "ls")]
    List {
        /// Only events in this category
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive text to look for
        #[arg(long)]
        search: Option<String>,
    },

    /// Parse and validate a CSV file without importing it
    Preview {
        file: PathBuf,
    },

    /// Import the valid rows of a CSV file
    Import {
        file: PathBuf,

        /// Write the resulting collection as CSV
        #[arg(long = "csv-out")]
        csv_out: Option<PathBuf>,

        /// Write the resulting collection as iCalendar
        #[arg(long = "ics-out")]
        ics_out: Option<PathBuf>,
    },

    /// Export the collection
    Export {
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the CSV import template
    Template {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Register for an event
    Register {
        id: EventId,
    },

    /// Cancel a registration
    Unregister {
        id: EventId,
    },

    /// List the events you registered for
    Registered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Ics,
}
