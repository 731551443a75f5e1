pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod csv_import;
pub mod event;
pub mod export;
pub mod notifications;
pub mod state;
pub mod store;

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::Env;
use log::*;
use std::io::Write;

use crate::app::{Application, Session, write_output};
use crate::cli::{Cli, Commands, ExportFormat};
use crate::commands::events::print_event_list;
use crate::csv_import::TEMPLATE_CSV;
use crate::state::{JsonFileStore, KeyValueStore};

/// Loads configuration and state, then runs one command or the interactive session.
pub fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.state_dir {
        config.storage.state_dir = Some(dir);
    }
    let dialect = cli.dialect.unwrap_or(config.import.dialect);

    let state_dir = config.state_dir()?;
    let state = JsonFileStore::open(&state_dir)
        .with_context(|| format!("Failed to open state in {}", state_dir.display()))?;
    debug!("Using state file {}", state.path().display());

    let mut session = Session::new(config, dialect, state)?;
    match cli.command {
        Some(command) => run_command(command, &mut session),
        None => {
            info!("Initializing EventDesk application");
            Application::new(session).run()
        }
    }
}

fn run_command<S: KeyValueStore>(command: Commands, session: &mut Session<S>) -> Result<()> {
    match command {
        Commands::List { category, search } => {
            let store = session.store();
            print_event_list(&store.search(search.as_deref().unwrap_or_default(), category.as_deref()));
        }
        Commands::Preview { file } => {
            let preview = session.preview_file(&file)?;
            print!("{preview}");
        }
        Commands::Import { file, csv_out, ics_out } => {
            let count = session.import_file(&file)?;
            println!("{count} events imported successfully!");
            if let Some(path) = csv_out {
                let csv = session.export(ExportFormat::Csv)?;
                write_output(&csv.content, Some(path.as_path()))?;
            }
            if let Some(path) = ics_out {
                let ics = session.export(ExportFormat::Ics)?;
                write_output(&ics.content, Some(path.as_path()))?;
            }
        }
        Commands::Export { format, output } => {
            let exported = session.export(format)?;
            write_output(&exported.content, output.as_deref())?;
            if output.is_some() {
                info!("Exported {} events", exported.events);
            }
        }
        Commands::Template { output } => write_output(TEMPLATE_CSV, output.as_deref())?,
        Commands::Register { id } => {
            if !session.register(id)? {
                println!("You are already registered for event {id}");
            }
        }
        Commands::Unregister { id } => {
            if !session.unregister(id)? {
                println!("You were not registered for event {id}");
            }
        }
        Commands::Registered => print_event_list(&session.registered_events()),
    }
    Ok(())
}

pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}


// Re-export commonly used types
pub use config::Config;
pub use event::{EventDraft, EventRecord};
pub use store::EventStore;
