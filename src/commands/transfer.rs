use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::app::{Session, write_output};
use crate::cli::ExportFormat;
use crate::commands::{CommandArgs, CommandExecutor};
use crate::csv_import::TEMPLATE_CSV;
use crate::state::KeyValueStore;

pub struct TransferCommand;

impl<S: KeyValueStore> CommandExecutor<S> for TransferCommand {
    fn execute(&self, args: CommandArgs, session: &mut Session<S>) -> Result<()> {
        match args.command.as_str() {
            "preview" => preview(&args, session),
            "confirm" => confirm(session),
            "import" => import(&args, session),
            "export" => export(&args, session),
            "template" => template(&args, session),
            _ => {
                println!("Unknown transfer command");
                Ok(())
            }
        }
    }

    fn can_handle(&self, command: &str) -> bool {
        matches!(command, "preview" | "confirm" | "import" | "export" | "template")
    }
}

fn file_arg(args: &CommandArgs) -> Result<PathBuf> {
    match args.args.first() {
        Some(path) => Ok(PathBuf::from(path)),
        None => bail!("'{}' needs a CSV file path", args.command),
    }
}

fn preview<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let path = file_arg(args)?;
    let preview = session.preview_file(&path)?;
    print!("{preview}");
    if preview.ready_count() > 0 {
        println!("Type 'confirm' to import the valid rows.");
    }
    Ok(())
}

fn confirm<S: KeyValueStore>(session: &mut Session<S>) -> Result<()> {
    let count = session.confirm_import()?;
    println!("{count} events imported successfully!");
    Ok(())
}

fn import<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let path = file_arg(args)?;
    let count = session.import_file(&path)?;
    println!("{count} events imported successfully!");
    Ok(())
}

pub(crate) fn parse_format(raw: Option<&str>) -> Result<ExportFormat> {
    match raw.map(str::to_lowercase).as_deref() {
        Some("csv") => Ok(ExportFormat::Csv),
        Some("ics") | Some("ical") | Some("calendar") => Ok(ExportFormat::Ics),
        Some(other) => bail!("Unknown export format '{other}'. Use 'csv' or 'ics'."),
        None => bail!("'export' needs a format: csv or ics"),
    }
}

fn export<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let format = parse_format(args.args.first().map(String::as_str))?;
    let exported = session.export(format)?;
    // interactive exports always land in a file
    let target = args
        .flag("--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(session.default_export_filename(format)));
    write_output(&exported.content, Some(target.as_path()))?;
    println!("Exported {} events to {}", exported.events, target.display());
    Ok(())
}

fn template<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let target = args
        .flag("--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&session.config().export.template_filename));
    write_output(TEMPLATE_CSV, Some(target.as_path()))?;
    println!("Template written to {}", target.display());
    Ok(())
}
