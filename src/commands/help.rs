use anyhow::Result;
use std::time::Instant;

use crate::app::Session;
use crate::commands::{CommandArgs, CommandExecutor};
use crate::state::KeyValueStore;

pub struct HelpCommand;

impl<S: KeyValueStore> CommandExecutor<S> for HelpCommand {
    fn execute(&self, args: CommandArgs, session: &mut Session<S>) -> Result<()> {
        match args.command.as_str() {
            "notifications" => show_notifications(&args, session),
            _ => {
                print_help();
                Ok(())
            }
        }
    }

    fn can_handle(&self, command: &str) -> bool {
        matches!(command, "help" | "notifications")
    }
}

fn show_notifications<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    if args.args.first().map(String::as_str) == Some("dismiss") {
        let id = match args.args.get(1).and_then(|raw| raw.parse().ok()) {
            Some(id) => id,
            None => anyhow::bail!("'notifications dismiss' needs a notification id"),
        };
        if !session.notifications().dismiss(id) {
            println!("No notification {id}");
        }
        return Ok(());
    }

    let active = session.notifications().active(Instant::now());
    if active.is_empty() {
        println!("No notifications");
    }
    for notification in active {
        println!("  {} {}", notification.id, notification);
    }
    Ok(())
}

pub fn print_help() {
    println!("EventDesk - event catalogue administration");
    println!("\nEvents:");
    println!("  list [--category <name>] [--search <text>]   List events");
    println!("  show <id>                                    Show one event");
    println!("  create --title <t> --description <d> --location <l> --date <date>");
    println!("         --category <c> --duration <2h|3d|90m> [--countdown <text>] [--color <hex>]");
    println!("  edit <id> [--<field> <value> ...]            Change fields of an event");
    println!("  delete <id>                                  Remove an event");

    println!("\nImport and export:");
    println!("  preview <file.csv>                           Validate a CSV file");
    println!("  confirm                                      Import the valid rows of the last preview");
    println!("  import <file.csv>                            Preview and import in one step");
    println!("  export <csv|ics> [--output <file>]           Export the collection");
    println!("  template [--output <file>]                   Write a CSV template");

    println!("\nRegistration:");
    println!("  register <id>                                Register for an event");
    println!("  unregister <id>                              Cancel a registration");
    println!("  registered                                   List your registrations");

    println!("\nOther:");
    println!("  notifications [dismiss <id>]                 Show recent notifications");
    println!("  help                                         Show this help");
    println!("  exit                                         Leave the session");
}
