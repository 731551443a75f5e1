use anyhow::Result;

use crate::app::Session;
use crate::commands::events::print_event_list;
use crate::commands::{CommandArgs, CommandExecutor};
use crate::state::KeyValueStore;

pub struct RegistrationCommand;

impl<S: KeyValueStore> CommandExecutor<S> for RegistrationCommand {
    fn execute(&self, args: CommandArgs, session: &mut Session<S>) -> Result<()> {
        match args.command.as_str() {
            "register" => {
                let id = args.event_id()?;
                if !session.register(id)? {
                    println!("You are already registered for event {id}");
                }
                Ok(())
            }
            "unregister" => {
                let id = args.event_id()?;
                if !session.unregister(id)? {
                    println!("You were not registered for event {id}");
                }
                Ok(())
            }
            "registered" => {
                print_event_list(&session.registered_events());
                Ok(())
            }
            _ => {
                println!("Unknown registration command");
                Ok(())
            }
        }
    }

    fn can_handle(&self, command: &str) -> bool {
        matches!(command, "register" | "unregister" | "registered")
    }
}
