use anyhow::Result;
use log::debug;

use crate::app::Session;
use crate::commands::{CommandArgs, CommandExecutor};
use crate::event::{EventDraft, EventRecord};
use crate::state::KeyValueStore;
use crate::store::ALL_CATEGORIES;

pub struct EventsCommand;

impl<S: KeyValueStore> CommandExecutor<S> for EventsCommand {
    fn execute(&self, args: CommandArgs, session: &mut Session<S>) -> Result<()> {
        match args.command.as_str() {
            "list" | "ls" => list_events(&args, session),
            "show" => show_event(&args, session),
            "create" | "add" => create_event(&args, session),
            "edit" => edit_event(&args, session),
            "delete" | "rm" => delete_event(&args, session),
            _ => {
                println!("Unknown event command");
                Ok(())
            }
        }
    }

    fn can_handle(&self, command: &str) -> bool {
        matches!(command, "list" | "ls" | "show" | "create" | "add" | "edit" | "delete" | "rm")
    }
}

fn list_events<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let term = args.flag("--search").unwrap_or_default();
    let category = args.flag("--category");
    let store = session.store();
    print_event_list(&store.search(term, category));

    if category.is_none() {
        let categories = store.categories();
        println!("Categories: {}, {}", ALL_CATEGORIES, categories.join(", "));
    }
    Ok(())
}

fn show_event<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let id = args.event_id()?;
    match session.store().get(id) {
        Some(event) => {
            print_event(event);
            if session.registrations().is_registered(id) {
                println!("    Registered: yes");
            }
        }
        None => println!("Event {id} not found"),
    }
    Ok(())
}

fn create_event<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let draft = draft_from_flags(args, EventDraft::default());
    let record = session.create(draft)?;
    println!("Created event {}:", record.id);
    print_event(&record);
    Ok(())
}

fn edit_event<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let id = args.event_id()?;
    let Some(existing) = session.store().get(id) else {
        println!("Event {id} not found");
        return Ok(());
    };
    let draft = draft_from_flags(args, EventDraft::from(existing.clone()));
    let record = session.update(id, draft)?;
    println!("Updated event {}:", record.id);
    print_event(&record);
    Ok(())
}

fn delete_event<S: KeyValueStore>(args: &CommandArgs, session: &mut Session<S>) -> Result<()> {
    let id = args.event_id()?;
    let removed = session.delete(id)?;
    println!("Deleted event {} ('{}')", removed.id, removed.title);
    Ok(())
}

/// Overlays `--field value` flags on `base`.
fn draft_from_flags(args: &CommandArgs, base: EventDraft) -> EventDraft {
    let pick = |flag: &str, current: String| args.flag(flag).map(str::to_string).unwrap_or(current);
    let draft = EventDraft {
        title: pick("--title", base.title),
        description: pick("--description", base.description),
        location: pick("--location", base.location),
        date: pick("--date", base.date),
        category: pick("--category", base.category),
        duration: pick("--duration", base.duration),
        countdown: args.flag("--countdown").map(str::to_string).or(base.countdown),
        color: args.flag("--color").map(str::to_string).or(base.color),
    };
    debug!("Draft from flags: {:?}", draft);
    draft
}

pub(crate) fn print_event_list(events: &[&EventRecord]) {
    if events.is_empty() {
        println!("No events found");
        return;
    }
    println!("Events:");
    for event in events {
        print_event(event);
        println!();
    }
}

pub(crate) fn print_event(event: &EventRecord) {
    println!("  [{}] {}", event.id, event.title);
    println!("    {}", event.description);
    println!("    Date: {} ({})", event.date, event.countdown);
    println!("    Duration: {}", event.duration);
    println!("    Location: {}", event.location);
    println!("    Category: {}", event.category);
}
