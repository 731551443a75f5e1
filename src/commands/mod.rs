use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::app::Session;
use crate::event::EventId;
use crate::state::KeyValueStore;

/// One line of interactive input split into words and `--flag value` pairs.
#[derive(Debug, PartialEq)]
pub struct CommandArgs {
    pub command: String,
    pub args: Vec<String>,
    pub flags: HashMap<String, Option<String>>,
}

impl CommandArgs {
    pub fn parse(input: &str) -> Result<Self> {
        let normalized_input = input.replace('\u{a0}', " ");

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut escaped = false;

        for c in normalized_input.trim().chars() {
            match c {
                '\\' if !escaped => {
                    escaped = true;
                }
                '"' if !escaped => {
                    in_quotes = !in_quotes;
                    if !in_quotes {
                        parts.push(std::mem::take(&mut current));
                    }
                }
                c if c.is_whitespace() && !in_quotes => {
                    if !current.is_empty() {
                        parts.push(std::mem::take(&mut current));
                    }
                }
                _ => {
                    if escaped && c != '"' {
                        current.push('\\');
                    }
                    current.push(c);
                    escaped = false;
                }
            }
        }

        if !current.is_empty() {
            parts.push(current);
        }

        if parts.is_empty() {
            return Err(anyhow!("No command provided"));
        }

        let command = parts.remove(0).to_lowercase();
        let mut args = Vec::new();
        let mut flags = HashMap::new();
        let mut i = 0;

        while i < parts.len() {
            if parts[i].starts_with("--") {
                let flag = parts[i].clone();
                if i + 1 < parts.len() && !parts[i + 1].starts_with("--") {
                    flags.insert(flag, Some(parts[i + 1].clone()));
                    i += 1;
                } else {
                    flags.insert(flag, None);
                }
            } else {
                args.push(parts[i].clone());
            }
            i += 1;
        }

        log::debug!("Parsed command: {:?}, args: {:?}, flags: {:?}", command, args, flags);

        Ok(CommandArgs { command, args, flags })
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|value| value.as_deref())
    }

    /// First positional argument as an event id.
    pub fn event_id(&self) -> Result<EventId> {
        let raw = self.args.first().ok_or_else(|| anyhow!("'{}' needs an event id", self.command))?;
        raw.parse().map_err(|_| anyhow!("'{raw}' is not an event id"))
    }
}

pub trait CommandExecutor<S: KeyValueStore> {
    fn execute(&self, args: CommandArgs, session: &mut Session<S>) -> Result<()>;
    fn can_handle(&self, command: &str) -> bool;
}

pub struct CommandRegistry<S: KeyValueStore> {
    executors: Vec<Box<dyn CommandExecutor<S>>>,
}

impl<S: KeyValueStore> CommandRegistry<S> {
    pub fn new() -> Self {
        Self {
            executors: vec![
                Box::new(events::EventsCommand),
                Box::new(transfer::TransferCommand),
                Box::new(registration::RegistrationCommand),
                Box::new(help::HelpCommand),
            ],
        }
    }

    pub fn find(&self, command: &str) -> Option<&dyn CommandExecutor<S>> {
        self.executors.iter().find(|executor| executor.can_handle(command)).map(|executor| executor.as_ref())
    }
}

impl<S: KeyValueStore> Default for CommandRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub mod events;
pub mod help;
pub mod registration;
pub mod transfer;
