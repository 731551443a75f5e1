use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs;
use std::path::Path;

use crate::cli::ExportFormat;
use crate::commands::{CommandArgs, CommandRegistry};
use crate::config::Config;
use crate::csv_import::{Dialect, ImportPreview};
use crate::event::{EventDraft, EventId, EventRecord};
use crate::export::{CalendarExporter, render_csv};
use crate::notifications::{NotificationQueue, Notifier, Severity};
use crate::state::{KeyValueStore, Registrations};
use crate::store::EventStore;

/// Posted, and returned as the error, when a confirmed preview has no valid rows.
pub const NOTHING_TO_IMPORT: &str = "Nothing to import: the file has no valid rows";

/// Rendered export and the number of events it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutput {
    pub content: String,
    pub events: usize,
}

/// Everything one run of the tool works on.
pub struct Session<S: KeyValueStore> {
    config: Config,
    dialect: Dialect,
    store: EventStore,
    registrations: Registrations<S>,
    notifications: NotificationQueue,
    exporter: CalendarExporter,
    rng: StdRng,
    pending: Option<ImportPreview>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(config: Config, dialect: Dialect, state: S) -> Result<Self> {
        Self::with_rng(config, dialect, state, StdRng::from_os_rng())
    }

    /// Starts from the sample catalogue.
    pub fn with_rng(config: Config, dialect: Dialect, state: S, rng: StdRng) -> Result<Self> {
        let registrations = Registrations::load(state).context("Failed to load registrations")?;
        Ok(Self {
            store: EventStore::seeded(config.decorations()),
            notifications: config.notification_queue(),
            exporter: config.calendar_exporter(),
            config,
            dialect,
            registrations,
            rng,
            pending: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn registrations(&self) -> &Registrations<S> {
        &self.registrations
    }

    pub fn notifications(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    pub fn pending_import(&self) -> Option<&ImportPreview> {
        self.pending.as_ref()
    }

    /// Parses and validates `text`, keeping the result for `confirm_import`.
    pub fn preview(&mut self, text: &str) -> Result<&ImportPreview> {
        let preview = match ImportPreview::new(text, self.dialect) {
            Ok(preview) => preview,
            Err(err) => {
                self.notifications.post(&format!("Import Failed: {err}"), Severity::Error);
                return Err(err.into());
            }
        };
        debug!(
            "Previewed {} rows, {} ready",
            preview.validation().total_rows(),
            preview.ready_count()
        );
        Ok(&*self.pending.insert(preview))
    }

    pub fn preview_file(&mut self, path: &Path) -> Result<&ImportPreview> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSV file {}", path.display()))?;
        self.preview(&text)
    }

    /// Appends the valid rows of the pending preview. Nothing is applied on
    /// failure, and a preview without valid rows is refused.
    pub fn confirm_import(&mut self) -> Result<usize> {
        let preview = self.pending.take().ok_or_else(|| anyhow!("No import preview to confirm"))?;
        if preview.ready_count() == 0 {
            self.notifications.post(NOTHING_TO_IMPORT, Severity::Warning);
            bail!(NOTHING_TO_IMPORT);
        }

        let mut ids = self.store.id_counter();
        let outcome = preview
            .confirm(&mut ids, self.store.decorations(), &mut self.rng)
            .map_err(anyhow::Error::from)
            .and_then(|records| {
                let count = records.len();
                self.store.append(records)?;
                Ok(count)
            });

        match outcome {
            Ok(count) => {
                self.notifications
                    .post(&format!("{count} events imported successfully!"), Severity::Success);
                Ok(count)
            }
            Err(err) => {
                self.notifications.post(&format!("Import Failed: {err}"), Severity::Error);
                Err(err)
            }
        }
    }

    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        self.preview_file(path)?;
        self.confirm_import()
    }

    pub fn export(&mut self, format: ExportFormat) -> Result<ExportOutput> {
        match format {
            ExportFormat::Csv => {
                let content = render_csv(self.store.all(), self.dialect)?;
                self.notifications.post("Events exported to CSV successfully!", Severity::Info);
                Ok(ExportOutput { content, events: self.store.len() })
            }
            ExportFormat::Ics => {
                let (content, events) = self.exporter.render_counted(self.store.all(), Utc::now());
                self.notifications
                    .post("Events exported to calendar format successfully!", Severity::Info);
                Ok(ExportOutput { content, events })
            }
        }
    }

    /// File name offered when the user does not pick one.
    pub fn default_export_filename(&self, format: ExportFormat) -> &str {
        match format {
            ExportFormat::Csv => self.config.export.csv_filename.as_str(),
            ExportFormat::Ics => self.config.export.calendar_filename.as_str(),
        }
    }

    pub fn create(&mut self, draft: EventDraft) -> Result<EventRecord> {
        let record = self.store.create(draft, &mut self.rng)?;
        self.notifications
            .post(&format!("Event \"{}\" created successfully!", record.title), Severity::Success);
        Ok(record)
    }

    pub fn update(&mut self, id: EventId, draft: EventDraft) -> Result<EventRecord> {
        let record = self.store.update(id, draft, &mut self.rng)?;
        self.notifications
            .post(&format!("Event \"{}\" updated successfully!", record.title), Severity::Info);
        Ok(record)
    }

    pub fn delete(&mut self, id: EventId) -> Result<EventRecord> {
        let record = self.store.delete(id)?;
        self.notifications
            .post(&format!("Event \"{}\" deleted successfully!", record.title), Severity::Warning);
        Ok(record)
    }

    /// Returns false when the user was already registered.
    pub fn register(&mut self, id: EventId) -> Result<bool> {
        let title = self.event_title(id)?;
        let added = self.registrations.register(id)?;
        if added {
            self.notifications.post(&format!("You've registered for \"{title}\"!"), Severity::Success);
        } else {
            self.notifications.post(&format!("Already registered for \"{title}\""), Severity::Info);
        }
        Ok(added)
    }

    pub fn unregister(&mut self, id: EventId) -> Result<bool> {
        let title = self.event_title(id)?;
        let removed = self.registrations.unregister(id)?;
        if removed {
            self.notifications
                .post(&format!("Registration for \"{title}\" cancelled"), Severity::Info);
        }
        Ok(removed)
    }

    /// Registered ids that still name an event in the collection.
    pub fn registered_events(&self) -> Vec<&EventRecord> {
        self.registrations.ids().iter().filter_map(|id| self.store.get(*id)).collect()
    }

    fn event_title(&self, id: EventId) -> Result<String> {
        self.store
            .get(id)
            .map(|event| event.title.clone())
            .ok_or_else(|| anyhow!("Event {id} not found"))
    }
}

/// Writes `content` to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Interactive front end over a session.
pub struct Application<S: KeyValueStore> {
    session: Session<S>,
    registry: CommandRegistry<S>,
}

impl<S: KeyValueStore> Application<S> {
    pub fn new(session: Session<S>) -> Self {
        Self { session, registry: CommandRegistry::new() }
    }

    pub fn run(&mut self) -> Result<()> {
        info!("Starting EventDesk interactive session");
        let mut rl = DefaultEditor::new()?;

        println!("Welcome to EventDesk! Type 'help' for commands.");
        let prompt = "eventdesk> ";

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    match self.process_input(&line) {
                        Ok(true) => continue,
                        Ok(false) => break,
                        Err(err) => log::error!("Failed to process command: {:?}", err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Runs one line. Returns false once the user asks to leave.
    pub fn process_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }
        let args = CommandArgs::parse(input)?;
        if matches!(args.command.as_str(), "exit" | "quit") {
            info!("Exiting EventDesk");
            return Ok(false);
        }

        match self.registry.find(&args.command) {
            Some(executor) => executor.execute(args, &mut self.session)?,
            None => bail!("Unknown command '{}'. Type 'help' for commands.", args.command),
        }
        Ok(true)
    }

    pub fn session(&mut self) -> &mut Session<S> {
        &mut self.session
    }
}
