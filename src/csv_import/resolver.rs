use log::debug;
use rand::Rng;

use super::{ImportError, ParsedCsv, RawRow, Validation};
use crate::event::{Decorations, EventDraft, EventId, EventRecord, Field};

/// Hands out ids for newly created events.
pub trait IdAllocator {
    fn allocate(&mut self) -> EventId;
}

/// Monotonic id source. Ids are never handed out twice, even after the event
/// carrying one has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCounter {
    next: EventId,
}

impl IdCounter {
    pub fn starting_at(next: EventId) -> Self {
        Self { next: next.max(1) }
    }

    pub fn peek(&self) -> EventId {
        self.next
    }

    /// Moves the counter past an id that was assigned elsewhere.
    pub fn observe(&mut self, id: EventId) {
        self.next = self.next.max(id.saturating_add(1));
    }
}

impl IdAllocator for IdCounter {
    fn allocate(&mut self) -> EventId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Turns the rows that passed validation into event records.
///
/// Either every valid row becomes a record or, when a selected row turns out
/// to lack a required value, nothing is produced and no id is consumed.
pub fn resolve_import<A, R>(
    parsed: &ParsedCsv,
    validation: &Validation,
    ids: &mut A,
    decorations: &Decorations,
    rng: &mut R,
) -> Result<Vec<EventRecord>, ImportError>
where
    A: IdAllocator,
    R: Rng,
{
    let drafts = parsed
        .rows
        .iter()
        .enumerate()
        .filter(|(index, _)| validation.is_valid(*index))
        .map(|(index, row)| draft_from_row(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "Resolved {} of {} rows into events",
        drafts.len(),
        parsed.rows.len()
    );

    Ok(drafts
        .into_iter()
        .map(|draft| draft.into_record(ids.allocate(), decorations, rng))
        .collect())
}

fn draft_from_row(index: usize, row: &RawRow) -> Result<EventDraft, ImportError> {
    let required = |field: Field| -> Result<String, ImportError> {
        row.get(field)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or(ImportError::MissingField { row: index, field })
    };

    Ok(EventDraft {
        title: required(Field::Title)?,
        description: required(Field::Description)?,
        location: required(Field::Location)?,
        date: required(Field::Date)?,
        category: required(Field::Category)?,
        duration: required(Field::Duration)?,
        countdown: row
            .get(Field::Countdown)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        // Imported rows always get a palette colour.
        color: None,
    })
}
