//! In-memory event collection for one session.

use log::{debug, info};
use rand::Rng;

use crate::csv_import::{IdAllocator, IdCounter};
use crate::event::{Decorations, EventDraft, EventId, EventRecord, Field};

/// Category filter value that matches every event.
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Event {0} not found")]
    NotFound(EventId),
    #[error("Event id {0} is already in use")]
    DuplicateId(EventId),
    #[error("Missing required fields: {}", join_fields(.0))]
    Invalid(Vec<Field>),
}

fn join_fields(fields: &[Field]) -> String {
    fields.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone)]
pub struct EventStore {
    events: Vec<EventRecord>,
    ids: IdCounter,
    decorations: Decorations,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::with_events(Vec::new(), Decorations::default())
    }
}

impl EventStore {
    /// Store pre-filled with the sample catalogue.
    pub fn seeded(decorations: Decorations) -> Self {
        Self::with_events(sample_events(), decorations)
    }

    pub fn with_events(events: Vec<EventRecord>, decorations: Decorations) -> Self {
        let mut ids = IdCounter::starting_at(1);
        for event in &events {
            ids.observe(event.id);
        }
        Self { events, ids, decorations }
    }

    pub fn all(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Copy of the id counter for building a batch. Committed by `append`.
    pub fn id_counter(&self) -> IdCounter {
        self.ids
    }

    /// Appends a batch. Rejected as a whole if any id collides.
    pub fn append(&mut self, records: Vec<EventRecord>) -> Result<(), StoreError> {
        for (index, record) in records.iter().enumerate() {
            let clashes_in_batch = records[..index].iter().any(|other| other.id == record.id);
            if clashes_in_batch || self.get(record.id).is_some() {
                return Err(StoreError::DuplicateId(record.id));
            }
        }

        for record in &records {
            self.ids.observe(record.id);
        }
        info!("Appended {} events to the collection", records.len());
        self.events.extend(records);
        Ok(())
    }

    pub fn create<R: Rng>(&mut self, draft: EventDraft, rng: &mut R) -> Result<EventRecord, StoreError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::Invalid(missing));
        }

        let draft = EventDraft {
            color: draft.color.or_else(|| Some(self.decorations.default_color().to_string())),
            ..draft
        };
        let record = draft.into_record(self.ids.allocate(), &self.decorations, rng);
        debug!("Created event {} ('{}')", record.id, record.title);
        self.events.push(record.clone());
        Ok(record)
    }

    pub fn update<R: Rng>(
        &mut self,
        id: EventId,
        draft: EventDraft,
        rng: &mut R,
    ) -> Result<EventRecord, StoreError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(StoreError::Invalid(missing));
        }

        let slot = self
            .events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let draft = EventDraft { color: draft.color.or_else(|| Some(slot.color.clone())), ..draft };
        *slot = draft.into_record(id, &self.decorations, rng);
        debug!("Updated event {id}");
        Ok(slot.clone())
    }

    pub fn delete(&mut self, id: EventId) -> Result<EventRecord, StoreError> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = self.events.remove(index);
        debug!("Deleted event {id} ('{}')", removed.title);
        Ok(removed)
    }

    /// Case-insensitive match of `term` against title, description and
    /// location, restricted to `category` unless it is absent or "All".
    pub fn search(&self, term: &str, category: Option<&str>) -> Vec<&EventRecord> {
        let term = term.trim().to_lowercase();
        let category = category.filter(|c| !c.is_empty() && *c != ALL_CATEGORIES);

        self.events
            .iter()
            .filter(|event| category.map_or(true, |c| event.category == c))
            .filter(|event| {
                term.is_empty()
                    || [&event.title, &event.description, &event.location]
                        .iter()
                        .any(|text| text.to_lowercase().contains(&term))
            })
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for event in &self.events {
            if !categories.contains(&event.category.as_str()) {
                categories.push(&event.category);
            }
        }
        categories
    }
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: EventId,
    title: &str,
    description: &str,
    location: &str,
    date: &str,
    color: &str,
    duration: &str,
    countdown: &str,
) -> EventRecord {
    EventRecord {
        id,
        title: title.into(),
        description: description.into(),
        location: location.into(),
        date: date.into(),
        category: title.into(),
        duration: duration.into(),
        countdown: countdown.into(),
        color: color.into(),
    }
}

/// The catalogue every session starts from.
pub fn sample_events() -> Vec<EventRecord> {
    vec![
        sample(1, "Meet up", "AMA Session with Learning Team", "42AD Makerspace", "May 14, 2025", "#00c2c7", "1h", "in 3 days"),
        sample(2, "Hackathon", "AI Hackathon: AI for Safe and Sustainable Energy", "42AD Campus", "May 27, 2025", "#1ed760", "24h", "in 16 days"),
        sample(3, "Piscine", "Piscine Data Science -- Advanced Curriculum", "42 Berlin, Germany", "June 2, 2025", "#ff6b6b", "6d", "in 22 days"),
        sample(4, "Workshop", "Web3 Development Workshop: Building on Ethereum", "Virtual Event", "May 18, 2025", "#8f00ff", "3h", "in 7 days"),
        sample(5, "Conference", "Tech Trends 2025: Future of Computing", "Abu Dhabi National Exhibition Centre", "June 10, 2025", "#ff2c2c", "2d", "in 30 days"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_case::test_case;

    fn draft(title: &str) -> EventDraft {
        EventDraft {
            title: title.into(),
            description: "Evening talks".into(),
            location: "42AD Campus".into(),
            date: "July 1, 2025".into(),
            category: "Meet up".into(),
            duration: "2h".into(),
            countdown: None,
            color: None,
        }
    }

    #[test]
    fn seeded_store_continues_after_sample_ids() {
        let mut store = EventStore::seeded(Decorations::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(store.len(), 5);

        let created = store.create(draft("Demo day"), &mut rng).unwrap();
        assert_eq!(created.id, 6);
        assert_eq!(created.color, "#00c2c7");
        assert!(created.countdown.starts_with("in "));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut store = EventStore::seeded(Decorations::default());
        let mut rng = StdRng::seed_from_u64(1);
        store.delete(5).unwrap();
        let created = store.create(draft("Demo day"), &mut rng).unwrap();
        assert_eq!(created.id, 6);
        assert_eq!(store.delete(5), Err(StoreError::NotFound(5)));
    }

    #[test]
    fn create_rejects_incomplete_drafts() {
        let mut store = EventStore::default();
        let mut rng = StdRng::seed_from_u64(1);
        let result = store.create(EventDraft { location: String::new(), ..draft("Demo") }, &mut rng);
        assert_eq!(result, Err(StoreError::Invalid(vec![Field::Location])));
        assert!(store.is_empty());
    }

    #[test]
    fn update_replaces_fields_and_keeps_colour() {
        let mut store = EventStore::seeded(Decorations::default());
        let mut rng = StdRng::seed_from_u64(1);
        let updated = store
            .update(4, EventDraft { countdown: Some("in 1 days".into()), ..draft("Rust Workshop") }, &mut rng)
            .unwrap();
        assert_eq!(updated.id, 4);
        assert_eq!(updated.color, "#8f00ff");
        assert_eq!(store.get(4).unwrap().title, "Rust Workshop");
        assert_eq!(store.update(99, draft("x"), &mut rng), Err(StoreError::NotFound(99)));
    }

    #[test]
    fn append_rejects_colliding_batches() {
        let mut store = EventStore::seeded(Decorations::default());
        let mut batch = sample_events();
        batch.truncate(1);
        assert_eq!(store.append(batch), Err(StoreError::DuplicateId(1)));
        assert_eq!(store.len(), 5);

        let fresh = EventRecord { id: 12, ..sample_events().remove(0) };
        store.append(vec![fresh]).unwrap();
        assert_eq!(store.id_counter().peek(), 13);
    }

    #[test_case("", None, 5 ; "no filter")]
    #[test_case("HACK", None, 1 ; "case insensitive title")]
    #[test_case("berlin", None, 1 ; "location")]
    #[test_case("ethereum", Some("Workshop"), 1 ; "description within category")]
    #[test_case("ethereum", Some("Conference"), 0 ; "category excludes")]
    #[test_case("", Some("All"), 5 ; "all categories")]
    fn search_filters_events(term: &str, category: Option<&str>, expected: usize) {
        let store = EventStore::seeded(Decorations::default());
        assert_eq!(store.search(term, category).len(), expected);
    }

    #[test]
    fn lists_categories_once() {
        let mut store = EventStore::seeded(Decorations::default());
        let mut rng = StdRng::seed_from_u64(1);
        store.create(draft("Another meet up"), &mut rng).unwrap();
        assert_eq!(
            store.categories(),
            vec!["Meet up", "Hackathon", "Piscine", "Workshop", "Conference"]
        );
    }
}
