use chrono::{DateTime, Utc};
use ics::properties::{Categories, Description, DtEnd, DtStart, Location, Summary};
use ics::{ICalendar, escape_text};
use log::{debug, warn};

use crate::event::{EventRecord, event_end};

pub const CALENDAR_MIME: &str = "text/calendar";
pub const DEFAULT_CALENDAR_FILENAME: &str = "42_events.ics";
pub const DEFAULT_PRODUCT_ID: &str = "-//42 Abu Dhabi//Events Calendar//EN";
pub const DEFAULT_UID_DOMAIN: &str = "42abudhabi.events";

/// Basic UTC form used for every timestamp in the calendar.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarExporter {
    product_id: String,
    uid_domain: String,
}

impl Default for CalendarExporter {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_ID, DEFAULT_UID_DOMAIN)
    }
}

impl CalendarExporter {
    pub fn new(product_id: impl Into<String>, uid_domain: impl Into<String>) -> Self {
        Self { product_id: product_id.into(), uid_domain: uid_domain.into() }
    }

    pub fn render_now(&self, events: &[EventRecord]) -> String {
        self.render(events, Utc::now())
    }

    /// Renders one VEVENT per event, stamped with `generated_at`.
    ///
    /// Events whose date cannot be parsed are left out.
    pub fn render(&self, events: &[EventRecord], generated_at: DateTime<Utc>) -> String {
        self.render_counted(events, generated_at).0
    }

    /// Like `render`, also returning how many events made it into the calendar.
    pub fn render_counted(
        &self,
        events: &[EventRecord],
        generated_at: DateTime<Utc>,
    ) -> (String, usize) {
        let stamp = format_timestamp(generated_at);
        let mut calendar = ICalendar::new("2.0", self.product_id.as_str());
        let mut exported = 0;

        for event in events {
            let Some(start) = event.starts_at() else {
                warn!(
                    "Skipping event {} ('{}'): unrecognized date '{}'",
                    event.id, event.title, event.date
                );
                continue;
            };
            let end = event_end(start, &event.duration);

            let mut vevent =
                ics::Event::new(format!("{}@{}", event.id, self.uid_domain), stamp.clone());
            vevent.push(DtStart::new(format_timestamp(start)));
            vevent.push(DtEnd::new(format_timestamp(end)));
            vevent.push(Summary::new(escape_text(event.title.as_str())));
            vevent.push(Description::new(escape_text(event.description.as_str())));
            vevent.push(Location::new(escape_text(event.location.as_str())));
            vevent.push(Categories::new(escape_text(event.category.as_str())));
            calendar.add_event(vevent);
            exported += 1;
        }

        debug!("Rendered {exported} of {} events as iCalendar", events.len());
        (calendar.to_string(), exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(date: &str, duration: &str) -> EventRecord {
        EventRecord {
            id: 4,
            title: "Workshop".into(),
            description: "Web3 Development Workshop; Building on Ethereum".into(),
            location: "Virtual Event".into(),
            date: date.into(),
            category: "Workshop".into(),
            duration: duration.into(),
            countdown: "in 7 days".into(),
            color: "#8f00ff".into(),
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 11, 8, 30, 0).unwrap()
    }

    #[test]
    fn writes_calendar_envelope_with_crlf() {
        let ics = CalendarExporter::default().render(&[], generated_at());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("PRODID:-//42 Abu Dhabi//Events Calendar//EN\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn writes_event_properties() {
        let ics = CalendarExporter::default().render(&[record("May 18, 2025", "3h")], generated_at());
        assert!(ics.contains("UID:4@42abudhabi.events\r\n"));
        assert!(ics.contains("DTSTAMP:20250511T083000Z\r\n"));
        assert!(ics.contains("DTSTART:20250518T000000Z\r\n"));
        assert!(ics.contains("DTEND:20250518T030000Z\r\n"));
        assert!(ics.contains("SUMMARY:Workshop\r\n"));
        assert!(ics.contains("DESCRIPTION:Web3 Development Workshop\\; Building on Ethereum\r\n"));
        assert!(ics.contains("LOCATION:Virtual Event\r\n"));
        assert!(ics.contains("CATEGORIES:Workshop\r\n"));
    }

    #[test]
    fn skips_events_with_unparseable_dates() {
        let events = [record("someday", "1h"), record("June 2, 2025", "6d")];
        let (ics, exported) =
            CalendarExporter::new("-//Test//EN", "example.org").render_counted(&events, generated_at());
        assert_eq!(exported, 1);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("DTEND:20250608T000000Z\r\n"));
    }
}
