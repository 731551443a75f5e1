use std::io::BufReader;

use chrono::{TimeZone, Utc};
use eventdesk::event::EventRecord;
use eventdesk::export::CalendarExporter;
use eventdesk::store::sample_events;
use ical::IcalParser;
use ical::parser::ical::component::IcalEvent;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn record(duration: &str) -> EventRecord {
    EventRecord {
        id: 7,
        title: "Hackathon".into(),
        description: "AI Hackathon: AI for Safe and Sustainable Energy".into(),
        location: "42AD Campus".into(),
        date: "May 27, 2025".into(),
        category: "Hackathon".into(),
        duration: duration.into(),
        countdown: "in 16 days".into(),
        color: "#1ed760".into(),
    }
}

fn parse_events(ics: &str) -> Vec<IcalEvent> {
    IcalParser::new(BufReader::new(ics.as_bytes()))
        .flat_map(|calendar| calendar.expect("calendar should parse").events)
        .collect()
}

fn property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a str> {
    event
        .properties
        .iter()
        .find(|property| property.name == name)
        .and_then(|property| property.value.as_deref())
}

#[test_case("2h", "20250527T020000Z" ; "hours")]
#[test_case("3d", "20250530T000000Z" ; "days")]
#[test_case("90m", "20250527T013000Z" ; "minutes")]
#[test_case("xyz", "20250527T000000Z" ; "unrecognized duration")]
fn end_follows_duration(duration: &str, expected_end: &str) {
    let generated_at = Utc.with_ymd_and_hms(2025, 5, 11, 9, 0, 0).unwrap();
    let ics = CalendarExporter::default().render(&[record(duration)], generated_at);

    let events = parse_events(&ics);
    assert_eq!(events.len(), 1);
    assert_eq!(property(&events[0], "DTSTART"), Some("20250527T000000Z"));
    assert_eq!(property(&events[0], "DTEND"), Some(expected_end));
}

#[test]
fn sample_catalogue_exports_every_event() {
    let events = sample_events();
    let ics = CalendarExporter::default().render_now(&events);
    let parsed = parse_events(&ics);

    assert_eq!(parsed.len(), events.len());
    for (vevent, event) in parsed.iter().zip(&events) {
        let uid = format!("{}@42abudhabi.events", event.id);
        assert_eq!(property(vevent, "UID"), Some(uid.as_str()));
        assert_eq!(property(vevent, "SUMMARY"), Some(event.title.as_str()));
        assert_eq!(property(vevent, "CATEGORIES"), Some(event.category.as_str()));
        assert!(property(vevent, "DTSTAMP").is_some());
    }
}
