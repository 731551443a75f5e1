//! Event records and the field vocabulary shared by the importer, the
//! exporters and the event store.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type EventId = u64;

/// Colours handed out to events that do not bring their own.
pub const COLOR_PALETTE: [&str; 5] = ["#00c2c7", "#1ed760", "#ff6b6b", "#8f00ff", "#ff2c2c"];

/// Upper bound (inclusive) of the synthesized "in N days" countdown.
pub const COUNTDOWN_MAX_DAYS: u32 = 30;

static LEADING_INTEGER: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^\s*([+-]?\d+)").unwrap());

/// Known event columns. Anything else found in a CSV header lands in the
/// row's unrecognized bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    Title,
    Description,
    Location,
    Date,
    Category,
    Duration,
    Countdown,
    Color,
}

impl Field {
    /// Fields a row must carry to be importable, in reporting order.
    pub const REQUIRED: [Field; 6] = [
        Field::Title,
        Field::Description,
        Field::Location,
        Field::Date,
        Field::Category,
        Field::Duration,
    ];

    /// Column order of the CSV export.
    pub const EXPORTED: [Field; 8] = [
        Field::Id,
        Field::Title,
        Field::Description,
        Field::Location,
        Field::Date,
        Field::Category,
        Field::Duration,
        Field::Countdown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Description => "description",
            Field::Location => "location",
            Field::Date => "date",
            Field::Category => "category",
            Field::Duration => "duration",
            Field::Countdown => "countdown",
            Field::Color => "color",
        }
    }

    /// Maps an already lower-cased header name onto a known field.
    pub fn from_header(header: &str) -> Option<Field> {
        match header {
            "id" => Some(Field::Id),
            "title" => Some(Field::Title),
            "description" => Some(Field::Description),
            "location" => Some(Field::Location),
            "date" => Some(Field::Date),
            "category" => Some(Field::Category),
            "duration" => Some(Field::Duration),
            "countdown" => Some(Field::Countdown),
            "color" => Some(Field::Color),
            _ => None,
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub category: String,
    pub duration: String,
    pub countdown: String,
    pub color: String,
}

impl EventRecord {
    /// Textual value of a field as it appears in exports.
    pub fn field_value(&self, field: Field) -> String {
        match field {
            Field::Id => self.id.to_string(),
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::Location => self.location.clone(),
            Field::Date => self.date.clone(),
            Field::Category => self.category.clone(),
            Field::Duration => self.duration.clone(),
            Field::Countdown => self.countdown.clone(),
            Field::Color => self.color.clone(),
        }
    }

    /// Start instant parsed from the display date, if it can be understood.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_event_date(&self.date)
    }
}

/// An event before it has been given an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date: String,
    pub category: String,
    pub duration: String,
    pub countdown: Option<String>,
    pub color: Option<String>,
}

impl EventDraft {
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::REQUIRED
            .into_iter()
            .filter(|field| self.required_value(*field).trim().is_empty())
            .collect()
    }

    fn required_value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Location => &self.location,
            Field::Date => &self.date,
            Field::Category => &self.category,
            Field::Duration => &self.duration,
            Field::Id | Field::Countdown | Field::Color => "",
        }
    }

    pub fn into_record<R: Rng>(
        self,
        id: EventId,
        decorations: &Decorations,
        rng: &mut R,
    ) -> EventRecord {
        let countdown = match self.countdown {
            Some(countdown) if !countdown.is_empty() => countdown,
            _ => decorations.countdown(rng),
        };
        let color = match self.color {
            Some(color) if !color.is_empty() => color,
            _ => decorations.color(rng),
        };

        EventRecord {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            date: self.date,
            category: self.category,
            duration: self.duration,
            countdown,
            color,
        }
    }
}

impl From<EventRecord> for EventDraft {
    fn from(record: EventRecord) -> Self {
        Self {
            title: record.title,
            description: record.description,
            location: record.location,
            date: record.date,
            category: record.category,
            duration: record.duration,
            countdown: Some(record.countdown),
            color: Some(record.color),
        }
    }
}

/// Cosmetic attributes synthesized for events that arrive without them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorations {
    palette: Vec<String>,
    countdown_max_days: u32,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            palette: COLOR_PALETTE.iter().map(|c| c.to_string()).collect(),
            countdown_max_days: COUNTDOWN_MAX_DAYS,
        }
    }
}

impl Decorations {
    pub fn new(palette: Vec<String>, countdown_max_days: u32) -> Self {
        let defaults = Self::default();
        Self {
            palette: if palette.is_empty() { defaults.palette } else { palette },
            countdown_max_days: countdown_max_days.max(1),
        }
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn countdown<R: Rng>(&self, rng: &mut R) -> String {
        format!("in {} days", rng.random_range(1..=self.countdown_max_days))
    }

    pub fn color<R: Rng>(&self, rng: &mut R) -> String {
        self.palette
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| COLOR_PALETTE[0].to_string())
    }

    pub fn default_color(&self) -> &str {
        self.palette.first().map(String::as_str).unwrap_or(COLOR_PALETTE[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
}

/// A duration token such as `2h`, `3d` or `30m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDuration {
    pub amount: i64,
    pub unit: DurationUnit,
}

impl EventDuration {
    /// The unit is looked up by `h`, then `d`, then `m` anywhere in the token;
    /// the amount is its leading integer.
    pub fn parse(token: &str) -> Option<Self> {
        let unit = if token.contains('h') {
            DurationUnit::Hours
        } else if token.contains('d') {
            DurationUnit::Days
        } else if token.contains('m') {
            DurationUnit::Minutes
        } else {
            return None;
        };

        let amount = LEADING_INTEGER.captures(token)?.get(1)?.as_str().parse().ok()?;
        Some(Self { amount, unit })
    }

    pub fn to_chrono(self) -> Option<Duration> {
        match self.unit {
            DurationUnit::Minutes => Duration::try_minutes(self.amount),
            DurationUnit::Hours => Duration::try_hours(self.amount),
            DurationUnit::Days => Duration::try_days(self.amount),
        }
    }
}

/// End of an event starting at `start`. Falls back to `start` when the
/// duration token has no recognized unit.
pub fn event_end(start: DateTime<Utc>, duration: &str) -> DateTime<Utc> {
    EventDuration::parse(duration)
        .and_then(EventDuration::to_chrono)
        .and_then(|span| start.checked_add_signed(span))
        .unwrap_or(start)
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%Y-%m-%d"];

/// Parses the display date of an event. Dates without a time of day are
/// taken as midnight UTC.
pub fn parse_event_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Some(datetime.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_case::test_case;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    #[test_case("June 15, 2025", at(2025, 6, 15, 0, 0) ; "long month with comma")]
    #[test_case("June 15 2025", at(2025, 6, 15, 0, 0) ; "long month without comma")]
    #[test_case("Jun 2, 2025", at(2025, 6, 2, 0, 0) ; "abbreviated month")]
    #[test_case("2025-05-14", at(2025, 5, 14, 0, 0) ; "iso date")]
    #[test_case("2025-05-14 14:30", at(2025, 5, 14, 14, 30) ; "iso date and time")]
    #[test_case("May 18, 2025 3:00 PM", at(2025, 5, 18, 15, 0) ; "twelve hour clock")]
    #[test_case("2025-05-14T09:00:00+02:00", at(2025, 5, 14, 7, 0) ; "rfc3339 with offset")]
    fn parses_event_dates(input: &str, expected: DateTime<Utc>) {
        assert_eq!(parse_event_date(input), Some(expected));
    }

    #[test]
    fn rejects_unknown_dates() {
        assert_eq!(parse_event_date("next tuesday"), None);
        assert_eq!(parse_event_date(""), None);
    }

    #[test_case("2h", 2, DurationUnit::Hours)]
    #[test_case("24h", 24, DurationUnit::Hours)]
    #[test_case("3d", 3, DurationUnit::Days)]
    #[test_case("30m", 30, DurationUnit::Minutes)]
    #[test_case(" 1h30m", 1, DurationUnit::Hours ; "hours take precedence")]
    fn parses_durations(token: &str, amount: i64, unit: DurationUnit) {
        assert_eq!(EventDuration::parse(token), Some(EventDuration { amount, unit }));
    }

    #[test]
    fn unrecognized_duration_keeps_end_at_start() {
        let start = at(2025, 6, 15, 0, 0);
        assert_eq!(event_end(start, "xyz"), start);
        assert_eq!(event_end(start, "h"), start);
        assert_eq!(event_end(start, ""), start);
    }

    #[test]
    fn duration_extends_start() {
        let start = at(2025, 6, 15, 0, 0);
        assert_eq!(event_end(start, "2h"), at(2025, 6, 15, 2, 0));
        assert_eq!(event_end(start, "3d"), at(2025, 6, 18, 0, 0));
        assert_eq!(event_end(start, "45m"), at(2025, 6, 15, 0, 45));
    }

    #[test]
    fn draft_reports_blank_required_fields() {
        let draft = EventDraft {
            title: "Hackathon".into(),
            description: "  ".into(),
            location: "Campus".into(),
            date: "May 27, 2025".into(),
            category: String::new(),
            duration: "24h".into(),
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec![Field::Description, Field::Category]);
    }

    #[test]
    fn synthesized_decorations_stay_in_range() {
        let decorations = Decorations::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let countdown = decorations.countdown(&mut rng);
            let days: u32 = countdown
                .trim_start_matches("in ")
                .trim_end_matches(" days")
                .parse()
                .unwrap();
            assert!((1..=COUNTDOWN_MAX_DAYS).contains(&days));
            assert!(COLOR_PALETTE.contains(&decorations.color(&mut rng).as_str()));
        }
    }

    #[test]
    fn draft_keeps_supplied_countdown() {
        let draft = EventDraft {
            title: "Workshop".into(),
            countdown: Some("in 7 days".into()),
            color: Some("#00eaff".into()),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let record = draft.into_record(9, &Decorations::default(), &mut rng);
        assert_eq!(record.id, 9);
        assert_eq!(record.countdown, "in 7 days");
        assert_eq!(record.color, "#00eaff");
    }
}
