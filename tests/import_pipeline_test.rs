use eventdesk::csv_import::{
    Dialect, IdCounter, ImportPreview, parse_csv, resolve_import, validate_rows,
};
use eventdesk::event::{Decorations, EventRecord, Field};
use eventdesk::export::render_csv;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use test_case::test_case;

const HEADER: &str = "title,description,location,date,category,duration";

fn import(text: &str) -> (eventdesk::csv_import::Validation, Vec<EventRecord>) {
    let parsed = parse_csv(text, Dialect::Simple).unwrap();
    let validation = validate_rows(&parsed);
    let mut ids = IdCounter::starting_at(1);
    let mut rng = StdRng::seed_from_u64(7);
    let records =
        resolve_import(&parsed, &validation, &mut ids, &Decorations::default(), &mut rng).unwrap();
    (validation, records)
}

#[test_case(1 ; "single row")]
#[test_case(3 ; "three rows")]
fn complete_rows_import_cleanly(rows: usize) {
    let mut text = HEADER.to_string();
    for i in 0..rows {
        text.push_str(&format!("\nEvent {i},Talk {i},Lab,July {} 2025,Talks,1h", i + 1));
    }

    let (validation, records) = import(&text);
    assert!(!validation.has_errors());
    assert_eq!(records.len(), rows);
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=rows as u64).collect::<Vec<_>>());
}

#[test]
fn missing_required_column_flags_every_row() {
    let (validation, records) = import(
        "title,description,date,category,duration\n\
         Meet up,AMA,May 14 2025,Meet up,1h\n\
         Workshop,Web3,May 18 2025,Workshop,3h",
    );

    assert_eq!(validation.invalid_count(), 2);
    for row in 0..2 {
        assert_eq!(validation.messages(row), vec!["Missing required column: location"]);
    }
    assert!(records.is_empty());
}

#[test]
fn single_empty_title_is_reported_and_skipped() {
    let (validation, records) = import(
        "title,description,location,date,category,duration\n\
         Meet up,AMA,Makerspace,May 14 2025,Meet up,1h\n\
         ,Web3,Virtual,May 18 2025,Workshop,3h\n\
         Conference,Tech Trends,ADNEC,June 10 2025,Conference,2d",
    );

    let flagged: Vec<usize> = validation.iter().map(|(row, _)| row).collect();
    assert_eq!(flagged, vec![1]);
    assert_eq!(validation.messages(1), vec!["Missing value for title"]);
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Meet up", "Conference"]);
}

#[test]
fn two_row_scenario() {
    let (validation, records) = import(
        "title,description,location,date,category,duration\n\
         Sample Event,Desc,Campus,June 15 2025,Workshop,2h\n\
         ,Missing title,Campus,June 16 2025,Workshop,1h",
    );

    assert!(validation.is_valid(0));
    assert_eq!(validation.messages(1), vec!["Missing value for title"]);
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.title, "Sample Event");
    assert_eq!(record.duration, "2h");
    assert!(Decorations::default().palette().contains(&record.color));
    assert!(record.countdown.starts_with("in ") && record.countdown.ends_with(" days"));
}

#[test]
fn supplied_countdown_is_kept() {
    let (_, records) = import(
        "title,description,location,date,category,duration,countdown\n\
         Sample Event,Desc,Campus,June 15 2025,Workshop,2h,in 30 days",
    );
    assert_eq!(records[0].countdown, "in 30 days");
}

#[test_case(Dialect::Simple ; "simple")]
#[test_case(Dialect::Rfc4180 ; "rfc4180")]
fn export_then_reimport_keeps_required_fields(dialect: Dialect) {
    let (_, records) = import(
        "title,description,location,date,category,duration\n\
         Meet up,AMA Session,Makerspace,May 14 2025,Meet up,1h\n\
         Piscine,Data Science,Berlin,June 2 2025,Piscine,6d",
    );

    let exported = render_csv(&records, dialect).unwrap();
    let reparsed = parse_csv(&exported, dialect).unwrap();
    assert!(reparsed.has_column(Field::Id));
    assert_eq!(reparsed.rows.len(), records.len());

    for (row, record) in reparsed.rows.iter().zip(&records) {
        for field in Field::REQUIRED {
            assert_eq!(row.value(field), record.field_value(field));
        }
        assert_eq!(row.value(Field::Countdown), record.countdown);
    }
}

#[test]
fn rfc4180_round_trip_survives_embedded_commas() {
    let preview = ImportPreview::new(
        "title,description,location,date,category,duration\n\
         Piscine,\"Data Science, Advanced\",\"42 Berlin, Germany\",\"June 2, 2025\",Piscine,6d",
        Dialect::Rfc4180,
    )
    .unwrap();
    let mut ids = IdCounter::starting_at(10);
    let mut rng = StdRng::seed_from_u64(1);
    let records = preview.confirm(&mut ids, &Decorations::default(), &mut rng).unwrap();

    let reparsed = parse_csv(&render_csv(&records, Dialect::Rfc4180).unwrap(), Dialect::Rfc4180)
        .unwrap();
    assert_eq!(reparsed.rows[0].value(Field::Location), "42 Berlin, Germany");
    assert_eq!(reparsed.rows[0].value(Field::Date), "June 2, 2025");
    assert_eq!(reparsed.rows[0].value(Field::Id), "10");
}
