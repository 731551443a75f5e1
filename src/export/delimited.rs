use log::debug;

use super::ExportError;
use crate::csv_import::Dialect;
use crate::event::{EventRecord, Field};

pub const CSV_MIME: &str = "text/csv";
pub const DEFAULT_CSV_FILENAME: &str = "events.csv";

/// Renders the collection as CSV in the fixed export column order.
///
/// The simple dialect joins values verbatim, so a value containing a comma
/// will not survive a re-import; rfc4180 quotes such values. Only a failing
/// writer can produce an error, and the in-memory buffer used here does not.
pub fn render_csv(events: &[EventRecord], dialect: Dialect) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(dialect.quote_style())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(Field::EXPORTED.iter().map(|field| field.name()))?;
    for event in events {
        writer.write_record(Field::EXPORTED.iter().map(|field| event.field_value(*field)))?;
    }

    let bytes = writer.into_inner().map_err(|err| ExportError::Io(err.into_error()))?;
    let mut text = String::from_utf8(bytes)?;
    // no trailing line break after the last record
    if text.ends_with('\n') {
        text.pop();
    }

    debug!("Rendered {} events as CSV", events.len());
    Ok(text)
}
