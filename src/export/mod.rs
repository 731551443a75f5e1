//! CSV and iCalendar renderings of the event collection.

mod calendar;
mod delimited;

pub use calendar::{
    CALENDAR_MIME, CalendarExporter, DEFAULT_CALENDAR_FILENAME, DEFAULT_PRODUCT_ID,
    DEFAULT_UID_DOMAIN, format_timestamp,
};
pub use delimited::{CSV_MIME, DEFAULT_CSV_FILENAME, render_csv};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV writer error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Export produced invalid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
