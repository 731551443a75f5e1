//! CSV import pipeline: parse text into rows, validate required fields,
//! then resolve the valid rows into event records.

mod parser;
mod preview;
mod resolver;
mod validation;

pub use parser::{ParsedCsv, RawRow, parse_csv};
pub use preview::ImportPreview;
pub use resolver::{IdAllocator, IdCounter, resolve_import};
pub use validation::{RowIssue, Validation, validate_rows};

use crate::event::Field;
use serde::{Deserialize, Serialize};

/// Header and sample row offered as a starting point for new imports.
pub const TEMPLATE_CSV: &str = "title,description,location,date,category,duration,countdown\n\
Sample Event,This is a sample event description,42 Abu Dhabi Campus,June 15 2025,Workshop,2h,in 30 days";

pub const TEMPLATE_FILENAME: &str = "events_template.csv";

/// Flavour of comma separated text understood on import and produced on export.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain comma splitting without quoting. A comma inside a value splits it.
    #[default]
    Simple,
    /// Quoting-aware grammar; values are quoted on export only when needed.
    Rfc4180,
}

impl Dialect {
    pub(crate) fn quote_style(self) -> csv::QuoteStyle {
        match self {
            Dialect::Simple => csv::QuoteStyle::Never,
            Dialect::Rfc4180 => csv::QuoteStyle::Necessary,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row {row} has no value for required field '{field}'")]
    MissingField { row: usize, field: Field },
}
