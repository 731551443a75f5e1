use std::fmt;

use rand::Rng;

use super::{
    Dialect, IdAllocator, ImportError, ParsedCsv, Validation, parse_csv, resolve_import,
    validate_rows,
};
use crate::event::{Decorations, EventRecord, Field};

/// Parsed and validated CSV awaiting confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPreview {
    parsed: ParsedCsv,
    validation: Validation,
}

impl ImportPreview {
    pub fn new(text: &str, dialect: Dialect) -> Result<Self, ImportError> {
        let parsed = parse_csv(text, dialect)?;
        let validation = validate_rows(&parsed);
        Ok(Self { parsed, validation })
    }

    pub fn parsed(&self) -> &ParsedCsv {
        &self.parsed
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.validation.valid_count()
    }

    pub fn confirm<A: IdAllocator, R: Rng>(
        &self,
        ids: &mut A,
        decorations: &Decorations,
        rng: &mut R,
    ) -> Result<Vec<EventRecord>, ImportError> {
        resolve_import(&self.parsed, &self.validation, ids, decorations, rng)
    }
}

impl fmt::Display for ImportPreview {
    /// Tab separated status table followed by the error summary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parsed.is_empty() {
            return writeln!(f, "No data to preview");
        }

        let is_required = |header: &str| Field::from_header(header).is_some_and(Field::is_required);

        write!(f, "#\tStatus")?;
        for header in &self.parsed.headers {
            write!(f, "\t{header}{}", if is_required(header.as_str()) { "*" } else { "" })?;
        }
        writeln!(f)?;

        for (index, row) in self.parsed.rows.iter().enumerate() {
            let status = if self.validation.is_valid(index) { "Valid" } else { "Error" };
            write!(f, "{}\t{status}", index + 1)?;
            for header in &self.parsed.headers {
                let cell = match row.cell(header) {
                    "" if is_required(header.as_str()) => "Missing",
                    "" => "-",
                    value => value,
                };
                write!(f, "\t{cell}")?;
            }
            writeln!(f)?;
        }

        if self.validation.has_errors() {
            writeln!(
                f,
                "\nValidation errors found: {} of {} rows have errors. Fix the issues or proceed with only valid rows.",
                self.validation.invalid_count(),
                self.validation.total_rows()
            )?;
            for (index, issues) in self.validation.iter() {
                let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
                writeln!(f, "  row {}: {}", index + 1, messages.join("; "))?;
            }
        }

        writeln!(
            f,
            "\n{} of {} rows ready to import",
            self.validation.valid_count(),
            self.validation.total_rows()
        )
    }
}
