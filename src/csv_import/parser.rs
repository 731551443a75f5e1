use std::collections::BTreeMap;

use log::debug;

use super::{Dialect, ImportError};
use crate::event::Field;

/// One data line keyed by column. Known columns are typed, anything else is
/// kept under its lower-cased header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    known: BTreeMap<Field, String>,
    unrecognized: BTreeMap<String, String>,
}

impl RawRow {
    /// Later duplicates of a header overwrite earlier ones.
    pub fn insert(&mut self, header: &str, value: impl Into<String>) {
        match Field::from_header(header) {
            Some(field) => {
                self.known.insert(field, value.into());
            }
            None => {
                self.unrecognized.insert(header.to_string(), value.into());
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.known.get(&field).map(String::as_str)
    }

    /// Value of a field, empty when the column is absent.
    pub fn value(&self, field: Field) -> &str {
        self.get(field).unwrap_or("")
    }

    pub fn has_value(&self, field: Field) -> bool {
        !self.value(field).is_empty()
    }

    /// Cell lookup by header name, for callers that display rows in header order.
    pub fn cell(&self, header: &str) -> &str {
        match Field::from_header(header) {
            Some(field) => self.value(field),
            None => self.unrecognized.get(header).map(String::as_str).unwrap_or(""),
        }
    }

    pub fn unrecognized(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unrecognized.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    /// Lower-cased header names in file order.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedCsv {
    /// Zero rows means there is nothing to import.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.headers.iter().any(|h| h == field.name())
    }
}

/// Parses CSV text whose first line holds the column names.
///
/// Empty or whitespace-only input yields an empty result rather than an error.
pub fn parse_csv(text: &str, dialect: Dialect) -> Result<ParsedCsv, ImportError> {
    let text = text.trim();
    if text.is_empty() {
        debug!("CSV input is empty, nothing to parse");
        return Ok(ParsedCsv::default());
    }

    let parsed = match dialect {
        Dialect::Simple => parse_simple(text),
        Dialect::Rfc4180 => parse_quoted(text)?,
    };

    debug!(
        "Parsed {} CSV rows with headers {:?} ({:?} dialect)",
        parsed.rows.len(),
        parsed.headers,
        dialect
    );
    Ok(parsed)
}

fn parse_simple(text: &str) -> ParsedCsv {
    let mut lines = text.split('\n');
    let Some(header_line) = lines.next() else {
        return ParsedCsv::default();
    };

    let headers = normalize_headers(header_line.split(','));
    let rows = lines.map(|line| build_row(&headers, line.split(','))).collect();

    ParsedCsv { headers, rows }
}

fn parse_quoted(text: &str) -> Result<ParsedCsv, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let Some(header_record) = records.next().transpose()? else {
        return Ok(ParsedCsv::default());
    };

    let headers = normalize_headers(header_record.iter());
    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        rows.push(build_row(&headers, record.iter()));
    }

    Ok(ParsedCsv { headers, rows })
}

fn normalize_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names.map(|name| name.trim().to_lowercase()).collect()
}

fn build_row<'a>(headers: &[String], values: impl Iterator<Item = &'a str>) -> RawRow {
    let values: Vec<&str> = values.collect();
    let mut row = RawRow::default();
    for (index, header) in headers.iter().enumerate() {
        row.insert(header, values.get(index).map(|v| v.trim()).unwrap_or(""));
    }
    row
}
