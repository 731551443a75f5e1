use std::collections::BTreeMap;
use std::fmt;

use super::ParsedCsv;
use crate::event::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIssue {
    /// The header line lacks the column; reported on every row.
    MissingColumn(Field),
    MissingValue(Field),
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::MissingColumn(field) => write!(f, "Missing required column: {field}"),
            RowIssue::MissingValue(field) => write!(f, "Missing value for {field}"),
        }
    }
}

/// Sparse row index -> issues mapping. Rows without issues are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    issues: BTreeMap<usize, Vec<RowIssue>>,
    total_rows: usize,
}

impl Validation {
    pub fn is_valid(&self, row: usize) -> bool {
        !self.issues.contains_key(&row)
    }

    pub fn issues(&self, row: usize) -> Option<&[RowIssue]> {
        self.issues.get(&row).map(Vec::as_slice)
    }

    pub fn messages(&self, row: usize) -> Vec<String> {
        self.issues(row)
            .map(|issues| issues.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[RowIssue])> {
        self.issues.iter().map(|(row, issues)| (*row, issues.as_slice()))
    }

    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.issues.len()
    }

    pub fn valid_count(&self) -> usize {
        self.total_rows - self.issues.len()
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }
}

/// Checks every row for the required fields.
pub fn validate_rows(parsed: &ParsedCsv) -> Validation {
    let mut issues = BTreeMap::new();

    for (index, row) in parsed.rows.iter().enumerate() {
        let row_issues: Vec<RowIssue> = Field::REQUIRED
            .into_iter()
            .filter_map(|field| {
                if !parsed.has_column(field) {
                    Some(RowIssue::MissingColumn(field))
                } else if !row.has_value(field) {
                    Some(RowIssue::MissingValue(field))
                } else {
                    None
                }
            })
            .collect();

        if !row_issues.is_empty() {
            issues.insert(index, row_issues);
        }
    }

    Validation { issues, total_rows: parsed.rows.len() }
}
