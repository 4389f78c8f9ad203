//! Non-fatal conditions met during a crawl.

use std::fmt;

/// A warning that degrades output without aborting the crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The response held no `<table>` at all.
    MissingTable { page: u32 },
    /// The selected table had no body rows.
    EmptyTable { page: u32 },
    /// A numeric cell could not be coerced; the field was left missing.
    UnparseableField {
        page: u32,
        row: usize,
        column: String,
        value: String,
    },
    /// No pager controls on the first page; crawled as a single page.
    PagerNotFound,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingTable { page } => write!(f, "page {page}: no table found"),
            Diagnostic::EmptyTable { page } => write!(f, "page {page}: table has no rows"),
            Diagnostic::UnparseableField {
                page,
                row,
                column,
                value,
            } => write!(
                f,
                "page {page}, row {row}: cannot parse {column} value '{value}'"
            ),
            Diagnostic::PagerNotFound => {
                write!(f, "no pager controls found, treating source as a single page")
            }
        }
    }
}
