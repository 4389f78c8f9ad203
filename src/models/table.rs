//! Raw tables as they come off the page, before normalization.

/// A table lifted from markup.
///
/// `headers` holds one row per header level, each already expanded to the
/// table width through `colspan`/`rowspan`, outermost level first. `rows`
/// holds the body cells; short rows are not padded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns, taken from the widest header level or body row.
    pub fn width(&self) -> usize {
        self.headers
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// One label per column: the innermost non-empty header label.
    ///
    /// Columns without any header label are named by their position.
    pub fn flat_headers(&self) -> Vec<String> {
        (0..self.width())
            .map(|col| {
                self.headers
                    .iter()
                    .rev()
                    .filter_map(|level| level.get(col))
                    .find(|label| !label.is_empty())
                    .cloned()
                    .unwrap_or_else(|| col.to_string())
            })
            .collect()
    }
}

/// One body row keyed by flattened column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    /// Pair a body row with the flattened headers of its table.
    pub fn new(headers: &[String], row: &[String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        Self { cells }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }

    /// True for header rows repeated inside the body.
    pub fn repeats_header(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|(k, v)| k == v.trim())
    }
}
