//! Table normalization.
//!
//! Maps a raw, possibly multi-header table onto the canonical batting
//! schema: innermost header labels, alias resolution, numeric coercion, and
//! period fill-in for tables that do not carry their own year/month.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{
    Config, Diagnostic, Field, FieldKind, NormalizedRecord, RawRow, RawTable, Schema,
};

/// Placeholders the site uses for "no value".
const BLANK_MARKERS: [&str; 3] = ["-", "–", "—"];

/// Source column name to canonical field.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    map: HashMap<String, Field>,
}

impl ColumnAliases {
    /// Build from a name-to-canonical-header table; unknown targets are skipped.
    pub fn new(aliases: &BTreeMap<String, String>) -> Self {
        let map = aliases
            .iter()
            .filter_map(|(source, target)| {
                let field = Field::from_canonical(target);
                if field.is_none() {
                    log::warn!("Ignoring alias '{source}': unknown column '{target}'");
                }
                field.map(|f| (source.trim().to_string(), f))
            })
            .collect();
        Self { map }
    }

    /// Canonical field for a column name; canonical names resolve to themselves.
    pub fn resolve(&self, name: &str) -> Option<Field> {
        let name = name.trim();
        self.map
            .get(name)
            .copied()
            .or_else(|| Field::from_canonical(name))
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self::new(&Config::default().aliases)
    }
}

/// Where a table came from: the page number and the requested period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeContext {
    pub page: u32,
    pub year: i32,
    pub month: Option<u32>,
}

/// Records from one table plus what was learned while building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    pub records: Vec<NormalizedRecord>,
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
enum Column {
    Canonical(Field),
    Extra(String),
}

/// Outcome of coercing one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Coerced<T> {
    Blank,
    Value(T),
    Unparseable,
}

impl<T> Coerced<T> {
    fn value(self) -> Option<T> {
        match self {
            Coerced::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Converts raw tables into canonical records.
#[derive(Debug, Clone, Default)]
pub struct TableNormalizer {
    aliases: ColumnAliases,
}

impl TableNormalizer {
    pub fn new(aliases: ColumnAliases) -> Self {
        Self { aliases }
    }

    /// Normalize one table. Never fails: an empty table yields no records
    /// and an `EmptyTable` diagnostic, bad cells become missing values.
    pub fn normalize(&self, table: &RawTable, context: &NormalizeContext) -> NormalizedTable {
        let mut out = NormalizedTable::default();

        if table.is_empty() {
            out.diagnostics.push(Diagnostic::EmptyTable { page: context.page });
            return out;
        }

        let headers = table.flat_headers();
        let columns = self.resolve_columns(&headers);
        for column in &columns {
            match column {
                Column::Canonical(field) => {
                    out.schema.fields.insert(*field);
                }
                Column::Extra(name) => out.schema.insert_extra(name),
            }
        }

        let fill_year = !out.schema.fields.contains(&Field::Year);
        let fill_month = !out.schema.fields.contains(&Field::Month) && context.month.is_some();
        if fill_year {
            out.schema.fields.insert(Field::Year);
        }
        if fill_month {
            out.schema.fields.insert(Field::Month);
        }

        for (index, row) in table.rows.iter().enumerate() {
            let raw = RawRow::new(&headers, row);
            if raw.is_blank() || raw.repeats_header() {
                continue;
            }

            let mut record = NormalizedRecord::default();
            for ((_, value), column) in raw.cells.iter().zip(&columns) {
                match column {
                    Column::Extra(name) => {
                        record.extra.insert(name.clone(), value.trim().to_string());
                    }
                    Column::Canonical(field) => {
                        let unparseable = Self::apply(&mut record, *field, value);
                        if unparseable {
                            out.diagnostics.push(Diagnostic::UnparseableField {
                                page: context.page,
                                row: index + 1,
                                column: field.as_str().to_string(),
                                value: value.trim().to_string(),
                            });
                        }
                    }
                }
            }

            if fill_year {
                record.year = Some(context.year);
            }
            if fill_month {
                record.month = context.month;
            }
            out.records.push(record);
        }

        out
    }

    /// Map flattened headers to columns. A canonical field claimed by an
    /// earlier column is kept as an extra under its source name. Output names
    /// stay unique: a repeated name gets a `.1`, `.2`, ... suffix.
    fn resolve_columns(&self, headers: &[String]) -> Vec<Column> {
        let mut claimed = Vec::new();
        let mut taken = HashSet::new();
        headers
            .iter()
            .map(|name| match self.aliases.resolve(name) {
                Some(field) if !claimed.contains(&field) => {
                    claimed.push(field);
                    taken.insert(field.as_str().to_string());
                    Column::Canonical(field)
                }
                _ => Column::Extra(unique_name(name.trim(), &mut taken)),
            })
            .collect()
    }

    /// Store one cell on the record; returns true if it could not be coerced.
    fn apply(record: &mut NormalizedRecord, field: Field, value: &str) -> bool {
        match field.kind() {
            FieldKind::Text => {
                record.set_text(field, value.trim().to_string());
                false
            }
            FieldKind::Count => {
                let mut coerced = parse_count(value);
                if field == Field::Month
                    && matches!(coerced, Coerced::Value(m) if !(1..=12).contains(&m))
                {
                    coerced = Coerced::Unparseable;
                }
                record.set_count(field, coerced.value());
                coerced == Coerced::Unparseable
            }
            FieldKind::Rate => {
                let coerced = parse_rate(value);
                record.set_rate(field, coerced.value());
                coerced == Coerced::Unparseable
            }
        }
    }
}

/// `name`, or the first free `name.N` when it is already taken.
fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}.{n}"))
        .find(|candidate| taken.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}

fn is_blank(text: &str) -> bool {
    text.is_empty() || BLANK_MARKERS.contains(&text)
}

/// Integer count; thousands separators allowed, `"12.0"` accepted.
fn parse_count(raw: &str) -> Coerced<i64> {
    let text = raw.trim();
    if is_blank(text) {
        return Coerced::Blank;
    }
    let cleaned = text.replace(',', "");
    if let Ok(n) = cleaned.parse::<i64>() {
        return Coerced::Value(n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Coerced::Value(f as i64)
        }
        _ => Coerced::Unparseable,
    }
}

/// Rate value with `%` and `,` stripped; no rescaling.
fn parse_rate(raw: &str) -> Coerced<f64> {
    let text = raw.trim();
    if is_blank(text) {
        return Coerced::Blank;
    }
    let cleaned = text.replace(['%', ','], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Coerced::Blank;
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() => Coerced::Value(f),
        _ => Coerced::Unparseable,
    }
}
