//! Canonical batting record and its column vocabulary.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// How a canonical column is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Integer counts; thousands separators are tolerated.
    Count,
    /// Averages and percentages; `%` and `,` are stripped before parsing.
    Rate,
}

/// A canonical column. Declaration order is the export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Player,
    Team,
    Year,
    Month,
    Games,
    AtBats,
    Hits,
    Avg,
    HomeRuns,
    Walks,
    Strikeouts,
    Obp,
    Slg,
    Ops,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Player,
        Field::Team,
        Field::Year,
        Field::Month,
        Field::Games,
        Field::AtBats,
        Field::Hits,
        Field::Avg,
        Field::HomeRuns,
        Field::Walks,
        Field::Strikeouts,
        Field::Obp,
        Field::Slg,
        Field::Ops,
    ];

    /// Canonical column header.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Player => "player",
            Field::Team => "team",
            Field::Year => "year",
            Field::Month => "month",
            Field::Games => "G",
            Field::AtBats => "AB",
            Field::Hits => "H",
            Field::Avg => "AVG",
            Field::HomeRuns => "HR",
            Field::Walks => "BB",
            Field::Strikeouts => "SO",
            Field::Obp => "OBP",
            Field::Slg => "SLG",
            Field::Ops => "OPS",
        }
    }

    /// Look up a field by its exact canonical header.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Player | Field::Team => FieldKind::Text,
            Field::Avg | Field::Obp | Field::Slg | Field::Ops => FieldKind::Rate,
            _ => FieldKind::Count,
        }
    }
}

/// One normalized batting line.
///
/// `None` means the value was absent from the source or could not be
/// coerced. Columns the alias table does not know are kept verbatim in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub player: String,
    pub team: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(rename = "G")]
    pub games: Option<i64>,
    #[serde(rename = "AB")]
    pub at_bats: Option<i64>,
    #[serde(rename = "H")]
    pub hits: Option<i64>,
    #[serde(rename = "AVG")]
    pub avg: Option<f64>,
    #[serde(rename = "HR")]
    pub home_runs: Option<i64>,
    #[serde(rename = "BB")]
    pub walks: Option<i64>,
    #[serde(rename = "SO")]
    pub strikeouts: Option<i64>,
    #[serde(rename = "OBP")]
    pub obp: Option<f64>,
    #[serde(rename = "SLG")]
    pub slg: Option<f64>,
    #[serde(rename = "OPS")]
    pub ops: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl NormalizedRecord {
    pub(crate) fn set_text(&mut self, field: Field, value: String) {
        match field {
            Field::Player => self.player = value,
            Field::Team => self.team = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }

    pub(crate) fn set_count(&mut self, field: Field, value: Option<i64>) {
        match field {
            Field::Year => self.year = value.and_then(|v| i32::try_from(v).ok()),
            Field::Month => self.month = value.and_then(|v| u32::try_from(v).ok()),
            Field::Games => self.games = value,
            Field::AtBats => self.at_bats = value,
            Field::Hits => self.hits = value,
            Field::HomeRuns => self.home_runs = value,
            Field::Walks => self.walks = value,
            Field::Strikeouts => self.strikeouts = value,
            _ => {}
        }
    }

    pub(crate) fn set_rate(&mut self, field: Field, value: Option<f64>) {
        match field {
            Field::Avg => self.avg = value,
            Field::Obp => self.obp = value,
            Field::Slg => self.slg = value,
            Field::Ops => self.ops = value,
            _ => {}
        }
    }

    /// Render a canonical field as an export cell; missing values are empty.
    pub fn cell(&self, field: Field) -> String {
        fn opt<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        match field {
            Field::Player => self.player.clone(),
            Field::Team => self.team.clone().unwrap_or_default(),
            Field::Year => opt(self.year),
            Field::Month => opt(self.month),
            Field::Games => opt(self.games),
            Field::AtBats => opt(self.at_bats),
            Field::Hits => opt(self.hits),
            Field::Avg => opt(self.avg),
            Field::HomeRuns => opt(self.home_runs),
            Field::Walks => opt(self.walks),
            Field::Strikeouts => opt(self.strikeouts),
            Field::Obp => opt(self.obp),
            Field::Slg => opt(self.slg),
            Field::Ops => opt(self.ops),
        }
    }
}

/// Columns actually present across the crawled pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: BTreeSet<Field>,
    /// Unmapped column names, first-seen order
    pub extras: Vec<String>,
}

impl Schema {
    pub fn insert_extra(&mut self, name: &str) {
        if !self.extras.iter().any(|e| e == name) {
            self.extras.push(name.to_string());
        }
    }

    pub fn merge(&mut self, other: &Schema) {
        self.fields.extend(other.fields.iter().copied());
        for extra in &other.extras {
            self.insert_extra(extra);
        }
    }

    /// Export headers: canonical fields in canonical order, then extras.
    pub fn headers(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.as_str().to_string())
            .chain(self.extras.iter().cloned())
            .collect()
    }
}

/// The period a crawl is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlParams {
    pub year: i32,
    /// Requested month for monthly pages
    pub month: Option<u32>,
    /// Caller-supplied page count; overrides pager inspection
    pub max_pages: Option<u32>,
}

impl CrawlParams {
    pub fn season(year: i32) -> Self {
        Self {
            year,
            month: None,
            max_pages: None,
        }
    }
}
