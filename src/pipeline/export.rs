// src/pipeline/export.rs

//! Writing crawl results to disk.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::models::{CrawlResult, NormalizedRecord, Schema};

/// Byte-order mark so spreadsheet tools pick UTF-8 for Hangul headers.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}' (expected csv or json)")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Write `result` to `path`, creating parent directories as needed.
///
/// Returns the number of records written.
pub fn write_result(result: &CrawlResult, path: &Path, format: ExportFormat) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_csv(&mut writer, &result.records, &result.schema)?,
        ExportFormat::Json => write_json(&mut writer, &result.records)?,
    }
    writer.flush()?;

    Ok(result.records.len())
}

/// CSV with a BOM, one column per schema entry; missing values are empty.
pub fn write_csv<W: Write>(
    mut writer: W,
    records: &[NormalizedRecord],
    schema: &Schema,
) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(schema.headers())?;

    for record in records {
        let row = schema
            .fields
            .iter()
            .map(|&field| record.cell(field))
            .chain(
                schema
                    .extras
                    .iter()
                    .map(|name| record.extra.get(name).cloned().unwrap_or_default()),
            );
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON array of records.
pub fn write_json<W: Write>(writer: W, records: &[NormalizedRecord]) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::models::Field;

    fn record(player: &str, team: &str, avg: Option<f64>, hits: Option<i64>) -> NormalizedRecord {
        NormalizedRecord {
            player: player.into(),
            team: Some(team.into()),
            year: Some(2024),
            avg,
            hits,
            ..Default::default()
        }
    }

    fn schema(fields: &[Field], extras: &[&str]) -> Schema {
        Schema {
            fields: fields.iter().copied().collect::<BTreeSet<_>>(),
            extras: extras.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn result(records: Vec<NormalizedRecord>, schema: Schema) -> CrawlResult {
        CrawlResult {
            records,
            schema,
            diagnostics: Vec::new(),
            total_pages: 1,
            pages_visited: 1,
            cancelled: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_csv_has_bom_and_only_present_columns() {
        let records = vec![
            record("김도영", "KIA", Some(0.347), Some(189)),
            record("최정", "SSG", None, Some(126)),
        ];
        // Inserted out of order; output follows canonical order.
        let schema = schema(&[Field::Avg, Field::Player, Field::Hits, Field::Team, Field::Year], &[]);

        let mut out = Vec::new();
        write_csv(&mut out, &records, &schema).unwrap();

        assert!(out.starts_with(UTF8_BOM));
        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "player,team,year,H,AVG");
        assert_eq!(lines[1], "김도영,KIA,2024,189,0.347");
        assert_eq!(lines[2], "최정,SSG,2024,126,");
    }

    #[test]
    fn test_csv_extra_columns_follow_canonical() {
        let mut first = record("오스틴", "LG", Some(0.319), None);
        first.extra.insert("순위".into(), "7".into());
        let second = record("로하스", "KT", Some(0.329), None);

        let mut out = Vec::new();
        write_csv(&mut out, &[first, second], &schema(&[Field::Player, Field::Avg], &["순위"])).unwrap();

        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "player,AVG,순위");
        assert_eq!(lines[1], "오스틴,0.319,7");
        assert_eq!(lines[2], "로하스,0.329,");
    }

    #[test]
    fn test_write_result_json_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out/2024/batting.json");
        let result = result(
            vec![record("구자욱", "삼성", Some(0.343), Some(169))],
            schema(&[Field::Player], &[]),
        );

        let written = write_result(&result, &path, ExportFormat::Json).unwrap();
        assert_eq!(written, 1);

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[0]["player"], "구자욱");
        assert_eq!(parsed[0]["AVG"], 0.343);
        assert_eq!(parsed[0]["HR"], serde_json::Value::Null);
    }

    #[test]
    fn test_write_result_csv_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batting_monthly.csv");
        let result = result(
            vec![record("양의지", "두산", Some(0.314), None)],
            schema(&[Field::Player, Field::Team], &[]),
        );

        write_result(&result, &path, ExportFormat::Csv).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "player,team\n양의지,두산\n");
    }

    #[test]
    fn test_format_parsing_and_inference() {
        assert_eq!("JSON".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("xlsx".parse::<ExportFormat>().is_err());

        assert_eq!(ExportFormat::from_path(Path::new("a/b.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("batting_monthly.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), ExportFormat::Csv);
    }
}
