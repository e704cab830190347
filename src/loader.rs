use crate::error::{LoadError, RowError};
use crate::types::ActivityRecord;
use crate::util::{parse_amount, parse_date};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 4] = ["date", "department", "category", "amount"];

/// Header names are lowercased before deserializing, so these match
/// `Date`, `DATE` and `date` alike.
#[derive(Debug, Deserialize)]
struct RawRow {
    date: Option<String>,
    department: Option<String>,
    category: Option<String>,
    unit: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: RowError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<(Vec<ActivityRecord>, LoadReport), LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "read dataset");
    parse_records(&text)
}

/// Parse CSV text into activity records.
///
/// Blank lines and `#` comments are skipped. Rows with a bad date or amount
/// are dropped and recorded in the report; only a broken header fails the
/// whole import. Output keeps input order.
pub fn parse_records(text: &str) -> Result<(Vec<ActivityRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let headers: StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.iter().all(str::is_empty) {
        return Ok((Vec::new(), LoadReport::default()));
    }
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col));
        }
    }

    let mut records = Vec::new();
    let mut report = LoadReport::default();
    for result in rdr.records() {
        let (line, row) = match result {
            Ok(rec) if is_blank_or_comment(&rec) => continue,
            Ok(rec) => {
                report.total_rows += 1;
                let line = rec.position().map(|p| p.line()).unwrap_or(0);
                (line, rec.deserialize::<RawRow>(Some(&headers)))
            }
            Err(e) => {
                report.total_rows += 1;
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                skip(&mut report, line, RowError::Unreadable(e.to_string()));
                continue;
            }
        };
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                skip(&mut report, line, RowError::Unreadable(e.to_string()));
                continue;
            }
        };
        match clean_row(row) {
            Ok(rec) => records.push(rec),
            Err(reason) => skip(&mut report, line, reason),
        }
    }

    report.loaded_rows = records.len();
    info!(
        total = report.total_rows,
        loaded = report.loaded_rows,
        skipped = report.skipped_rows(),
        "parsed activity records"
    );
    Ok((records, report))
}

/// The csv reader only recognizes `#` in the first column and blank lines
/// with no characters at all; whitespace-only and indented comment lines
/// reach us as records once fields are trimmed.
fn is_blank_or_comment(rec: &StringRecord) -> bool {
    rec.iter().all(str::is_empty) || rec.get(0).is_some_and(|f| f.starts_with('#'))
}

fn skip(report: &mut LoadReport, line: u64, reason: RowError) {
    debug!(line, %reason, "dropping row");
    report.skipped.push(SkippedRow { line, reason });
}

fn clean_row(row: RawRow) -> Result<ActivityRecord, RowError> {
    let date = parse_date(row.date.as_deref().unwrap_or(""))?;
    let amount = parse_amount(row.amount.as_deref().unwrap_or(""))?;
    let department = row
        .department
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let category = row
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "uncategorized".to_string());
    Ok(ActivityRecord::new(
        date,
        &department,
        &category,
        row.unit.as_deref(),
        amount,
    ))
}
