use crate::analytics::Cue;
use crate::pipeline::Dataset;
use crate::reports;
use crate::types::MonthKey;
use crate::util::{format_number, format_pct};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 40;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every report for `ds` into `dir`, creating it if needed. Returns
/// the written paths in report order; the first failure stops the export.
pub fn export_reports(ds: &Dataset, dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("cannot create {}: {}", dir.display(), e))?;
    let files = [
        dir.join("categories.csv"),
        dir.join("departments.csv"),
        dir.join("monthly.csv"),
        dir.join("summary.json"),
    ];
    write_csv(&files[0], &reports::category_report(&ds.cues))?;
    write_csv(&files[1], &reports::department_report(ds))?;
    write_csv(&files[2], &reports::monthly_report(ds))?;
    write_json(&files[3], &reports::generate_summary(ds))?;
    Ok(files.to_vec())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", render_table(rows, max_rows));
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)\n".to_string();
    }
    format!("{}\n", Table::new(slice).with(Style::markdown()))
}

/// Horizontal bars scaled to the largest value.
pub fn render_bars(items: &[(String, f64)]) -> String {
    let label_width = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = items.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let mut out = String::new();
    for (label, value) in items {
        let len = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<width$} | {:<bar$} {}\n",
            label,
            "█".repeat(len),
            format_number(*value),
            width = label_width,
            bar = BAR_WIDTH,
        ));
    }
    out
}

pub fn render_category_bars(cues: &[Cue]) -> String {
    let items: Vec<(String, f64)> = cues
        .iter()
        .map(|c| (c.category.clone(), c.emission))
        .collect();
    render_bars(&items)
}

/// Month-by-month trend, one row per bucket in chronological order, with the
/// change from the previous month.
pub fn render_trend(by_month: &BTreeMap<MonthKey, f64>) -> String {
    let items: Vec<(String, f64)> = by_month.iter().map(|(k, v)| (k.label(), *v)).collect();
    let bars = render_bars(&items);
    let mut out = String::new();
    let mut prev: Option<f64> = None;
    for (line, (_, value)) in bars.lines().zip(items.iter()) {
        let delta = match prev {
            Some(p) if p > 0.0 => format!(" ({:+.1}%)", (value - p) / p * 100.0),
            _ => String::new(),
        };
        out.push_str(line);
        out.push_str(&delta);
        out.push('\n');
        prev = Some(*value);
    }
    out
}

/// Summary "cards": total, top category with share, tree equivalent.
pub fn render_cards(total: f64, top: Option<&Cue>, trees: f64, phone_charges: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total emissions : {} kg CO2e\n", format_number(total)));
    match top {
        Some(c) => out.push_str(&format!(
            "Top category    : {} ({})\n",
            c.category,
            format_pct(c.share_pct)
        )),
        None => out.push_str("Top category    : -\n"),
    }
    out.push_str(&format!(
        "Trees to offset : {} (one year of absorption)\n",
        format_number(trees)
    ));
    out.push_str(&format!(
        "Phone charges   : {}\n",
        format_number(phone_charges)
    ));
    out
}
