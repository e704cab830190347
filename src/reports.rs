use crate::analytics::{equivalences, Cue};
use crate::pipeline::Dataset;
use crate::types::{CalculationEntry, CategoryRow, DepartmentRow, HistoryRow, MonthRow, SummaryStats};
use crate::util::{format_grouped, format_pct};
use chrono::DateTime;

/// Category table, in cue order (largest emitter first).
pub fn category_report(cues: &[Cue]) -> Vec<CategoryRow> {
    cues.iter()
        .map(|c| CategoryRow {
            category: c.category.clone(),
            emission: format_grouped(c.emission, 2),
            share_pct: format_pct(c.share_pct),
            advice: c.advice.to_string(),
        })
        .collect()
}

pub fn department_report(ds: &Dataset) -> Vec<DepartmentRow> {
    ds.aggregates
        .departments_ranked()
        .into_iter()
        .enumerate()
        .map(|(idx, (name, t))| DepartmentRow {
            rank: idx + 1,
            department: name.to_string(),
            records: t.records,
            emission: format_grouped(t.emission, 2),
        })
        .collect()
}

pub fn monthly_report(ds: &Dataset) -> Vec<MonthRow> {
    ds.aggregates
        .by_month
        .iter()
        .map(|(k, v)| MonthRow {
            month: k.label(),
            emission: format_grouped(*v, 2),
        })
        .collect()
}

pub fn generate_summary(ds: &Dataset) -> SummaryStats {
    let agg = &ds.aggregates;
    let top = ds.cues.first();
    let eq = equivalences(agg.total);
    SummaryStats {
        total_records: agg.records.len(),
        total_departments: agg.by_department.len(),
        total_emission_kg: agg.total,
        top_category: top.map(|c| c.category.clone()),
        top_category_share_pct: top.map(|c| c.share_pct).unwrap_or(0.0),
        top_department: agg.top_department().map(|(k, _)| k.to_string()),
        trees_needed: eq.trees_needed,
        phone_charges: eq.phone_charges,
    }
}

/// One-line JSON echo of the headline figures printed after the reports.
pub fn summary_line(summary: &SummaryStats) -> String {
    serde_json::json!({
        "total_emission_kg": round2(summary.total_emission_kg),
        "trees_needed": round2(summary.trees_needed),
    })
    .to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn history_report(entries: &[CalculationEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, e)| HistoryRow {
            index: idx + 1,
            saved: DateTime::from_timestamp_millis(e.date)
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| e.date.to_string()),
            total: format_grouped(e.total, 2),
            transport: format_grouped(e.details.transport, 2),
            electricity: format_grouped(e.details.electricity, 2),
            meat: format_grouped(e.details.meat, 2),
        })
        .collect()
}
