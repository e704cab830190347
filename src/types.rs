use crate::factors::{factors, normalize_key, Category};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One parsed activity row. Emission is never stored; it is derived from
/// `amount` and the factor table every time it is asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    pub department: String,
    /// Trimmed, lowercased category text as it appeared in the input.
    pub category_key: String,
    pub category: Category,
    pub unit: Option<String>,
    pub amount: f64,
}

impl ActivityRecord {
    pub fn new(
        date: NaiveDate,
        department: &str,
        category: &str,
        unit: Option<&str>,
        amount: f64,
    ) -> Self {
        Self {
            date,
            department: department.trim().to_string(),
            category_key: normalize_key(category),
            category: Category::from_key(category),
            unit: unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            amount,
        }
    }

    pub fn emission(&self) -> f64 {
        factors().emission(&self.category, self.amount)
    }

    pub fn month(&self) -> MonthKey {
        MonthKey {
            year: self.date.year(),
            month: self.date.month(),
        }
    }
}

/// `(year, month)` bucket. Ordering is year then month, which is the same as
/// ordering the `YYYY-MM` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Per-mode breakdown of a single-session calculation. Field names match the
/// persisted schema.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Breakdown {
    pub transport: f64,
    pub electricity: f64,
    pub meat: f64,
}

/// One saved "calculate" result: `{date: epoch millis, total, details}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationEntry {
    pub date: i64,
    pub total: f64,
    pub details: Breakdown,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "EmissionKg")]
    #[tabled(rename = "EmissionKg")]
    pub emission: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share_pct: String,
    #[serde(rename = "Advice")]
    #[tabled(rename = "Advice")]
    pub advice: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
    #[serde(rename = "EmissionKg")]
    #[tabled(rename = "EmissionKg")]
    pub emission: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "EmissionKg")]
    #[tabled(rename = "EmissionKg")]
    pub emission: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct HistoryRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Saved")]
    pub saved: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Transport")]
    pub transport: String,
    #[tabled(rename = "Electricity")]
    pub electricity: String,
    #[tabled(rename = "Meat")]
    pub meat: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_departments: usize,
    pub total_emission_kg: f64,
    pub top_category: Option<String>,
    pub top_category_share_pct: f64,
    pub top_department: Option<String>,
    pub trees_needed: f64,
    pub phone_charges: f64,
}
