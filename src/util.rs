// Utility helpers for parsing and number formatting.
//
// This module centralizes the "dirty" CSV field handling so the rest of the
// code can assume clean, typed values.
use crate::error::RowError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an amount field.
///
/// - Trims whitespace and strips thousands separators (`"1,200"`).
/// - Accepts exponent form (`1e3`); trailing text such as `"12kg"` is an error.
/// - Rejects `NaN`/`inf` as not-a-number and negatives as out of range.
pub fn parse_amount(s: &str) -> Result<f64, RowError> {
    let t = s.trim();
    let invalid = || RowError::InvalidAmount(t.to_string());
    let v = t.replace(',', "").parse::<f64>().map_err(|_| invalid())?;
    if !v.is_finite() {
        return Err(invalid());
    }
    if v < 0.0 {
        return Err(RowError::NegativeAmount(v));
    }
    Ok(v)
}

/// Parse a calendar date. Slash dates are read month-first (`MM/DD/YYYY`);
/// day-first input such as `13/01/2024` is rejected, not reinterpreted.
/// Timestamps are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Result<NaiveDate, RowError> {
    let t = s.trim();
    let invalid = || RowError::InvalidDate(t.to_string());
    if t.is_empty() {
        return Err(invalid());
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Ok(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(t)
        .map(|dt| dt.date_naive())
        .map_err(|_| invalid())
}

/// Compact human formatting: `500`, `1.50k`, `2.50M`.
///
/// Below a thousand the value keeps up to two decimals with trailing zeros
/// dropped. A value that would round up to the next unit is shown in that
/// unit, so `999_999` prints as `1.00M`, never `1000.00k`.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let abs = n.abs();
    let body = if abs >= 999_995.0 {
        format!("{:.2}M", abs / 1_000_000.0)
    } else if abs >= 999.995 {
        format!("{:.2}k", abs / 1_000.0)
    } else {
        trim_decimals(format!("{:.2}", abs))
    };
    if n < 0.0 && body != "0" {
        format!("-{}", body)
    } else {
        body
    }
}

fn trim_decimals(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Fixed decimals with locale-aware thousands separators (`1,234,567.89`).
/// Used in tables and CSV exports where exact figures matter; `format_number`
/// is the compact form for cards and chart labels.
pub fn format_grouped(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // num-format only groups integers, so split and re-join the fraction.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Percentage with one decimal, e.g. `90.6%`.
pub fn format_pct(p: f64) -> String {
    format!("{:.1}%", p)
}
