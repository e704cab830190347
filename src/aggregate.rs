use crate::types::{ActivityRecord, MonthKey};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DepartmentTotal {
    pub emission: f64,
    pub records: usize,
}

/// Emission totals for one dataset. Maps are ordered by key so two runs over
/// the same input produce identical output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    /// Input records, sorted by date (stable for equal dates).
    pub records: Vec<ActivityRecord>,
    pub by_category: BTreeMap<String, f64>,
    pub by_department: BTreeMap<String, DepartmentTotal>,
    pub by_month: BTreeMap<MonthKey, f64>,
    pub total: f64,
}

impl Aggregates {
    pub fn top_category(&self) -> Option<(&str, f64)> {
        top_by_value(self.by_category.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn top_department(&self) -> Option<(&str, f64)> {
        top_by_value(
            self.by_department
                .iter()
                .map(|(k, v)| (k.as_str(), v.emission)),
        )
    }

    /// Departments by emission, largest first; ties alphabetical.
    pub fn departments_ranked(&self) -> Vec<(&str, DepartmentTotal)> {
        let mut v: Vec<(&str, DepartmentTotal)> = self
            .by_department
            .iter()
            .map(|(k, t)| (k.as_str(), *t))
            .collect();
        v.sort_by(|a, b| desc_then_key(a.1.emission, a.0, b.1.emission, b.0));
        v
    }
}

/// Reduce records into per-category, per-department and per-month totals.
///
/// Records whose category has no factor add zero emission, but they still
/// create and count toward their department entry.
pub fn aggregate(mut records: Vec<ActivityRecord>) -> Aggregates {
    // `sort_by_key` is stable, so same-day rows keep input order.
    records.sort_by_key(|r| r.date);

    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
    let mut by_department: BTreeMap<String, DepartmentTotal> = BTreeMap::new();
    let mut by_month: BTreeMap<MonthKey, f64> = BTreeMap::new();
    let mut total = 0.0;

    for r in &records {
        let emission = r.emission();
        *by_category.entry(r.category_key.clone()).or_insert(0.0) += emission;
        let dept = by_department.entry(r.department.clone()).or_default();
        dept.emission += emission;
        dept.records += 1;
        *by_month.entry(r.month()).or_insert(0.0) += emission;
        total += emission;
    }

    debug!(
        records = records.len(),
        categories = by_category.len(),
        departments = by_department.len(),
        months = by_month.len(),
        total,
        "aggregated dataset"
    );

    Aggregates {
        records,
        by_category,
        by_department,
        by_month,
        total,
    }
}

/// Descending by value, then ascending by key.
pub(crate) fn desc_then_key(av: f64, ak: &str, bv: f64, bk: &str) -> Ordering {
    bv.partial_cmp(&av)
        .unwrap_or(Ordering::Equal)
        .then_with(|| ak.cmp(bk))
}

fn top_by_value<'a>(it: impl Iterator<Item = (&'a str, f64)>) -> Option<(&'a str, f64)> {
    it.min_by(|a, b| desc_then_key(a.1, a.0, b.1, b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_records;
    use proptest::prelude::*;

    const EXAMPLE: &str = "date,department,category,unit,amount\n\
                           2024-01-05,Ops,electricity,kWh,100\n\
                           2024-01-06,Ops,transport_car,km,50\n";

    fn agg(text: &str) -> Aggregates {
        let (records, _) = parse_records(text).unwrap();
        aggregate(records)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn documented_example() {
        let a = agg(EXAMPLE);
        assert!(close(a.by_category["electricity"], 82.0));
        assert!(close(a.by_category["transport_car"], 8.5335));
        assert!(close(a.total, 90.5335));
        assert_eq!(a.top_category().map(|(k, _)| k), Some("electricity"));
        assert_eq!(a.top_department().map(|(k, _)| k), Some("Ops"));
    }

    #[test]
    fn unknown_category_counts_for_department_but_adds_nothing() {
        let a = agg("date,department,category,unit,amount\n\
                     2024-01-05,Ops,electricity,kWh,10\n\
                     2024-01-05,Legal,paper,kg,500\n");
        assert!(close(a.total, 8.2));
        assert_eq!(a.by_category["paper"], 0.0);
        let legal = a.by_department["Legal"];
        assert_eq!(legal.records, 1);
        assert_eq!(legal.emission, 0.0);
        assert_eq!(a.records.len(), 2);
    }

    #[test]
    fn invalid_date_row_is_absent_from_every_view() {
        let with_bad = agg("date,department,category,unit,amount\n\
                            2024-01-05,Ops,electricity,kWh,10\n\
                            31/31/2024,Sales,flight,km,1000\n");
        assert!(close(with_bad.total, 8.2));
        assert!(!with_bad.by_department.contains_key("Sales"));
        assert!(!with_bad.by_category.contains_key("flight"));
        assert_eq!(with_bad.by_month.len(), 1);
    }

    #[test]
    fn months_are_chronological_and_records_sorted_stably() {
        let a = agg("date,department,category,unit,amount\n\
                     2024-03-01,A,bus,km,10\n\
                     2023-12-31,B,bus,km,10\n\
                     2024-03-01,C,bus,km,10\n\
                     2024-01-15,D,bus,km,10\n");
        let labels: Vec<String> = a.by_month.keys().map(|k| k.label()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-01", "2024-03"]);
        let depts: Vec<&str> = a.records.iter().map(|r| r.department.as_str()).collect();
        assert_eq!(depts, vec!["B", "D", "A", "C"]);
        assert!(close(a.by_month[&MonthKey { year: 2024, month: 3 }], 2.2));
    }

    #[test]
    fn ties_break_alphabetically() {
        let a = agg("date,department,category,unit,amount\n\
                     2024-01-05,Zeta,waste,kg,5\n\
                     2024-01-05,Alpha,waste,kg,5\n");
        assert_eq!(a.top_department().map(|(k, _)| k), Some("Alpha"));
        let ranked: Vec<&str> = a.departments_ranked().into_iter().map(|(k, _)| k).collect();
        assert_eq!(ranked, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn empty_dataset_has_no_top() {
        let a = aggregate(Vec::new());
        assert_eq!(a.total, 0.0);
        assert!(a.top_category().is_none());
        assert!(a.top_department().is_none());
    }

    fn row() -> impl Strategy<Value = String> {
        (
            0u32..3,
            1u32..13,
            1u32..29,
            prop::sample::select(vec!["Ops", "Sales", "Legal"]),
            prop::sample::select(vec!["electricity", "car", "flight", "paper", "meat"]),
            0.0f64..10_000.0,
        )
            .prop_map(|(y, m, d, dept, cat, amt)| {
                format!("{}-{:02}-{:02},{},{},u,{:.3}", 2022 + y, m, d, dept, cat, amt)
            })
    }

    proptest! {
        #[test]
        fn views_sum_to_total(rows in prop::collection::vec(row(), 0..40)) {
            let text = format!("date,department,category,unit,amount\n{}", rows.join("\n"));
            let a = agg(&text);
            let tol = 1e-6 * a.total.max(1.0);
            let cat: f64 = a.by_category.values().sum();
            let dept: f64 = a.by_department.values().map(|d| d.emission).sum();
            let month: f64 = a.by_month.values().sum();
            prop_assert!((cat - a.total).abs() < tol);
            prop_assert!((dept - a.total).abs() < tol);
            prop_assert!((month - a.total).abs() < tol);
            prop_assert_eq!(a.records.len(), rows.len());
        }

        #[test]
        fn reparsing_is_deterministic(rows in prop::collection::vec(row(), 0..40)) {
            let text = format!("date,department,category,unit,amount\n{}", rows.join("\n"));
            prop_assert_eq!(agg(&text), agg(&text));
        }
    }
}
