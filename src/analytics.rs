// Ranking, shares and advisory cues.
use crate::aggregate::desc_then_key;
use crate::factors::{Category, KG_PER_PHONE_CHARGE, KG_PER_TREE_YEAR};
use crate::types::CalculationEntry;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

pub const FALLBACK_ADVICE: &str =
    "Track this activity more closely and look for lower-carbon alternatives.";

static ADVICE: Lazy<HashMap<Category, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            Category::Electricity,
            "Switch to LED lighting, unplug idle devices and consider a renewable tariff.",
        ),
        (
            Category::Car,
            "Carpool, combine trips, or switch short journeys to cycling or walking.",
        ),
        (
            Category::Bus,
            "Buses are already efficient; for short hops, walking or cycling is zero-carbon.",
        ),
        (
            Category::Train,
            "Rail is a low-carbon choice; keep favouring it over driving or flying.",
        ),
        (
            Category::Flight,
            "Replace short-haul flights with rail and meet remotely where possible.",
        ),
        (
            Category::Waste,
            "Reduce, reuse and recycle; composting organic waste avoids landfill methane.",
        ),
        (
            Category::MeatMeal,
            "Swap a few meat meals each week for plant-based options.",
        ),
    ])
});

/// Advisory text for a category, with a generic fallback.
pub fn advice_for(category: &Category) -> &'static str {
    ADVICE.get(category).copied().unwrap_or(FALLBACK_ADVICE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub category: String,
    pub emission: f64,
    pub share_pct: f64,
    pub advice: &'static str,
}

/// One cue per category, largest emitter first (ties alphabetical).
///
/// Shares are zero when `total` is zero or not finite.
pub fn generate_cues(by_category: &BTreeMap<String, f64>, total: f64) -> Vec<Cue> {
    let mut ranked: Vec<(&String, f64)> = by_category.iter().map(|(k, v)| (k, *v)).collect();
    ranked.sort_by(|a, b| desc_then_key(a.1, a.0, b.1, b.0));
    ranked
        .into_iter()
        .map(|(key, emission)| Cue {
            category: key.clone(),
            emission,
            share_pct: share_of(emission, total),
            advice: advice_for(&Category::from_key(key)),
        })
        .collect()
}

fn share_of(part: f64, total: f64) -> f64 {
    if total > 0.0 && total.is_finite() {
        part / total * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equivalences {
    pub trees_needed: f64,
    pub phone_charges: f64,
}

pub fn equivalences(total_kg: f64) -> Equivalences {
    Equivalences {
        trees_needed: total_kg / KG_PER_TREE_YEAR,
        phone_charges: total_kg / KG_PER_PHONE_CHARGE,
    }
}

/// Suggestions for a single-session result: one line per non-zero part of
/// the breakdown, largest first. `transport` is the mode the distance was
/// travelled by and picks the transport advice.
pub fn session_suggestions(
    entry: &CalculationEntry,
    transport: &Category,
) -> Vec<(&'static str, f64, &'static str)> {
    let d = entry.details;
    let mut parts = vec![
        ("transport", d.transport, advice_for(transport)),
        ("electricity", d.electricity, advice_for(&Category::Electricity)),
        ("meat", d.meat, advice_for(&Category::MeatMeal)),
    ];
    parts.retain(|p| p.1 > 0.0);
    parts.sort_by(|a, b| desc_then_key(a.1, a.0, b.1, b.0));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Breakdown;

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn example_shares_and_order() {
        let cues = generate_cues(
            &map(&[("electricity", 82.0), ("transport_car", 8.5335)]),
            90.5335,
        );
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].category, "electricity");
        assert_eq!(format!("{:.1}", cues[0].share_pct), "90.6");
        assert_eq!(cues[0].advice, advice_for(&Category::Electricity));
        assert_eq!(cues[1].advice, advice_for(&Category::Car));
    }

    #[test]
    fn shares_sum_to_hundred() {
        let by = map(&[("flight", 460.0), ("bus", 11.0), ("waste", 29.0), ("paper", 0.0)]);
        let total: f64 = by.values().sum();
        let sum: f64 = generate_cues(&by, total).iter().map(|c| c.share_pct).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_gives_zero_shares_and_fallback_advice() {
        let cues = generate_cues(&map(&[("paper", 0.0), ("cardboard", 0.0)]), 0.0);
        assert_eq!(cues[0].category, "cardboard");
        assert!(cues.iter().all(|c| c.share_pct == 0.0));
        assert!(cues.iter().all(|c| c.advice == FALLBACK_ADVICE));
    }

    #[test]
    fn equivalence_constants() {
        let e = equivalences(42.0);
        assert!((e.trees_needed - 2.0).abs() < 1e-12);
        assert!((e.phone_charges - 8_400.0).abs() < 1e-6);
    }

    #[test]
    fn session_suggestions_skip_zero_parts() {
        let entry = CalculationEntry {
            date: 0,
            total: 34.0,
            details: Breakdown {
                transport: 4.0,
                electricity: 0.0,
                meat: 30.0,
            },
        };
        let s = session_suggestions(&entry, &Category::Car);
        let names: Vec<&str> = s.iter().map(|p| p.0).collect();
        assert_eq!(names, vec!["meat", "transport"]);
    }

    #[test]
    fn transport_advice_follows_the_mode_used() {
        let entry = CalculationEntry {
            date: 0,
            total: 4.0,
            details: Breakdown {
                transport: 4.0,
                electricity: 0.0,
                meat: 0.0,
            },
        };
        let train = session_suggestions(&entry, &Category::Train);
        assert_eq!(train[0].2, advice_for(&Category::Train));
        assert_ne!(train[0].2, advice_for(&Category::Car));
        let flight = session_suggestions(&entry, &Category::Flight);
        assert_eq!(flight[0].2, advice_for(&Category::Flight));
    }
}
