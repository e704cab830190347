// Emission factors and the closed set of activity categories.
//
// Every emission figure in the crate flows through `EmissionFactorTable`; the
// table is built once per process and never mutated.
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// kg CO2e absorbed by one tree over a year.
pub const KG_PER_TREE_YEAR: f64 = 21.0;
/// kg CO2e emitted by one full smartphone charge.
pub const KG_PER_PHONE_CHARGE: f64 = 0.005;

pub const ELECTRICITY_FACTOR: f64 = 0.82;
pub const CAR_FACTOR: f64 = 0.17067;
pub const BUS_FACTOR: f64 = 0.11;
pub const TRAIN_FACTOR: f64 = 0.04;
pub const FLIGHT_FACTOR: f64 = 0.46;
pub const WASTE_FACTOR: f64 = 1.0;
pub const MEAT_MEAL_FACTOR: f64 = 15.0;

/// Activity category. Anything we do not recognize ends up in `Other`, which
/// carries the normalized key and always has a zero factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Electricity,
    Car,
    Bus,
    Train,
    Flight,
    Waste,
    MeatMeal,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 7] = [
        Category::Electricity,
        Category::Car,
        Category::Bus,
        Category::Train,
        Category::Flight,
        Category::Waste,
        Category::MeatMeal,
    ];

    /// Map a raw category string to a variant. Matching is done on the
    /// trimmed, lowercased text so `" Electricity "` and `"electricity"`
    /// resolve the same way.
    pub fn from_key(raw: &str) -> Category {
        let key = normalize_key(raw);
        match key.as_str() {
            "electricity" | "electric" | "power" => Category::Electricity,
            "car" | "transport_car" => Category::Car,
            "bus" | "transport_bus" => Category::Bus,
            "train" | "transport_train" | "rail" => Category::Train,
            "flight" | "transport_flight" | "air" => Category::Flight,
            "waste" => Category::Waste,
            "meat_meal" | "meat" | "meat meal" | "diet_meat" => Category::MeatMeal,
            _ => Category::Other(key),
        }
    }

    pub fn canonical_key(&self) -> &str {
        match self {
            Category::Electricity => "electricity",
            Category::Car => "car",
            Category::Bus => "bus",
            Category::Train => "train",
            Category::Flight => "flight",
            Category::Waste => "waste",
            Category::MeatMeal => "meat_meal",
            Category::Other(key) => key.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_key())
    }
}

/// Lowercase and trim a category key. Aggregates are keyed by this form.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug)]
pub struct EmissionFactorTable {
    factors: HashMap<Category, f64>,
}

impl EmissionFactorTable {
    fn standard() -> Self {
        let factors = HashMap::from([
            (Category::Electricity, ELECTRICITY_FACTOR),
            (Category::Car, CAR_FACTOR),
            (Category::Bus, BUS_FACTOR),
            (Category::Train, TRAIN_FACTOR),
            (Category::Flight, FLIGHT_FACTOR),
            (Category::Waste, WASTE_FACTOR),
            (Category::MeatMeal, MEAT_MEAL_FACTOR),
        ]);
        Self { factors }
    }

    /// kg CO2e per unit. `Other` and anything missing fall back to zero.
    pub fn factor(&self, category: &Category) -> f64 {
        self.factors.get(category).copied().unwrap_or(0.0)
    }

    pub fn emission(&self, category: &Category, amount: f64) -> f64 {
        amount * self.factor(category)
    }
}

static FACTORS: Lazy<EmissionFactorTable> = Lazy::new(EmissionFactorTable::standard);

/// Process-wide factor table.
pub fn factors() -> &'static EmissionFactorTable {
    &FACTORS
}
