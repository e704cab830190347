use crate::error::CalcError;
use crate::factors::{factors, Category};
use crate::types::{Breakdown, CalculationEntry};
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Car,
    Bus,
    Train,
    Flight,
}

impl TransportMode {
    pub fn category(self) -> Category {
        match self {
            TransportMode::Car => Category::Car,
            TransportMode::Bus => Category::Bus,
            TransportMode::Train => Category::Train,
            TransportMode::Flight => Category::Flight,
        }
    }

    pub fn parse(s: &str) -> Option<TransportMode> {
        match s.trim().to_lowercase().as_str() {
            "car" | "1" => Some(TransportMode::Car),
            "bus" | "2" => Some(TransportMode::Bus),
            "train" | "3" => Some(TransportMode::Train),
            "flight" | "plane" | "4" => Some(TransportMode::Flight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationInput {
    pub transport_mode: TransportMode,
    pub distance_km: f64,
    pub electricity_kwh: f64,
    pub meat_meals: f64,
}

pub fn calculate(input: &CalculationInput) -> Result<CalculationEntry, CalcError> {
    calculate_at(input, Utc::now().timestamp_millis())
}

/// Same as [`calculate`] with an explicit timestamp in epoch millis.
pub fn calculate_at(input: &CalculationInput, date: i64) -> Result<CalculationEntry, CalcError> {
    let distance = checked("distance_km", input.distance_km)?;
    let kwh = checked("electricity_kwh", input.electricity_kwh)?;
    let meals = checked("meat_meals", input.meat_meals)?;

    let table = factors();
    let details = Breakdown {
        transport: table.emission(&input.transport_mode.category(), distance),
        electricity: table.emission(&Category::Electricity, kwh),
        meat: table.emission(&Category::MeatMeal, meals),
    };
    Ok(CalculationEntry {
        date,
        total: details.transport + details.electricity + details.meat,
        details,
    })
}

fn checked(field: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidInput { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: TransportMode, km: f64, kwh: f64, meals: f64) -> CalculationInput {
        CalculationInput {
            transport_mode: mode,
            distance_km: km,
            electricity_kwh: kwh,
            meat_meals: meals,
        }
    }

    #[test]
    fn breakdown_uses_factor_table() {
        let e = calculate_at(&input(TransportMode::Car, 100.0, 50.0, 2.0), 1_700_000_000_000).unwrap();
        assert_eq!(e.date, 1_700_000_000_000);
        assert!((e.details.transport - 17.067).abs() < 1e-9);
        assert!((e.details.electricity - 41.0).abs() < 1e-9);
        assert!((e.details.meat - 30.0).abs() < 1e-9);
        assert!((e.total - 88.067).abs() < 1e-9);
    }

    #[test]
    fn mode_changes_transport_factor() {
        let train = calculate_at(&input(TransportMode::Train, 100.0, 0.0, 0.0), 0).unwrap();
        let flight = calculate_at(&input(TransportMode::Flight, 100.0, 0.0, 0.0), 0).unwrap();
        assert!((train.total - 4.0).abs() < 1e-9);
        assert!((flight.total - 46.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_or_nan() {
        let err = calculate_at(&input(TransportMode::Bus, -1.0, 0.0, 0.0), 0).unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidInput {
                field: "distance_km",
                value: -1.0
            }
        );
        assert!(calculate_at(&input(TransportMode::Bus, 0.0, f64::NAN, 0.0), 0).is_err());
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(TransportMode::parse(" Plane "), Some(TransportMode::Flight));
        assert_eq!(TransportMode::parse("2"), Some(TransportMode::Bus));
        assert_eq!(TransportMode::parse("boat"), None);
    }
}
