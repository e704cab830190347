//! Carbon-emissions estimator: CSV activity records in, per-category,
//! per-department and per-month totals out, plus advisory cues and a
//! persisted history of single-session calculations.

pub mod aggregate;
pub mod analytics;
pub mod calculator;
pub mod config;
pub mod error;
pub mod factors;
pub mod history;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;
