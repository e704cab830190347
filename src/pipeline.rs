// Session state threaded through the Parser -> Aggregator -> Analytics
// pipeline. Side effects (printing, files) stay in the caller.
use crate::aggregate::{aggregate, Aggregates};
use crate::analytics::{generate_cues, Cue};
use crate::calculator::{calculate, CalculationInput};
use crate::error::{CalcError, SessionError};
use crate::history::HistoryStore;
use crate::loader::LoadReport;
use crate::types::{ActivityRecord, CalculationEntry};
use std::fmt;
use tracing::{info, warn};

/// A fully processed dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: String,
    pub report: LoadReport,
    pub aggregates: Aggregates,
    pub cues: Vec<Cue>,
}

impl Dataset {
    pub fn build(source: impl Into<String>, records: Vec<ActivityRecord>, report: LoadReport) -> Self {
        let aggregates = aggregate(records);
        let cues = generate_cues(&aggregates.by_category, aggregates.total);
        Self {
            source: source.into(),
            report,
            aggregates,
            cues,
        }
    }
}

/// Issued when a load starts. Only the most recently issued ticket may
/// install its dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct PipelineState {
    generation: u64,
    dataset: Option<Dataset>,
    last_calculation: Option<CalculationEntry>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn last_calculation(&self) -> Option<&CalculationEntry> {
        self.last_calculation.as_ref()
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Build and install a dataset. Returns `false` without touching state
    /// when a newer load has started since `ticket` was issued.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        source: &str,
        records: Vec<ActivityRecord>,
        report: LoadReport,
    ) -> bool {
        if !self.is_current(ticket) {
            warn!(
                ticket = ticket.0,
                current = self.generation,
                source,
                "discarding superseded load"
            );
            return false;
        }
        let dataset = Dataset::build(source, records, report);
        info!(
            source,
            records = dataset.aggregates.records.len(),
            total_kg = dataset.aggregates.total,
            "dataset installed"
        );
        self.dataset = Some(dataset);
        true
    }

    /// A failed load leaves the current dataset as it was.
    pub fn fail_load(&self, ticket: LoadTicket, source: &str, error: &dyn fmt::Display) {
        warn!(ticket = ticket.0, source, %error, "load failed; dataset unchanged");
    }

    pub fn calculate(&mut self, input: &CalculationInput) -> Result<CalculationEntry, CalcError> {
        let entry = calculate(input)?;
        self.last_calculation = Some(entry);
        Ok(entry)
    }

    pub fn set_last_calculation(&mut self, entry: CalculationEntry) {
        self.last_calculation = Some(entry);
    }

    /// Append the last calculation to `store`. Fails with
    /// `MissingSavedResult` when nothing has been calculated yet.
    pub fn save(&self, store: &mut dyn HistoryStore) -> Result<CalculationEntry, SessionError> {
        let entry = self.last_calculation.ok_or(SessionError::MissingSavedResult)?;
        store.append(entry)?;
        info!(total_kg = entry.total, "calculation saved");
        Ok(entry)
    }
}
