use super::error::StepError;
use super::state::{PipelineState, Step};
use crate::external::ConversionOutcome;
use crate::git::CommitHash;

/// What a successful step produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepDetail {
    Completed,
    Committed(CommitHash),
    Converted(ConversionOutcome),
}

#[derive(Debug)]
pub struct StepRecord {
    pub step: Step,
    pub result: Result<StepDetail, StepError>,
}

/// Outcome of one migration run, step by step
#[derive(Debug)]
pub struct MigrationReport {
    state: PipelineState,
    records: Vec<StepRecord>,
}

impl Default for MigrationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationReport {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Start,
            records: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, step: Step, result: Result<StepDetail, StepError>) {
        self.records.push(StepRecord { step, result });
    }

    pub(crate) fn advance(&mut self, state: PipelineState) {
        self.state = state;
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn record_for(&self, step: Step) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.step == step)
    }

    pub fn failures(&self) -> impl Iterator<Item = (Step, &StepError)> {
        self.records
            .iter()
            .filter_map(|r| r.result.as_ref().err().map(|e| (r.step, e)))
    }

    /// True when every step ran and none failed
    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Done && self.failures().next().is_none()
    }

    pub fn commit_hash(&self) -> Option<&str> {
        self.records.iter().find_map(|r| match &r.result {
            Ok(StepDetail::Committed(hash)) => Some(hash.as_str()),
            _ => None,
        })
    }
}
