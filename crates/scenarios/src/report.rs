use configuration::Dataset;
use std::fmt;
use uuid::Uuid;

/// Summary of one finished scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub scenario: String,
    pub dataset: Dataset,
    /// Number of individual verifications that passed.
    pub checks: usize,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed(String),
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => f.write_str("PASS"),
            Outcome::Failed(_) => f.write_str("FAIL"),
        }
    }
}

/// Counts the verifications a flow performs.
#[derive(Debug, Default)]
pub struct Checks(usize);

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self) {
        self.0 += 1;
    }

    pub fn count(&self) -> usize {
        self.0
    }
}
