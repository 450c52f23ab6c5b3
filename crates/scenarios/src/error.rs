use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Application request failed: {0}")]
    Api(#[from] api_client::error::ApiError),

    #[error("Verification failed: {0}")]
    Verification(#[from] verification::VerificationError),

    #[error("Invalid data: {0}")]
    Core(#[from] core_types::CoreError),

    #[error("Dataset '{0}' is not declared in the fixtures")]
    UnknownDataset(String),

    #[error("No {what} fixtures for dataset '{dataset}'")]
    MissingFixture { what: String, dataset: String },

    #[error("The Application rejected the settings update for dataset '{0}'")]
    UpdateRejected(String),

    #[error("Expected exactly one series matching '{mnemonic}', found {found}")]
    SeriesNotFound { mnemonic: String, found: usize },

    #[error("Column '{0}' is not part of the dataset settings")]
    ColumnNotFound(String),

    #[error("Taxonomy item '{0}' was not found in the filter tree")]
    FilterNotFound(String),

    #[error("{what}: expected {expected}, got {actual}")]
    Expectation {
        what: String,
        expected: String,
        actual: String,
    },
}

impl ScenarioError {
    pub fn expectation(
        what: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        ScenarioError::Expectation {
            what: what.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
