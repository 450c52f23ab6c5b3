use thiserror::Error;

/// Errors raised when a value cannot be interpreted by the data model.
///
/// These are fixture or configuration mistakes rather than service failures:
/// an unknown scale string, a mnemonic without a frequency suffix, and so on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Incorrect scale chosen: '{0}'")]
    UnknownScale(String),

    #[error("Unrecognized frequency: '{0}'")]
    UnknownFrequency(String),

    #[error("Unrecognized annualization value: '{0}'")]
    UnknownAnnualization(String),

    #[error("Unrecognized rebasing base frequency code: '{0}'")]
    UnknownRebasingCode(String),

    #[error("Cannot derive frequency from mnemonic '{0}'")]
    UnknownMnemonicSuffix(String),

    #[error("Invalid date '{0}': {1}")]
    InvalidDate(String, String),
}
