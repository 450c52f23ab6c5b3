use core_types::{CoreError, SortOrder};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    /// The fixture or input data cannot be interpreted.
    #[error("Fixture error: {0}")]
    Fixture(#[from] CoreError),

    #[error("Invalid verification input: {0}")]
    InvalidInput(String),

    #[error("{order:?} order is incorrect for column '{column}': '{previous}' precedes '{current}' at row {row}")]
    SortOrderViolation {
        column: String,
        order: SortOrder,
        row: usize,
        previous: String,
        current: String,
    },

    #[error("Tree order is incorrect for column '{column}': unexpected '{value}' at row {row}")]
    TreeOrderViolation {
        column: String,
        row: usize,
        value: String,
    },

    #[error("No canonical tree order is known for column '{0}'")]
    MissingTreeOrder(String),

    #[error("Series {mnemonic} has no observation for {date}")]
    MissingObservation { mnemonic: String, date: String },

    #[error("Series {mnemonic}: observation dated {actual} where {expected} was expected")]
    DateMismatch {
        mnemonic: String,
        expected: String,
        actual: String,
    },

    #[error("Series {mnemonic} has no usable base value for {date}")]
    UnusableBaseValue { mnemonic: String, date: String },

    #[error("Series {mnemonic}: expected {expected} observations, server returned {actual} (base frequency {base_frequency})")]
    LengthMismatch {
        mnemonic: String,
        expected: usize,
        actual: usize,
        base_frequency: String,
    },

    #[error("Series {mnemonic}: value for {date} should be {expected:?} but server returned {actual:?} (base frequency {base_frequency})")]
    ValueMismatch {
        mnemonic: String,
        date: String,
        expected: Option<String>,
        actual: Option<String>,
        base_frequency: String,
    },

    #[error("Series {mnemonic}: base_period should be '{expected}' but is '{actual}' (base frequency {base_frequency})")]
    BasePeriodMismatch {
        mnemonic: String,
        expected: String,
        actual: String,
        base_frequency: String,
    },

    #[error("Subtotal for '{column}' over series {from}..={to} is wrong on {date}: expected {expected}, server returned {actual:?}")]
    SubtotalMismatch {
        column: String,
        from: usize,
        to: usize,
        date: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("Page {page} of size {page_size} differs from the reference result")]
    PageMismatch { page_size: u32, page: u32 },
}
