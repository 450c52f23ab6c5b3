//! # gridcheck Core Types
//!
//! The shared data model of the workspace: the series a query returns, the
//! dataset settings document the service stores per user, and the enums
//! that name frequencies, scales and functions.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** depends on nothing else in the workspace.
//! - **Wire fidelity:** types serialize to the service's camelCase JSON, and
//!   settings objects keep unknown fields so a read-modify-write cycle never
//!   drops data.

pub mod dates;
pub mod enums;
pub mod error;
pub mod search;
pub mod series;
pub mod settings;
pub mod taxonomy;

// Re-export the core types to provide a clean public API.
pub use enums::{Annualization, DatasetKind, Frequency, Function, RebasingBase, Scale, SortOrder};
pub use error::CoreError;
pub use search::{Page, SearchFilters, SearchOptions, SearchResults, Summaries};
pub use series::{attributes, AttributeValue, Series, SeriesValue};
pub use settings::{
    AppliedFunction, AppliedFunctionSettings, ColumnSettings, DataSetId, DataSetSettings,
    DateRangeOptions, FilterState, RebasingSettings, SortInfo, UpdateFiltersResponse,
    UserSettings,
};
pub use taxonomy::{TaxonomyFilter, TaxonomyFilterItem, TaxonomyFilters, CUSTOM_DIMENSIONS_ITEM};
