use core_types::DataSetId;
use serde::{Deserialize, Serialize};

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// Body of a non-2xx answer from the Application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Query string identifying a dataset, e.g. `?id=7&type=magellan`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DataSetQuery<'a> {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: &'a core_types::DatasetKind,
}

impl<'a> From<&'a DataSetId> for DataSetQuery<'a> {
    fn from(data_set: &'a DataSetId) -> Self {
        Self {
            id: data_set.id,
            kind: &data_set.kind,
        }
    }
}
