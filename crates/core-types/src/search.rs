use crate::series::Series;
use crate::settings::{AppliedFunctionSettings, DataSetId, DateRangeOptions, FilterState, SortInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub data_set: DataSetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default)]
    pub taxonomy_filters: Vec<FilterState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

/// The envelope sent with grid, page and overview queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub filters: SearchFilters,
    #[serde(default)]
    pub sort: Vec<SortInfo>,
    pub page: Page,
    #[serde(default)]
    pub date_range: DateRangeOptions,
    #[serde(default)]
    pub applied_functions: AppliedFunctionSettings,
    #[serde(default)]
    pub grouped_columns: Vec<String>,
    #[serde(default)]
    pub is_subtotals_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations_limit: Option<u32>,
}

/// Server-side group totals: series index → date → group → column key → value.
pub type Summaries = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, Value>>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub total_count: u64,
    /// Grand totals keyed by the service's date string.
    #[serde(default)]
    pub totals: BTreeMap<String, String>,
    #[serde(default)]
    pub summaries: Summaries,
}
