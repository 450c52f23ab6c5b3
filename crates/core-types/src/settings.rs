//! The dataset display settings document.
//!
//! Settings are read from the service, modified locally and written back.
//! Every object carries an `extra` map so fields this crate does not model
//! survive the round trip untouched.

use crate::enums::{DatasetKind, Function, RebasingBase, SortOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetId {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: DatasetKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortInfo {
    pub field: String,
    pub order: SortOrder,
}

impl SortInfo {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSettings {
    pub key: String,
    pub header_text: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub allow_sorting: bool,
    #[serde(default)]
    pub allow_grouping: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeOptions {
    #[serde(default, with = "crate::dates::flexible_option")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "crate::dates::flexible_option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_type: Option<String>,
    #[serde(default)]
    pub hide_empty_series: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DateRangeOptions {
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            period_type: Some("Custom".to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFunction {
    pub function_id: i32,
    pub parameter: String,
}

impl AppliedFunction {
    pub fn new(function: Function, parameter: impl Into<String>) -> Self {
        Self {
            function_id: function.id(),
            parameter: parameter.into(),
        }
    }

    pub fn is(&self, function: Function) -> bool {
        self.function_id == function.id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RebasingSettings {
    pub rebase_indices: bool,
    #[serde(with = "crate::dates::flexible_option")]
    pub indices_base_date: Option<NaiveDate>,
    pub indices_base_frequency: RebasingBase,
    pub indices_base_value: i32,
    pub rebase_real_values: bool,
    #[serde(with = "crate::dates::flexible_option")]
    pub real_values_base_date: Option<NaiveDate>,
    pub real_values_base_frequency: RebasingBase,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RebasingSettings {
    fn default() -> Self {
        Self {
            rebase_indices: false,
            indices_base_date: None,
            indices_base_frequency: RebasingBase::Annual,
            indices_base_value: 100,
            rebase_real_values: false,
            real_values_base_date: None,
            real_values_base_frequency: RebasingBase::Annual,
            extra: Map::new(),
        }
    }
}

impl RebasingSettings {
    pub fn indices(base_date: NaiveDate, base: RebasingBase, base_value: i32) -> Self {
        Self {
            rebase_indices: true,
            indices_base_date: Some(base_date),
            indices_base_frequency: base,
            indices_base_value: base_value,
            ..Default::default()
        }
    }

    pub fn real_values(base_date: NaiveDate, base: RebasingBase) -> Self {
        Self {
            rebase_real_values: true,
            real_values_base_date: Some(base_date),
            real_values_base_frequency: base,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFunctionSettings {
    #[serde(default)]
    pub functions: Vec<AppliedFunction>,
    #[serde(default)]
    pub replace_original_series: bool,
    #[serde(default)]
    pub rebasing: RebasingSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppliedFunctionSettings {
    pub fn new(functions: Vec<AppliedFunction>) -> Self {
        Self {
            functions,
            replace_original_series: true,
            ..Default::default()
        }
    }

    /// Replaces the parameter of `function` if present, appends it otherwise.
    pub fn set(&mut self, function: AppliedFunction) {
        match self
            .functions
            .iter_mut()
            .find(|f| f.function_id == function.function_id)
        {
            Some(existing) => existing.parameter = function.parameter,
            None => self.functions.push(function),
        }
    }

    pub fn parameter_of(&self, function: Function) -> Option<&str> {
        self.functions
            .iter()
            .find(|f| f.is(function))
            .map(|f| f.parameter.as_str())
    }
}

/// A selected value of a taxonomy filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub filter_id: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub columns: Vec<ColumnSettings>,
    #[serde(default)]
    pub sorting: Vec<SortInfo>,
    #[serde(default)]
    pub grouping: Vec<SortInfo>,
    #[serde(default)]
    pub filters: Vec<FilterState>,
    #[serde(default)]
    pub fixed_columns: Vec<String>,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub number_of_decimals: u32,
    #[serde(default)]
    pub is_subtotals_enabled: bool,
    #[serde(default)]
    pub date_range: DateRangeOptions,
    #[serde(default)]
    pub applied_functions: AppliedFunctionSettings,
    #[serde(default)]
    pub export_settings: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSettings {
    pub fn column(&self, key: &str) -> Option<&ColumnSettings> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn column_mut(&mut self, key: &str) -> Option<&mut ColumnSettings> {
        self.columns.iter_mut().find(|c| c.key == key)
    }

    pub fn is_grouped(&self) -> bool {
        !self.grouping.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetSettings {
    pub data_set: DataSetId,
    pub user_settings: UserSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFiltersResponse {
    pub success: bool,
}
