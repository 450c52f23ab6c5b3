//! Display settings: edits that must survive a store and re-read, and grid
//! answers that must react to them.

use crate::builder::ChangeUserSettings;
use crate::error::ScenarioError;
use crate::query_module::{column_name_by_key, QueryModule};
use crate::report::Checks;
use crate::search::{Endpoint, SeriesQuery};
use configuration::{Dataset, Fixtures};
use core_types::{AppliedFunction, DataSetSettings, DateRangeOptions, Function, Series, SortOrder};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use verification::columns::{any_series_all_null, any_value_changed, any_value_present};

const NUMBER_OF_DECIMALS: u32 = 4;
const COLUMN_WIDTH: &str = "240";
const VALUES_PAGE_SIZE: u32 = 20;
const ENDPOINTS: [Endpoint; 2] = [Endpoint::Grid, Endpoint::Page];

/// Export layout stored by the export-settings step.
fn export_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("isVerticalDates".to_string(), json!(true));
    settings.insert("leftPadding".to_string(), json!(5));
    settings.insert("topPadding".to_string(), json!(7));
    settings.insert("splitBySheets".to_string(), json!("Groups"));
    settings.insert("exportDateMode".to_string(), json!("EndOfPeriod"));
    settings.insert("rowsBetweenFrequencies".to_string(), json!(4));
    settings.insert("frequenciesOrder".to_string(), json!("HighToLow"));
    settings
}

/// Changes one display setting at a time and checks the service stored it.
pub async fn display_settings_scenario(
    module: &QueryModule,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let export = export_settings();
    let mut settings = module.settings(dataset).await?;
    settings.change_user_settings().change_export_settings(export.clone());
    let stored = store(module, dataset, &settings).await?;
    for (key, value) in &export {
        let actual = stored.user_settings.export_settings.get(key);
        if actual != Some(value) {
            return Err(ScenarioError::expectation(
                format!("export setting '{key}'"),
                value,
                actual.map_or_else(|| "nothing".to_string(), Value::to_string),
            ));
        }
    }
    checks.record();

    let mut settings = stored;
    settings.change_user_settings().change_number_of_decimals(NUMBER_OF_DECIMALS);
    let stored = store(module, dataset, &settings).await?;
    expect_equal("number of decimals", &NUMBER_OF_DECIMALS, &stored.user_settings.number_of_decimals)?;
    checks.record();

    let mut settings = stored;
    let first = first_visible_key(&settings)?;
    settings.change_user_settings().change_width_for_first_column(COLUMN_WIDTH)?;
    let stored = store(module, dataset, &settings).await?;
    let width = stored.user_settings.column(&first).and_then(|c| c.width.as_deref());
    expect_equal(&format!("width of '{first}'"), &Some(COLUMN_WIDTH), &width)?;
    checks.record();

    let mut settings = stored;
    settings.change_user_settings().freeze_first_not_frozen_column()?;
    let requested = settings.user_settings.fixed_columns.clone();
    let stored = store(module, dataset, &settings).await?;
    expect_equal("frozen columns", &requested, &stored.user_settings.fixed_columns)?;
    checks.record();

    let mut settings = stored;
    let second = visible_keys(&settings).nth(1).map(str::to_string);
    settings.change_user_settings().swap_two_first_columns()?;
    let stored = store(module, dataset, &settings).await?;
    let leading = visible_keys(&stored).next().map(str::to_string);
    expect_equal("first visible column", &second, &leading)?;
    checks.record();

    let key = first_visible_key(&stored)?;
    let name = column_name_by_key(&stored, &key)?.to_string();
    for hidden in [true, false] {
        let settings = module.settings(dataset).await?;
        let stored = module.show_hide_column(dataset, settings, &name, hidden).await?;
        let actual = stored.user_settings.column(&key).map(|c| c.hidden);
        expect_equal(&format!("hidden flag of '{name}'"), &Some(hidden), &actual)?;
        debug!(column = %name, hidden, "Column visibility stored");
        checks.record();
    }

    let mut settings = module.settings(dataset).await?;
    settings
        .change_user_settings()
        .add_sorting_to_first_column_with_disabled_sorting(SortOrder::Asc)?;
    let requested = settings.user_settings.sorting.clone();
    let stored = store(module, dataset, &settings).await?;
    expect_equal("sorting", &requested, &stored.user_settings.sorting)?;
    checks.record();

    info!(checks = checks.count(), "Display settings stored");
    Ok(())
}

/// Grid and page answers carry values, drop empty series on request, and
/// change when the dataset declares a local currency conversion.
pub async fn grid_values_scenario(
    module: &QueryModule,
    fixtures: &Fixtures,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let query = SeriesQuery::default();

    let mut settings = module.settings(dataset).await?;
    settings.change_user_settings().change_page_size(VALUES_PAGE_SIZE);
    let settings = store(module, dataset, &settings).await?;
    for endpoint in ENDPOINTS {
        let rows = module.search(endpoint, &settings, &query).await?.series;
        if !any_value_present(&rows) {
            return Err(ScenarioError::expectation(
                format!("{} values", endpoint.as_str()),
                "at least one observation",
                "only empty observations",
            ));
        }
        checks.record();
    }

    let mut settings = settings;
    let date_range = DateRangeOptions {
        hide_empty_series: true,
        ..settings.user_settings.date_range.clone()
    };
    settings.change_user_settings().change_date_range(date_range);
    let settings = store(module, dataset, &settings).await?;
    expect_equal("hide empty series", &true, &settings.user_settings.date_range.hide_empty_series)?;
    for endpoint in ENDPOINTS {
        let rows = module.search(endpoint, &settings, &query).await?.series;
        if any_series_all_null(&rows) {
            return Err(ScenarioError::expectation(
                format!("{} rows with hidden empty series", endpoint.as_str()),
                "no series without values",
                "an empty series",
            ));
        }
        checks.record();
    }

    let Some(currency) = fixtures.dataset(dataset).and_then(|d| d.local_currency.as_deref()) else {
        debug!(%dataset, "No local currency declared, skipping conversion check");
        return Ok(());
    };
    let mut settings = settings;
    settings
        .change_user_settings()
        .change_page_size(module.verification().max_page_size);
    let initial_settings = store(module, dataset, &settings).await?;
    let mut initial = Vec::with_capacity(ENDPOINTS.len());
    for endpoint in ENDPOINTS {
        initial.push(module.search(endpoint, &initial_settings, &query).await?.series);
    }

    let mut converted_settings = initial_settings;
    module
        .add_functions(
            &mut converted_settings,
            vec![AppliedFunction::new(Function::CurrencyConversion, currency)],
        )
        .await?;
    let converted_settings = module.settings(dataset).await?;
    for (endpoint, before) in ENDPOINTS.into_iter().zip(&initial) {
        let after: Vec<Series> = module.search(endpoint, &converted_settings, &query).await?.series;
        if !any_value_changed(before, &after) {
            return Err(ScenarioError::expectation(
                format!("{} values after converting to {currency}", endpoint.as_str()),
                "at least one changed observation",
                "identical observations",
            ));
        }
        checks.record();
    }
    Ok(())
}

async fn store(
    module: &QueryModule,
    dataset: Dataset,
    settings: &DataSetSettings,
) -> Result<DataSetSettings, ScenarioError> {
    module.update_settings(settings).await?;
    module.settings(dataset).await
}

fn visible_keys(settings: &DataSetSettings) -> impl Iterator<Item = &str> {
    settings
        .user_settings
        .columns
        .iter()
        .filter(|c| !c.hidden)
        .map(|c| c.key.as_str())
}

fn first_visible_key(settings: &DataSetSettings) -> Result<String, ScenarioError> {
    visible_keys(settings)
        .next()
        .map(str::to_string)
        .ok_or_else(|| ScenarioError::ColumnNotFound("any visible column".to_string()))
}

fn expect_equal<T: PartialEq + std::fmt::Debug>(
    what: &str,
    expected: &T,
    actual: &T,
) -> Result<(), ScenarioError> {
    if expected != actual {
        return Err(ScenarioError::expectation(
            what,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ));
    }
    Ok(())
}
