//! Subtotal scenarios. The server's totals are recomputed from the rows it
//! returned, so the checks hold for whatever data the dataset holds today.

use crate::builder::ChangeUserSettings;
use crate::error::ScenarioError;
use crate::query_module::QueryModule;
use crate::report::Checks;
use crate::search::{Endpoint, SeriesQuery};
use configuration::Dataset;
use core_types::{DataSetSettings, SearchResults, SortOrder};
use tracing::info;
use verification::subtotals::{verify_grand_total, verify_grouped_subtotals};

/// Subtotals switched on without grouping: only the grand total row exists.
pub async fn grand_total_only_scenario(
    module: &QueryModule,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let mut settings = module.settings(dataset).await?;
    settings.user_settings.grouping.clear();
    let settings = store_with_subtotals(module, dataset, settings).await?;

    let results = fetch_with_totals(module, &settings).await?;
    info!(rows = results.series.len(), dates = results.totals.len(), "Verifying grand total");
    verify_grand_total(&results.series, &results.totals)?;
    checks.record();
    Ok(())
}

/// Groups by the first groupable column and checks every subtotal block
/// along with the grand total.
pub async fn subtotals_all_scenario(
    module: &QueryModule,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let mut settings = module.settings(dataset).await?;
    settings
        .change_user_settings()
        .add_grouping_to_first_column_with_disabled_grouping(SortOrder::Asc)?;
    let settings = store_with_subtotals(module, dataset, settings).await?;

    let grouped: Vec<String> = settings
        .user_settings
        .grouping
        .iter()
        .map(|g| g.field.clone())
        .collect();
    let results = fetch_with_totals(module, &settings).await?;
    if results.summaries.is_empty() {
        return Err(ScenarioError::expectation(
            format!("subtotals for {grouped:?}"),
            "at least one subtotal block",
            "none",
        ));
    }

    info!(?grouped, blocks = results.summaries.len(), "Verifying subtotals");
    verify_grouped_subtotals(&grouped, &results.series, &results.summaries)?;
    checks.record();
    verify_grand_total(&results.series, &results.totals)?;
    checks.record();
    Ok(())
}

async fn store_with_subtotals(
    module: &QueryModule,
    dataset: Dataset,
    mut settings: DataSetSettings,
) -> Result<DataSetSettings, ScenarioError> {
    settings.user_settings.is_subtotals_enabled = true;
    module.update_settings(&settings).await?;
    module.settings(dataset).await
}

async fn fetch_with_totals(
    module: &QueryModule,
    settings: &DataSetSettings,
) -> Result<SearchResults, ScenarioError> {
    let results = module.search(Endpoint::Grid, settings, &SeriesQuery::default()).await?;
    if results.series.is_empty() || results.totals.is_empty() {
        return Err(ScenarioError::expectation(
            "grid with totals",
            "rows and a grand total",
            format!("{} rows, {} total dates", results.series.len(), results.totals.len()),
        ));
    }
    Ok(results)
}
