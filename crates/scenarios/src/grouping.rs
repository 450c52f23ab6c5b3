//! Grouping, sorting and paging scenarios.

use crate::builder::ChangeUserSettings;
use crate::error::ScenarioError;
use crate::query_module::{column_key_by_name, QueryModule};
use crate::report::Checks;
use crate::search::{Endpoint, SeriesQuery};
use configuration::{ColumnOrder, Dataset, Fixtures, GroupingCase};
use core_types::{DataSetSettings, DatasetKind, Series, SortInfo, SortOrder};
use tracing::{debug, info};
use verification::paging::{page_count, verify_page};
use verification::{verify_multi_column_sort, TreeOrders};

/// Applies every grouping case of the dataset and verifies the order of the
/// grid, page and (for Magellan datasets) overview results.
pub async fn grouping_sorting_scenario(
    module: &QueryModule,
    fixtures: &Fixtures,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let context = CaseContext::load(module, fixtures, dataset).await?;
    for case in &context.cases {
        apply_grouping_case(module, &context, case, checks).await?;
    }
    Ok(())
}

/// Applies every grouping case, then walks each page size over the grid and
/// page endpoints. Every page must equal the matching slice of one large
/// reference page and keep the case's order.
pub async fn multiple_pages_scenario(
    module: &QueryModule,
    fixtures: &Fixtures,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let context = CaseContext::load(module, fixtures, dataset).await?;
    let verification = module.verification().clone();

    for case in &context.cases {
        let applied = apply_grouping_case(module, &context, case, checks).await?;

        let mut references = Vec::with_capacity(PAGED_ENDPOINTS.len());
        for endpoint in PAGED_ENDPOINTS {
            let reference = module.search(endpoint, &applied.settings, &applied.query).await?.series;
            if reference.is_empty() {
                return Err(ScenarioError::expectation(
                    format!("{} reference rows", endpoint.as_str()),
                    "at least one series",
                    0,
                ));
            }
            references.push((endpoint, reference));
        }

        for &page_size in &verification.page_sizes {
            let settings = store_page_size(module, dataset, page_size).await?;
            for (endpoint, reference) in &references {
                let pages = page_count(reference.len(), page_size);
                info!(endpoint = endpoint.as_str(), page_size, pages, reference = reference.len(), "Verifying paging");

                for page in 0..pages {
                    let query = applied.query.clone().at_offset(page_size * page);
                    let results = module.search(*endpoint, &settings, &query).await?;
                    verify_page(reference, &results.series, page_size, page)?;
                    applied.verify_order(&settings, &results.series, &context.tree_orders)?;
                    checks.record();
                }
            }
        }
    }
    Ok(())
}

const PAGED_ENDPOINTS: [Endpoint; 2] = [Endpoint::Grid, Endpoint::Page];

/// Fixture data shared by every grouping case of one dataset.
struct CaseContext<'a> {
    cases: Vec<&'a GroupingCase>,
    tree_orders: TreeOrders,
    base_query: SeriesQuery,
    endpoints: Vec<Endpoint>,
}

impl<'a> CaseContext<'a> {
    async fn load(module: &QueryModule, fixtures: &'a Fixtures, dataset: Dataset) -> Result<Self, ScenarioError> {
        let cases: Vec<&GroupingCase> = fixtures.grouping_cases(dataset).collect();
        if cases.is_empty() {
            return Err(ScenarioError::MissingFixture {
                what: "grouping".to_string(),
                dataset: dataset.to_string(),
            });
        }

        let mut endpoints = PAGED_ENDPOINTS.to_vec();
        if module.dataset_id(dataset)?.kind == DatasetKind::Magellan {
            endpoints.push(Endpoint::Overview);
        }
        Ok(Self {
            cases,
            tree_orders: tree_orders(fixtures, dataset),
            base_query: aggregate_query(module, fixtures, dataset).await?,
            endpoints,
        })
    }
}

/// A grouping case as stored on the service.
struct AppliedCase {
    settings: DataSetSettings,
    query: SeriesQuery,
    names: Vec<String>,
    orders: Vec<SortOrder>,
}

impl AppliedCase {
    fn verify_order(
        &self,
        settings: &DataSetSettings,
        rows: &[Series],
        tree_orders: &TreeOrders,
    ) -> Result<(), ScenarioError> {
        let columns = self
            .names
            .iter()
            .map(|name| Ok(cells(rows, column_key_by_name(settings, name)?)))
            .collect::<Result<Vec<_>, ScenarioError>>()?;
        verify_multi_column_sort(&columns, &self.orders, &self.names, tree_orders)?;
        Ok(())
    }
}

/// Stores the case's grouping and sorting with the largest page size and
/// verifies the order every endpoint returns.
async fn apply_grouping_case(
    module: &QueryModule,
    context: &CaseContext<'_>,
    case: &GroupingCase,
    checks: &mut Checks,
) -> Result<AppliedCase, ScenarioError> {
    let dataset = case.dataset;
    let (grouped_names, grouped_orders) = split(&case.grouped);
    let (sorted_names, sorted_orders) = split(&case.sorted);
    info!(grouped = ?grouped_names, sorted = ?sorted_names, "Verifying grouping and sorting");

    let mut settings = module.settings(dataset).await?;
    settings
        .change_user_settings()
        .add_multiple_grouping(&grouped_names, &grouped_orders)?
        .add_multiple_sorting(&sorted_names, &sorted_orders)?
        .change_page_size(module.verification().max_page_size);
    let requested = (
        settings.user_settings.grouping.clone(),
        settings.user_settings.sorting.clone(),
    );
    module.update_settings(&settings).await?;
    let settings = module.settings(dataset).await?;

    let uses_tree = grouped_orders.iter().chain(&sorted_orders).any(|o| *o == SortOrder::Tree);
    if !uses_tree {
        expect_persisted("grouping", &requested.0, &settings.user_settings.grouping)?;
        expect_persisted("sorting", &requested.1, &settings.user_settings.sorting)?;
        checks.record();
    }

    let applied = AppliedCase {
        query: context.base_query.clone().with_keyword(case.keyword.clone()),
        names: grouped_names.into_iter().chain(sorted_names).collect(),
        orders: grouped_orders.into_iter().chain(sorted_orders).collect(),
        settings,
    };

    for endpoint in &context.endpoints {
        let results = module.search(*endpoint, &applied.settings, &applied.query).await?;
        if results.series.is_empty() {
            return Err(ScenarioError::expectation(
                format!("{} rows", endpoint.as_str()),
                "at least one series",
                0,
            ));
        }
        applied.verify_order(&applied.settings, &results.series, &context.tree_orders)?;
        debug!(endpoint = endpoint.as_str(), rows = results.series.len(), "Order verified");
        checks.record();
    }
    Ok(applied)
}

async fn store_page_size(
    module: &QueryModule,
    dataset: Dataset,
    page_size: u32,
) -> Result<DataSetSettings, ScenarioError> {
    let mut settings = module.settings(dataset).await?;
    settings.change_user_settings().change_page_size(page_size);
    module.update_settings(&settings).await?;
    module.settings(dataset).await
}

/// Canonical orders keyed by column name, custom aggregates first.
fn tree_orders(fixtures: &Fixtures, dataset: Dataset) -> TreeOrders {
    let mut orders = TreeOrders::new();
    for entry in fixtures.tree_orders(dataset) {
        orders.insert(entry.column.clone(), entry.order.clone());
    }
    for entry in fixtures.custom_aggregates(dataset) {
        orders.prepend_custom_aggregates(&entry.column, &entry.names);
    }
    orders
}

/// When the dataset has custom aggregates, the search selects them next to
/// the default taxonomy members so they show up in the result.
async fn aggregate_query(
    module: &QueryModule,
    fixtures: &Fixtures,
    dataset: Dataset,
) -> Result<SeriesQuery, ScenarioError> {
    let names: Vec<&String> = fixtures
        .custom_aggregates(dataset)
        .flat_map(|entry| &entry.names)
        .collect();
    if names.is_empty() {
        return Ok(SeriesQuery::default());
    }

    let filters = module.taxonomy_filters(dataset).await?;
    let aggregate_ids = names
        .into_iter()
        .map(|name| {
            filters
                .item_id_by_name(name)
                .map(str::to_string)
                .ok_or_else(|| ScenarioError::FilterNotFound(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(filters = ?filters.filters_with_custom_aggregates(&aggregate_ids), "Selecting custom aggregates");
    Ok(SeriesQuery::taxonomy(&filters, 1, &aggregate_ids))
}

fn split(columns: &[ColumnOrder]) -> (Vec<String>, Vec<SortOrder>) {
    columns.iter().map(|c| (c.column.clone(), c.order)).unzip()
}

/// Displayed value of `key` for every row; rows without it yield "".
fn cells(series: &[Series], key: &str) -> Vec<String> {
    series
        .iter()
        .map(|s| s.display_attribute(key).unwrap_or_default().to_string())
        .collect()
}

fn expect_persisted(what: &str, requested: &[SortInfo], stored: &[SortInfo]) -> Result<(), ScenarioError> {
    if requested != stored {
        return Err(ScenarioError::expectation(
            format!("stored {what}"),
            format!("{requested:?}"),
            format!("{stored:?}"),
        ));
    }
    Ok(())
}
