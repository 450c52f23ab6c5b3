use crate::error::ScenarioError;
use crate::search::{build_search_options, Endpoint, SeriesQuery};
use api_client::QueryService;
use configuration::{Dataset, Fixtures, VerificationConfig};
use core_types::{
    AppliedFunction, AppliedFunctionSettings, DataSetId, DataSetSettings, Frequency, Function,
    SearchResults, Series, TaxonomyFilters,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// The scenarios' gateway to the Application: dataset catalog, settings
/// read-modify-write, and searches built from stored settings.
#[derive(Clone)]
pub struct QueryModule {
    service: Arc<dyn QueryService>,
    catalog: HashMap<Dataset, DataSetId>,
    verification: VerificationConfig,
}

impl QueryModule {
    pub fn new(
        service: Arc<dyn QueryService>,
        fixtures: &Fixtures,
        verification: VerificationConfig,
    ) -> Self {
        let catalog = fixtures
            .datasets
            .iter()
            .map(|d| (d.name, DataSetId { id: d.id, kind: d.kind }))
            .collect();
        Self {
            service,
            catalog,
            verification,
        }
    }

    pub fn verification(&self) -> &VerificationConfig {
        &self.verification
    }

    pub fn dataset_id(&self, dataset: Dataset) -> Result<DataSetId, ScenarioError> {
        self.catalog
            .get(&dataset)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownDataset(dataset.to_string()))
    }

    pub async fn settings(&self, dataset: Dataset) -> Result<DataSetSettings, ScenarioError> {
        let id = self.dataset_id(dataset)?;
        Ok(self.service.dataset_settings(&id).await?)
    }

    /// Stores `settings`; an answer of `{ success: false }` is an error.
    pub async fn update_settings(&self, settings: &DataSetSettings) -> Result<(), ScenarioError> {
        let response = self.service.update_dataset_settings(settings).await?;
        if !response.success {
            return Err(ScenarioError::UpdateRejected(settings.data_set.id.to_string()));
        }
        Ok(())
    }

    pub async fn reset_grid(&self, dataset: Dataset) -> Result<DataSetSettings, ScenarioError> {
        let id = self.dataset_id(dataset)?;
        info!(%dataset, "Resetting grid settings");
        Ok(self.service.reset_grid(&id).await?)
    }

    /// Restores the dataset's default applied functions and clears rebasing.
    pub async fn reset_taxonomy_filters(&self, dataset: Dataset) -> Result<(), ScenarioError> {
        let mut settings = self.settings(dataset).await?;
        settings.user_settings.applied_functions = AppliedFunctionSettings {
            functions: default_functions(dataset),
            replace_original_series: false,
            ..Default::default()
        };
        debug!(%dataset, "Restoring default functions");
        self.update_settings(&settings).await
    }

    /// Replaces the applied functions of `settings` and stores them.
    pub async fn add_functions(
        &self,
        settings: &mut DataSetSettings,
        functions: Vec<AppliedFunction>,
    ) -> Result<(), ScenarioError> {
        settings.user_settings.applied_functions = AppliedFunctionSettings::new(functions);
        self.update_settings(settings).await
    }

    pub async fn taxonomy_filters(&self, dataset: Dataset) -> Result<TaxonomyFilters, ScenarioError> {
        let id = self.dataset_id(dataset)?;
        Ok(self.service.taxonomy_filters(&id).await?)
    }

    pub async fn search(
        &self,
        endpoint: Endpoint,
        settings: &DataSetSettings,
        query: &SeriesQuery,
    ) -> Result<SearchResults, ScenarioError> {
        let options = build_search_options(settings, query, self.verification.observations_limit);
        debug!(
            endpoint = endpoint.as_str(),
            offset = options.page.offset,
            keyword = ?options.filters.keyword,
            "Searching"
        );
        let results = match endpoint {
            Endpoint::Grid => self.service.grid(&options).await?,
            Endpoint::Page => self.service.page(&options).await?,
            Endpoint::Overview => self.service.overview(&options).await?,
        };
        Ok(results)
    }

    /// Grid search for a mnemonic. Returns every series found plus the one
    /// whose `default_mnemonic` contains it.
    pub async fn find_series(
        &self,
        settings: &DataSetSettings,
        mnemonic: &str,
    ) -> Result<(Vec<Series>, Series), ScenarioError> {
        let frequency = Frequency::from_mnemonic(mnemonic)?;
        let results = self
            .search(Endpoint::Grid, settings, &SeriesQuery::mnemonic(mnemonic, frequency))
            .await?;
        let single = single_series(&results.series, mnemonic)?.clone();
        Ok((results.series, single))
    }

    /// Sets a column's `hidden` flag, storing and re-reading the settings
    /// only when it changes.
    pub async fn show_hide_column(
        &self,
        dataset: Dataset,
        mut settings: DataSetSettings,
        column_name: &str,
        hidden: bool,
    ) -> Result<DataSetSettings, ScenarioError> {
        let column = settings
            .user_settings
            .columns
            .iter_mut()
            .find(|c| c.header_text == column_name)
            .ok_or_else(|| ScenarioError::ColumnNotFound(column_name.to_string()))?;
        if column.hidden == hidden {
            return Ok(settings);
        }
        column.hidden = hidden;
        self.update_settings(&settings).await?;
        self.settings(dataset).await
    }
}

/// Applied functions a dataset starts with.
pub fn default_functions(dataset: Dataset) -> Vec<AppliedFunction> {
    match dataset {
        Dataset::WorldMarketMonitor => vec![
            AppliedFunction::new(Function::Annualization, "Original"),
            AppliedFunction::new(Function::CurrencyConversion, "ORIGINAL"),
            AppliedFunction::new(Function::Rescaling, "Harmonized"),
        ],
        Dataset::GlobalEconomyNew => vec![
            AppliedFunction::new(Function::CurrencyConversion, "ORIGINAL"),
            AppliedFunction::new(Function::Rescaling, "Harmonized"),
        ],
        Dataset::Banking | Dataset::PricingAndPurchasingForecasts => {
            vec![AppliedFunction::new(Function::CurrencyConversion, "ORIGINAL")]
        }
        Dataset::ConstructionGlobal | Dataset::ComparativeIndustryRev4 => vec![AppliedFunction::new(
            Function::CurrencyConversion,
            "[Currency].[Currency].&[USREXA]",
        )],
        Dataset::AssetCapacityByCompany | Dataset::AssetCapacityByShareholder => {
            vec![AppliedFunction::new(Function::UnitConversion, "000MetricTons")]
        }
    }
}

/// The only series whose `default_mnemonic` contains `mnemonic`.
pub fn single_series<'a>(series: &'a [Series], mnemonic: &str) -> Result<&'a Series, ScenarioError> {
    let mut matching = series.iter().filter(|s| s.matches_mnemonic(mnemonic));
    match (matching.next(), matching.next()) {
        (Some(found), None) => Ok(found),
        (first, _) => {
            let found = first.map_or(0, |_| 2 + matching.count());
            Err(ScenarioError::SeriesNotFound {
                mnemonic: mnemonic.to_string(),
                found,
            })
        }
    }
}

pub fn column_key_by_name<'a>(
    settings: &'a DataSetSettings,
    column_name: &str,
) -> Result<&'a str, ScenarioError> {
    settings
        .user_settings
        .columns
        .iter()
        .find(|c| c.header_text == column_name)
        .map(|c| c.key.as_str())
        .ok_or_else(|| ScenarioError::ColumnNotFound(column_name.to_string()))
}

pub fn column_name_by_key<'a>(
    settings: &'a DataSetSettings,
    column_key: &str,
) -> Result<&'a str, ScenarioError> {
    settings
        .user_settings
        .column(column_key)
        .map(|c| c.header_text.as_str())
        .ok_or_else(|| ScenarioError::ColumnNotFound(column_key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{SeriesValue, attributes};
    use pretty_assertions::assert_eq;

    fn series(mnemonic: &str) -> Series {
        Series::new(mnemonic, Frequency::Annual, Vec::<SeriesValue>::new())
            .with_attribute(attributes::DEFAULT_MNEMONIC, mnemonic)
    }

    #[test]
    fn single_series_requires_exactly_one_match() {
        let found = vec![series("AFGN1GDPCO.A"), series("AFGN1RX.A"), series("AFGN1RXEND.A")];

        assert_eq!(single_series(&found, "AFGN1GDPCO").unwrap().id, "AFGN1GDPCO.A");
        assert!(matches!(
            single_series(&found, "AFGN1RX"),
            Err(ScenarioError::SeriesNotFound { found: 2, .. })
        ));
        assert!(matches!(
            single_series(&found, "KHMN1RX"),
            Err(ScenarioError::SeriesNotFound { found: 0, .. })
        ));
    }

    #[test]
    fn default_functions_per_dataset() {
        let wmm = default_functions(Dataset::WorldMarketMonitor);
        assert_eq!(wmm.len(), 3);
        assert!(wmm.iter().any(|f| f.is(Function::Rescaling) && f.parameter == "Harmonized"));

        let asset = default_functions(Dataset::AssetCapacityByShareholder);
        assert_eq!(asset, vec![AppliedFunction::new(Function::UnitConversion, "000MetricTons")]);
    }
}
