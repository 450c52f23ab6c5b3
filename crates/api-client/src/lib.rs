use crate::error::ApiError;
use crate::responses::DataSetQuery;
use async_trait::async_trait;
use configuration::ServiceConfig;
use core_types::{
    DataSetId, DataSetSettings, SearchOptions, SearchResults, TaxonomyFilters,
    UpdateFiltersResponse,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

mod auth;
pub mod error;
pub mod responses;

// --- Public API ---
pub use auth::USER_HEADER;
pub use responses::ApiErrorResponse;

const DATASET_SETTINGS_PATH: &str = "/api/datasetsettings";
const RESET_GRID_PATH: &str = "/api/grid/reset";
const GRID_PATH: &str = "/api/grid";
const PAGE_PATH: &str = "/api/grid/page";
const OVERVIEW_PATH: &str = "/api/grid/overview";
const TAXONOMY_FILTERS_PATH: &str = "/api/filters/taxonomy";

/// The abstract interface of the Application's query service.
/// Scenarios only talk to this trait, so the HTTP client can be swapped for
/// an in-memory fake in tests.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Reads the current user's display settings for a dataset.
    async fn dataset_settings(&self, data_set: &DataSetId) -> Result<DataSetSettings, ApiError>;

    /// Stores display settings. The service answers `{ success: bool }`.
    async fn update_dataset_settings(
        &self,
        settings: &DataSetSettings,
    ) -> Result<UpdateFiltersResponse, ApiError>;

    /// Restores the dataset's default grid settings and returns them.
    async fn reset_grid(&self, data_set: &DataSetId) -> Result<DataSetSettings, ApiError>;

    /// Full grid query: series plus totals and subtotal summaries.
    async fn grid(&self, options: &SearchOptions) -> Result<SearchResults, ApiError>;

    /// One page of the grid at `options.page`.
    async fn page(&self, options: &SearchOptions) -> Result<SearchResults, ApiError>;

    /// Overview query; only Magellan datasets answer it.
    async fn overview(&self, options: &SearchOptions) -> Result<SearchResults, ApiError>;

    /// The taxonomy filter tree of a dataset.
    async fn taxonomy_filters(&self, data_set: &DataSetId) -> Result<TaxonomyFilters, ApiError>;
}

/// A concrete implementation of `QueryService` over the Application's JSON API.
#[derive(Clone)]
pub struct ApplicationClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApplicationClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .default_headers(auth::default_headers(&config.user, &config.token)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn dataset_url(&self, path: &str, data_set: &DataSetId) -> Result<String, ApiError> {
        let query = serde_qs::to_string(&DataSetQuery::from(data_set))
            .map_err(|e| ApiError::InvalidConfig(format!("cannot encode dataset id: {e}")))?;
        Ok(format!("{}?{}", self.url(path), query))
    }

    /// Sends a request and decodes a JSON body, mapping non-2xx answers to
    /// `ApiError::Service` with the service's own message when it sent one.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            Err(ApiError::Service {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn search(&self, path: &str, options: &SearchOptions) -> Result<SearchResults, ApiError> {
        let url = self.url(path);
        debug!(%url, offset = options.page.offset, limit = options.page.limit, "Searching");
        self.send(self.client.post(&url).json(options)).await
    }
}

#[async_trait]
impl QueryService for ApplicationClient {
    async fn dataset_settings(&self, data_set: &DataSetId) -> Result<DataSetSettings, ApiError> {
        let url = self.dataset_url(DATASET_SETTINGS_PATH, data_set)?;
        debug!(%url, "Fetching dataset settings");
        self.send(self.client.get(&url)).await
    }

    async fn update_dataset_settings(
        &self,
        settings: &DataSetSettings,
    ) -> Result<UpdateFiltersResponse, ApiError> {
        let url = self.url(DATASET_SETTINGS_PATH);
        debug!(%url, data_set = settings.data_set.id, "Updating dataset settings");
        self.send(self.client.put(&url).json(settings)).await
    }

    async fn reset_grid(&self, data_set: &DataSetId) -> Result<DataSetSettings, ApiError> {
        let url = self.dataset_url(RESET_GRID_PATH, data_set)?;
        debug!(%url, "Resetting grid settings");
        self.send(self.client.post(&url)).await
    }

    async fn grid(&self, options: &SearchOptions) -> Result<SearchResults, ApiError> {
        self.search(GRID_PATH, options).await
    }

    async fn page(&self, options: &SearchOptions) -> Result<SearchResults, ApiError> {
        self.search(PAGE_PATH, options).await
    }

    async fn overview(&self, options: &SearchOptions) -> Result<SearchResults, ApiError> {
        self.search(OVERVIEW_PATH, options).await
    }

    async fn taxonomy_filters(&self, data_set: &DataSetId) -> Result<TaxonomyFilters, ApiError> {
        let url = self.dataset_url(TAXONOMY_FILTERS_PATH, data_set)?;
        debug!(%url, "Fetching taxonomy filters");
        self.send(self.client.get(&url)).await
    }
}
