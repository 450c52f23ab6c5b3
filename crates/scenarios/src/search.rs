use core_types::{
    DataSetSettings, FilterState, Frequency, Page, SearchFilters, SearchOptions, SortInfo,
    TaxonomyFilters,
};

/// Taxonomy filter whose selection is the frequency rather than a member.
const FREQUENCY_FILTER: &str = "frequency";
const ANNUAL_FREQUENCY_ID: &str = "1";

/// Which query endpoint a search goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Grid,
    Page,
    Overview,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Grid => "grid",
            Endpoint::Page => "page",
            Endpoint::Overview => "overview",
        }
    }
}

/// What to look for, independent of the user's stored display settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesQuery {
    pub keyword: Option<String>,
    pub frequency: Option<Frequency>,
    pub taxonomy_filters: Vec<FilterState>,
    pub offset: u32,
}

impl SeriesQuery {
    /// Keyword search for one mnemonic, restricted to the frequency its suffix names.
    pub fn mnemonic(mnemonic: &str, frequency: Frequency) -> Self {
        Self {
            keyword: Some(mnemonic.to_string()),
            frequency: Some(frequency),
            ..Default::default()
        }
    }

    /// Selects default members of every taxonomy filter.
    pub fn taxonomy(filters: &TaxonomyFilters, required: usize, aggregate_ids: &[String]) -> Self {
        let taxonomy_filters = filters
            .filters
            .iter()
            .map(|filter| {
                let values = if filter.id == FREQUENCY_FILTER {
                    vec![ANNUAL_FREQUENCY_ID.to_string()]
                } else {
                    filter.default_selection(required, aggregate_ids)
                };
                FilterState {
                    filter_id: filter.id.clone(),
                    values,
                }
            })
            .collect();

        Self {
            frequency: Some(Frequency::Annual),
            taxonomy_filters,
            ..Default::default()
        }
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn at_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Builds the request envelope from stored settings and a query.
///
/// When the settings group rows, the grouped fields lead the sort list and
/// the observation count is capped at `observations_limit`.
pub fn build_search_options(
    settings: &DataSetSettings,
    query: &SeriesQuery,
    observations_limit: u32,
) -> SearchOptions {
    let user = &settings.user_settings;
    let grouped = user.is_grouped();

    let sort: Vec<SortInfo> = if grouped {
        user.grouping.iter().chain(&user.sorting).cloned().collect()
    } else {
        user.sorting.clone()
    };

    SearchOptions {
        filters: SearchFilters {
            data_set: settings.data_set.clone(),
            keyword: query.keyword.clone(),
            frequency: query.frequency.map(|f| f.as_str().to_string()),
            taxonomy_filters: query.taxonomy_filters.clone(),
        },
        sort,
        page: Page {
            offset: query.offset,
            limit: user.page_size,
        },
        date_range: user.date_range.clone(),
        applied_functions: user.applied_functions.clone(),
        grouped_columns: user.grouping.iter().map(|g| g.field.clone()).collect(),
        is_subtotals_enabled: user.is_subtotals_enabled,
        observations_limit: grouped.then_some(observations_limit),
    }
}
