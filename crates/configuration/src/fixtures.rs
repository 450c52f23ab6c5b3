use chrono::NaiveDate;
use core_types::{Annualization, DatasetKind};
use serde::Deserialize;

/// Datasets the scenarios know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    WorldMarketMonitor,
    GlobalEconomyNew,
    Banking,
    PricingAndPurchasingForecasts,
    ConstructionGlobal,
    ComparativeIndustryRev4,
    AssetCapacityByCompany,
    AssetCapacityByShareholder,
}

impl Dataset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::WorldMarketMonitor => "world_market_monitor",
            Dataset::GlobalEconomyNew => "global_economy_new",
            Dataset::Banking => "banking",
            Dataset::PricingAndPurchasingForecasts => "pricing_and_purchasing_forecasts",
            Dataset::ConstructionGlobal => "construction_global",
            Dataset::ComparativeIndustryRev4 => "comparative_industry_rev4",
            Dataset::AssetCapacityByCompany => "asset_capacity_by_company",
            Dataset::AssetCapacityByShareholder => "asset_capacity_by_shareholder",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test data loaded from `fixtures.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixtures {
    pub datasets: Vec<DatasetEntry>,
    #[serde(default)]
    pub tree_orders: Vec<TreeOrderEntry>,
    #[serde(default)]
    pub custom_aggregates: Vec<CustomAggregateEntry>,
    #[serde(default)]
    pub grouping_cases: Vec<GroupingCase>,
    #[serde(default)]
    pub wmm: Vec<WmmFixtures>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub name: Dataset,
    pub id: i32,
    pub kind: DatasetKind,
    /// Currency conversion parameter that must change the grid values, e.g. `LCU`.
    #[serde(default)]
    pub local_currency: Option<String>,
}

/// Canonical member order of one column, used for `Tree` sorting.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeOrderEntry {
    pub dataset: Dataset,
    pub column: String,
    pub order: Vec<String>,
}

/// Names of the custom aggregates shown ahead of a column's taxonomy members.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomAggregateEntry {
    pub dataset: Dataset,
    pub column: String,
    pub names: Vec<String>,
}

/// One grouping/sorting combination to exercise.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupingCase {
    pub dataset: Dataset,
    #[serde(default)]
    pub grouped: Vec<ColumnOrder>,
    #[serde(default)]
    pub sorted: Vec<ColumnOrder>,
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnOrder {
    pub column: String,
    pub order: core_types::SortOrder,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetCurrency {
    /// Value sent as the conversion parameter, e.g. `KHR`.
    pub parameter: String,
    /// Name the `unit` column shows afterwards, e.g. `Cambodian Riel`.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionMnemonics {
    pub series: String,
    /// USD exchange rate of the series' own currency.
    #[serde(default)]
    pub source_fx: Option<String>,
    /// USD exchange rate of the target currency.
    pub target_fx: String,
}

/// Mnemonic stems; the `.A`/`.Q` suffix is appended per run.
#[derive(Debug, Clone, Deserialize)]
pub struct RealRebasingMnemonics {
    pub series: String,
    /// Nominal counterpart of `series`.
    pub nominal: String,
    /// Real series whose base-period value is the denominator.
    pub target_base_period: String,
}

/// Mnemonics to annualize with one choice; annual ones check the no-op.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnualizationCase {
    pub mode: Annualization,
    pub mnemonics: Vec<String>,
}

/// Full mnemonics for the chained recalculation run.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceMnemonics {
    pub series: String,
    pub nominal: String,
    pub target_base_period: String,
    pub source_fx: String,
    pub target_fx: String,
}

/// Mnemonic tables for the recalculation scenarios of one dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct WmmFixtures {
    pub dataset: Dataset,
    /// Dataset the exchange-rate series are searched in, when not `dataset` itself.
    #[serde(default)]
    pub rates_dataset: Option<Dataset>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rebasing_base_date: NaiveDate,
    pub target_currency: TargetCurrency,
    #[serde(default)]
    pub rescale: Vec<String>,
    #[serde(default)]
    pub annualization: Vec<AnnualizationCase>,
    #[serde(default)]
    pub index_rebasing: Vec<String>,
    #[serde(default)]
    pub nominal_conversions: Vec<ConversionMnemonics>,
    #[serde(default)]
    pub real_conversions: Vec<ConversionMnemonics>,
    #[serde(default)]
    pub exchange_rate_conversions: Vec<ConversionMnemonics>,
    #[serde(default)]
    pub real_rebasing: Vec<RealRebasingMnemonics>,
    #[serde(default)]
    pub sequence: Option<SequenceMnemonics>,
}

impl Fixtures {
    pub fn dataset(&self, name: Dataset) -> Option<&DatasetEntry> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn wmm(&self, name: Dataset) -> Option<&WmmFixtures> {
        self.wmm.iter().find(|w| w.dataset == name)
    }

    pub fn tree_orders(&self, name: Dataset) -> impl Iterator<Item = &TreeOrderEntry> {
        self.tree_orders.iter().filter(move |t| t.dataset == name)
    }

    pub fn custom_aggregates(&self, name: Dataset) -> impl Iterator<Item = &CustomAggregateEntry> {
        self.custom_aggregates.iter().filter(move |c| c.dataset == name)
    }

    pub fn grouping_cases(&self, name: Dataset) -> impl Iterator<Item = &GroupingCase> {
        self.grouping_cases.iter().filter(move |g| g.dataset == name)
    }
}
