//! # gridcheck Scenarios
//!
//! End-to-end verification flows against a live Application. Every flow
//! reshapes the stored dataset settings, queries the service, and hands the
//! returned series to `verification` together with what it expects.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Orchestration:** the only crate that knows both the service
//!   (`api-client`) and the verifiers (`verification`). It owns no maths.
//! - **Sequential by Nature:** scenarios mutate the user's server-side
//!   settings, so calls are awaited one at a time and scenarios never run
//!   concurrently on the same dataset.
//! - **Clean Slate:** the grid is reset before and after every scenario,
//!   including after a failure.
//!
//! ## Public API
//!
//! - `QueryModule`: settings read-modify-write and searches over a `QueryService`.
//! - `UserSettingsBuilder` / `ChangeUserSettings`: fluent settings edits.
//! - `ScenarioKind` and `run_scenario`: the entry point used by the CLI.

pub mod builder;
pub mod display;
pub mod error;
pub mod grouping;
pub mod query_module;
pub mod report;
pub mod search;
pub mod subtotals;
pub mod wmm;

pub use builder::{ChangeUserSettings, UserSettingsBuilder};
pub use error::ScenarioError;
pub use query_module::QueryModule;
pub use report::{Checks, Outcome, ScenarioReport};
pub use search::{Endpoint, SeriesQuery};

use configuration::{Dataset, Fixtures};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;
use verification::wmm::ConversionKind;

/// Every scenario the CLI can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ScenarioKind {
    Rescale,
    Annualization,
    NominalCurrency,
    RealCurrency,
    ExchangeRateCurrency,
    IndexRebasing,
    RealValueRebasing,
    WmmSequence,
    GroupingSorting,
    MultiplePages,
    GrandTotalOnly,
    SubtotalsAll,
    DisplaySettings,
    GridValues,
}

impl ScenarioKind {
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::Rescale,
            ScenarioKind::Annualization,
            ScenarioKind::NominalCurrency,
            ScenarioKind::RealCurrency,
            ScenarioKind::ExchangeRateCurrency,
            ScenarioKind::IndexRebasing,
            ScenarioKind::RealValueRebasing,
            ScenarioKind::WmmSequence,
            ScenarioKind::GroupingSorting,
            ScenarioKind::MultiplePages,
            ScenarioKind::GrandTotalOnly,
            ScenarioKind::SubtotalsAll,
            ScenarioKind::DisplaySettings,
            ScenarioKind::GridValues,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Rescale => "rescale",
            ScenarioKind::Annualization => "annualization",
            ScenarioKind::NominalCurrency => "nominal-currency",
            ScenarioKind::RealCurrency => "real-currency",
            ScenarioKind::ExchangeRateCurrency => "exchange-rate-currency",
            ScenarioKind::IndexRebasing => "index-rebasing",
            ScenarioKind::RealValueRebasing => "real-value-rebasing",
            ScenarioKind::WmmSequence => "wmm-sequence",
            ScenarioKind::GroupingSorting => "grouping-sorting",
            ScenarioKind::MultiplePages => "multiple-pages",
            ScenarioKind::GrandTotalOnly => "grand-total-only",
            ScenarioKind::SubtotalsAll => "subtotals-all",
            ScenarioKind::DisplaySettings => "display-settings",
            ScenarioKind::GridValues => "grid-values",
        }
    }

    /// Recalculation scenarios, which also change the applied functions.
    pub fn is_wmm(&self) -> bool {
        matches!(
            self,
            ScenarioKind::Rescale
                | ScenarioKind::Annualization
                | ScenarioKind::NominalCurrency
                | ScenarioKind::RealCurrency
                | ScenarioKind::ExchangeRateCurrency
                | ScenarioKind::IndexRebasing
                | ScenarioKind::RealValueRebasing
                | ScenarioKind::WmmSequence
        )
    }

    /// Scenarios that change the applied functions and must restore them.
    pub fn changes_functions(&self) -> bool {
        self.is_wmm() || *self == ScenarioKind::GridValues
    }

    /// Datasets the fixtures provide data for.
    pub fn datasets(&self, fixtures: &Fixtures) -> Vec<Dataset> {
        let mut datasets: Vec<Dataset> = if self.is_wmm() {
            fixtures.wmm.iter().map(|w| w.dataset).collect()
        } else if matches!(self, ScenarioKind::GroupingSorting | ScenarioKind::MultiplePages) {
            fixtures.grouping_cases.iter().map(|g| g.dataset).collect()
        } else {
            fixtures.datasets.iter().map(|d| d.name).collect()
        };
        let mut seen = Vec::new();
        datasets.retain(|d| {
            let first = !seen.contains(d);
            seen.push(*d);
            first
        });
        datasets
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs one scenario on one dataset and reports the outcome.
///
/// Failures are logged and captured in the report rather than returned, so a
/// caller can run the remaining scenarios.
pub async fn run_scenario(
    module: &QueryModule,
    fixtures: &Fixtures,
    kind: ScenarioKind,
    dataset: Dataset,
) -> ScenarioReport {
    let run_id = Uuid::new_v4();
    let span = info_span!("scenario", %run_id, scenario = kind.as_str(), %dataset);

    async move {
        info!("Starting scenario");
        let mut checks = Checks::new();

        let result = match reset(module, kind, dataset).await {
            Ok(()) => run_flow(module, fixtures, kind, dataset, &mut checks).await,
            Err(e) => Err(e),
        };
        let cleanup = reset(module, kind, dataset).await;

        let outcome = match (result, cleanup) {
            (Err(e), _) => {
                error!(error = %e, checks = checks.count(), "Scenario failed");
                Outcome::Failed(e.to_string())
            }
            (Ok(()), Err(e)) => {
                error!(error = %e, "Resetting the dataset after the scenario failed");
                Outcome::Failed(format!("cleanup: {e}"))
            }
            (Ok(()), Ok(())) => {
                info!(checks = checks.count(), "Scenario passed");
                Outcome::Passed
            }
        };

        ScenarioReport {
            run_id,
            scenario: kind.as_str().to_string(),
            dataset,
            checks: checks.count(),
            outcome,
        }
    }
    .instrument(span)
    .await
}

async fn reset(module: &QueryModule, kind: ScenarioKind, dataset: Dataset) -> Result<(), ScenarioError> {
    module.reset_grid(dataset).await?;
    if kind.changes_functions() {
        module.reset_taxonomy_filters(dataset).await?;
    }
    Ok(())
}

async fn run_flow(
    module: &QueryModule,
    fixtures: &Fixtures,
    kind: ScenarioKind,
    dataset: Dataset,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let wmm_fixtures = || {
        fixtures.wmm(dataset).ok_or_else(|| ScenarioError::MissingFixture {
            what: "wmm".to_string(),
            dataset: dataset.to_string(),
        })
    };

    match kind {
        ScenarioKind::Rescale => wmm::rescale_scenario(module, wmm_fixtures()?, checks).await,
        ScenarioKind::Annualization => wmm::annualization_scenario(module, wmm_fixtures()?, checks).await,
        ScenarioKind::NominalCurrency => {
            wmm::currency_conversion_scenario(module, wmm_fixtures()?, ConversionKind::Nominal, checks).await
        }
        ScenarioKind::RealCurrency => {
            wmm::currency_conversion_scenario(module, wmm_fixtures()?, ConversionKind::Real, checks).await
        }
        ScenarioKind::ExchangeRateCurrency => {
            wmm::currency_conversion_scenario(module, wmm_fixtures()?, ConversionKind::ExchangeRate, checks)
                .await
        }
        ScenarioKind::IndexRebasing => wmm::rebase_indices_scenario(module, wmm_fixtures()?, checks).await,
        ScenarioKind::RealValueRebasing => {
            wmm::rebase_real_values_scenario(module, wmm_fixtures()?, checks).await
        }
        ScenarioKind::WmmSequence => wmm::wmm_sequence_scenario(module, wmm_fixtures()?, checks).await,
        ScenarioKind::GroupingSorting => {
            grouping::grouping_sorting_scenario(module, fixtures, dataset, checks).await
        }
        ScenarioKind::MultiplePages => {
            grouping::multiple_pages_scenario(module, fixtures, dataset, checks).await
        }
        ScenarioKind::GrandTotalOnly => subtotals::grand_total_only_scenario(module, dataset, checks).await,
        ScenarioKind::SubtotalsAll => subtotals::subtotals_all_scenario(module, dataset, checks).await,
        ScenarioKind::DisplaySettings => display::display_settings_scenario(module, dataset, checks).await,
        ScenarioKind::GridValues => display::grid_values_scenario(module, fixtures, dataset, checks).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_is_listed_once() {
        let all = ScenarioKind::all();
        assert_eq!(all.len(), 14);
        assert_eq!(all.iter().filter(|k| k.is_wmm()).count(), 8);
        let mut names: Vec<_> = all.iter().map(ScenarioKind::as_str).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), all.len());
        assert!(ScenarioKind::GridValues.changes_functions());
        assert!(!ScenarioKind::DisplaySettings.changes_functions());
    }
}
