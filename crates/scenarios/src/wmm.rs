//! WMM recalculation scenarios.
//!
//! Every flow follows the same shape: fetch a series with the function
//! switched off, recalculate it locally, switch the function on, fetch it
//! again and compare. Grid columns that describe the function (`scale`,
//! `unit`, `WmmAnnualized`, `base_period`) are checked alongside the values.

use crate::builder::ChangeUserSettings;
use crate::error::ScenarioError;
use crate::query_module::{default_functions, QueryModule};
use crate::report::Checks;
use configuration::{ConversionMnemonics, Dataset, WmmFixtures};
use core_types::{
    attributes, AppliedFunction, Annualization, DataSetSettings, DateRangeOptions, Frequency,
    Function, RebasingBase, RebasingSettings, Series,
};
use tracing::info;
use verification::columns::column_values;
use verification::wmm::{
    annualize, convert_currency, rebase_real_values, rescale, should_rebase, verify_base_period,
    ConversionKind, ExchangeRates, RebasingTarget,
};
use verification::{apply_all, verify_series_matches, Transform};

const INDEX_BASE_VALUE: i32 = 100;
const REBASING_FREQUENCIES: [Frequency; 3] =
    [Frequency::Annual, Frequency::Quarterly, Frequency::Monthly];
const REAL_REBASING_FREQUENCIES: [Frequency; 2] = [Frequency::Annual, Frequency::Quarterly];
const SEQUENCE_BASE: Frequency = Frequency::Quarterly;
const SEQUENCE_ANNUALIZATION: Annualization = Annualization::NonAnnualized;

pub async fn rescale_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    for mnemonic in &wmm.rescale {
        info!(%mnemonic, "Verifying rescaling");
        let mut settings = with_functions(module, dataset, None, vec![rescaling("Original")]).await?;

        let (found, original) = module.find_series(&settings, mnemonic).await?;
        let scale = first_column_value(&found, attributes::SCALE)?;
        let target_scale = first_column_value(&found, attributes::WMM_DEFAULT_TARGET_SCALE)?;
        if scale == target_scale {
            return Err(ScenarioError::expectation(
                format!("{mnemonic} scale before rescaling"),
                format!("anything but {target_scale}"),
                scale,
            ));
        }
        let expected = rescale(&original)?;

        module.add_functions(&mut settings, vec![rescaling("Harmonized")]).await?;
        let settings = module.settings(dataset).await?;
        let (found, server) = module.find_series(&settings, mnemonic).await?;

        verify_series_matches(&expected, &server, decimal_places(module), Frequency::Annual.as_str())?;
        checks.record();
        expect_column(&found, attributes::SCALE, &first_column_value(&found, attributes::WMM_DEFAULT_TARGET_SCALE)?)?;
        checks.record();
    }
    Ok(())
}

pub async fn annualization_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    for case in &wmm.annualization {
        for mnemonic in &case.mnemonics {
            info!(%mnemonic, mode = ?case.mode, "Verifying annualization");
            let original_choice = Annualization::Original;
            let mut settings =
                with_functions(module, dataset, None, vec![annualization(original_choice)]).await?;

            let (found, original) = module.find_series(&settings, mnemonic).await?;
            expect_column(&found, attributes::WMM_ANNUALIZED, original_choice.display_name())?;
            let expected = annualize(&original, case.mode);

            module.add_functions(&mut settings, vec![annualization(case.mode)]).await?;
            let settings = module.settings(dataset).await?;
            let (found, server) = module.find_series(&settings, mnemonic).await?;

            verify_series_matches(&expected, &server, decimal_places(module), Frequency::Annual.as_str())?;
            checks.record();
            let label = expected
                .display_attribute(attributes::WMM_ANNUALIZED)
                .unwrap_or(original_choice.display_name());
            expect_column(&found, attributes::WMM_ANNUALIZED, label)?;
            checks.record();
        }
    }
    Ok(())
}

pub async fn currency_conversion_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    kind: ConversionKind,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    let rates_dataset = wmm.rates_dataset.unwrap_or(dataset);
    let cases = match kind {
        ConversionKind::Nominal => &wmm.nominal_conversions,
        ConversionKind::Real => &wmm.real_conversions,
        ConversionKind::ExchangeRate => &wmm.exchange_rate_conversions,
    };

    for case in cases {
        info!(mnemonic = %case.series, ?kind, "Verifying currency conversion");
        let rates_settings = if rates_dataset == dataset {
            None
        } else {
            Some(with_date_range(module, rates_dataset, wmm).await?)
        };
        let mut settings =
            with_functions(module, dataset, Some(wmm), vec![rescaling("Original")]).await?;
        let rates_settings = rates_settings.as_ref().unwrap_or(&settings);

        let (_, original) = module.find_series(&settings, &case.series).await?;
        let (source, target) = exchange_rates(module, rates_settings, case, kind).await?;
        expect_function(&original, "")?;

        let rates = ExchangeRates {
            source: source.as_ref(),
            target: &target,
        };
        let expected = convert_currency(&original, kind, rates, None)?;

        let mut functions = vec![AppliedFunction::new(
            Function::CurrencyConversion,
            wmm.target_currency.parameter.clone(),
        )];
        if default_functions(dataset).iter().any(|f| f.is(Function::Rescaling)) {
            functions.push(rescaling("Original"));
        }
        module.add_functions(&mut settings, functions).await?;
        let settings = module.settings(dataset).await?;
        let (found, server) = module.find_series(&settings, &case.series).await?;

        verify_series_matches(&expected, &server, decimal_places(module), Frequency::Annual.as_str())?;
        checks.record();
        if kind != ConversionKind::ExchangeRate {
            expect_function(&server, &converted_to(wmm))?;
        }
        expect_column(&found, attributes::UNIT, &wmm.target_currency.name)?;
        checks.record();

        module.reset_grid(dataset).await?;
        module.reset_taxonomy_filters(dataset).await?;
    }
    Ok(())
}

pub async fn rebase_indices_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    let base_period = wmm.rebasing_base_date;

    for mnemonic in &wmm.index_rebasing {
        for base in REBASING_FREQUENCIES {
            info!(%mnemonic, %base, "Verifying index rebasing");
            let mut settings =
                with_functions(module, dataset, Some(wmm), vec![rescaling("Original")]).await?;
            let (_, original) = module.find_series(&settings, mnemonic).await?;

            settings.user_settings.applied_functions.rebasing = RebasingSettings::indices(
                base_period,
                RebasingBase::from_frequency(base)?,
                INDEX_BASE_VALUE,
            );
            module.update_settings(&settings).await?;
            let (_, server) = module.find_series(&settings, mnemonic).await?;

            let rebased = should_rebase(RebasingTarget::Indices, base, original.frequency)?;
            let expected = Transform::RebaseIndices {
                base,
                base_period,
                target_base_value: f64::from(INDEX_BASE_VALUE),
            }
            .apply(&original)?;

            verify_series_matches(&expected, &server, decimal_places(module), base.as_str())?;
            checks.record();
            verify_base_period(&server, rebased, base, base_period)?;
            checks.record();
        }
    }
    Ok(())
}

pub async fn rebase_real_values_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    let base_period = wmm.rebasing_base_date;

    for stems in &wmm.real_rebasing {
        for series_frequency in REAL_REBASING_FREQUENCIES {
            for base in REAL_REBASING_FREQUENCIES {
                let mnemonic = with_suffix(&stems.series, series_frequency)?;
                info!(%mnemonic, %base, "Verifying real value rebasing");
                let mut settings =
                    with_functions(module, dataset, Some(wmm), vec![rescaling("Original")]).await?;
                let (_, original) = module.find_series(&settings, &mnemonic).await?;

                let rebased = should_rebase(RebasingTarget::RealValues, base, series_frequency)?;
                let expected = if rebased {
                    let (_, nominal) = module
                        .find_series(&settings, &with_suffix(&stems.nominal, base)?)
                        .await?;
                    let (_, target) = module
                        .find_series(&settings, &with_suffix(&stems.target_base_period, base)?)
                        .await?;
                    rebase_real_values(&original, &nominal, &target, base_period)?
                } else {
                    original.clone()
                };

                settings.user_settings.applied_functions.rebasing =
                    RebasingSettings::real_values(base_period, RebasingBase::from_frequency(base)?);
                module.update_settings(&settings).await?;
                let (_, server) = module.find_series(&settings, &mnemonic).await?;

                verify_series_matches(&expected, &server, decimal_places(module), base.as_str())?;
                checks.record();
                verify_base_period(&server, rebased, base, base_period)?;
                checks.record();
            }
        }
    }
    Ok(())
}

/// Rescale, real-value rebasing, real currency conversion and
/// annualization applied together.
pub async fn wmm_sequence_scenario(
    module: &QueryModule,
    wmm: &WmmFixtures,
    checks: &mut Checks,
) -> Result<(), ScenarioError> {
    let dataset = wmm.dataset;
    let sequence = wmm.sequence.as_ref().ok_or_else(|| ScenarioError::MissingFixture {
        what: "sequence".to_string(),
        dataset: dataset.to_string(),
    })?;
    let base_period = wmm.rebasing_base_date;

    let mut settings = with_functions(module, dataset, Some(wmm), vec![rescaling("Original")]).await?;
    let (found, original) = module.find_series(&settings, &sequence.series).await?;
    let (_, source) = module.find_series(&settings, &sequence.source_fx).await?;
    let (_, target) = module.find_series(&settings, &sequence.target_fx).await?;
    let (_, nominal) = module.find_series(&settings, &sequence.nominal).await?;
    let (_, target_base_period) = module.find_series(&settings, &sequence.target_base_period).await?;

    expect_function(&original, "")?;
    expect_column(&found, attributes::WMM_ANNUALIZED, Annualization::Original.display_name())?;
    if first_column_value(&found, attributes::SCALE)?
        == first_column_value(&found, attributes::WMM_DEFAULT_TARGET_SCALE)?
    {
        return Err(ScenarioError::expectation(
            format!("{} scale before rescaling", sequence.series),
            "a scale other than the default target",
            "the default target scale",
        ));
    }

    let expected = apply_all(
        &original,
        &[
            Transform::Rescale,
            Transform::RebaseRealValues {
                nominal: &nominal,
                target_base_period: &target_base_period,
                base: SEQUENCE_BASE,
                base_period,
            },
            Transform::Currency {
                kind: ConversionKind::Real,
                rates: ExchangeRates {
                    source: Some(&source),
                    target: &target,
                },
                base_period: Some(base_period),
            },
            Transform::Annualize(SEQUENCE_ANNUALIZATION),
        ],
    )?;

    module
        .add_functions(
            &mut settings,
            vec![
                rescaling("Harmonized"),
                AppliedFunction::new(Function::CurrencyConversion, wmm.target_currency.parameter.clone()),
                annualization(SEQUENCE_ANNUALIZATION),
            ],
        )
        .await?;
    let mut settings = module.settings(dataset).await?;
    settings.user_settings.applied_functions.rebasing =
        RebasingSettings::real_values(base_period, RebasingBase::from_frequency(SEQUENCE_BASE)?);
    module.update_settings(&settings).await?;

    let (found, server) = module.find_series(&settings, &sequence.series).await?;
    verify_series_matches(&expected, &server, decimal_places(module), SEQUENCE_BASE.as_str())?;
    checks.record();

    expect_column(&found, attributes::SCALE, &first_column_value(&found, attributes::WMM_DEFAULT_TARGET_SCALE)?)?;
    expect_function(&server, &converted_to(wmm))?;
    expect_column(&found, attributes::UNIT, &wmm.target_currency.name)?;
    let rebased = should_rebase(RebasingTarget::RealValues, SEQUENCE_BASE, original.frequency)?;
    verify_base_period(&server, rebased, SEQUENCE_BASE, base_period)?;
    let label = expected
        .display_attribute(attributes::WMM_ANNUALIZED)
        .unwrap_or(Annualization::Original.display_name());
    expect_column(&found, attributes::WMM_ANNUALIZED, label)?;
    checks.record();

    Ok(())
}

/// Reads the settings, optionally narrows them to the WMM date range,
/// replaces the applied functions and returns the stored result.
async fn with_functions(
    module: &QueryModule,
    dataset: Dataset,
    date_range: Option<&WmmFixtures>,
    functions: Vec<AppliedFunction>,
) -> Result<DataSetSettings, ScenarioError> {
    let mut settings = module.settings(dataset).await?;
    if let Some(wmm) = date_range {
        settings
            .change_user_settings()
            .change_date_range(DateRangeOptions::custom(wmm.start_date, wmm.end_date));
    }
    module.add_functions(&mut settings, functions).await?;
    module.settings(dataset).await
}

async fn with_date_range(
    module: &QueryModule,
    dataset: Dataset,
    wmm: &WmmFixtures,
) -> Result<DataSetSettings, ScenarioError> {
    let mut settings = module.settings(dataset).await?;
    settings
        .change_user_settings()
        .change_date_range(DateRangeOptions::custom(wmm.start_date, wmm.end_date));
    module.update_settings(&settings).await?;
    module.settings(dataset).await
}

async fn exchange_rates(
    module: &QueryModule,
    settings: &DataSetSettings,
    case: &ConversionMnemonics,
    kind: ConversionKind,
) -> Result<(Option<Series>, Series), ScenarioError> {
    let source = match (&case.source_fx, kind) {
        (Some(mnemonic), ConversionKind::Nominal | ConversionKind::Real) => {
            Some(module.find_series(settings, mnemonic).await?.1)
        }
        _ => None,
    };
    let (_, target) = module.find_series(settings, &case.target_fx).await?;
    Ok((source, target))
}

fn rescaling(parameter: &str) -> AppliedFunction {
    AppliedFunction::new(Function::Rescaling, parameter)
}

fn annualization(choice: Annualization) -> AppliedFunction {
    AppliedFunction::new(Function::Annualization, choice.parameter())
}

fn converted_to(wmm: &WmmFixtures) -> String {
    format!("Convert(to {})", wmm.target_currency.name)
}

fn decimal_places(module: &QueryModule) -> u32 {
    module.verification().decimal_places
}

/// Appends the frequency suffix to a mnemonic stem, e.g. `ARGN1IF` → `ARGN1IF.Q`.
fn with_suffix(stem: &str, frequency: Frequency) -> Result<String, ScenarioError> {
    let suffix = match frequency {
        Frequency::Annual => "A",
        Frequency::Quarterly => "Q",
        Frequency::Monthly => "M",
        other => {
            return Err(ScenarioError::expectation(
                format!("mnemonic suffix for {stem}"),
                "Annual, Quarterly or Monthly",
                other,
            ));
        }
    };
    Ok(format!("{stem}.{suffix}"))
}

fn first_column_value(series: &[Series], key: &str) -> Result<String, ScenarioError> {
    column_values(series, key)
        .into_iter()
        .next()
        .ok_or_else(|| ScenarioError::ColumnNotFound(key.to_string()))
}

fn expect_column(series: &[Series], key: &str, expected: &str) -> Result<(), ScenarioError> {
    let actual = first_column_value(series, key)?;
    if actual != expected {
        return Err(ScenarioError::expectation(format!("'{key}' column"), expected, actual));
    }
    Ok(())
}

fn expect_function(series: &Series, expected: &str) -> Result<(), ScenarioError> {
    if series.function != expected {
        return Err(ScenarioError::expectation(
            format!("function column of {}", series.mnemonic()),
            expected,
            &series.function,
        ));
    }
    Ok(())
}
