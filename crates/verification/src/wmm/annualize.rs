use core_types::{attributes, Annualization, Frequency, Series};
use tracing::warn;

/// Applies an annualization choice to a series.
///
/// Only sub-annual flows are affected: quarterly series are multiplied or
/// divided by 4, monthly ones divided by 12 when de-annualizing. When a
/// factor applies the `WmmAnnualized` attribute is set to the choice's
/// display name, mirroring what the service writes.
pub fn annualize(series: &Series, annualization: Annualization) -> Series {
    let step = match (annualization, series.frequency) {
        (Annualization::Annualized, Frequency::Quarterly) => Step::Multiply(4.0),
        (Annualization::NonAnnualized, Frequency::Quarterly) => Step::Divide(4.0),
        (Annualization::NonAnnualized, Frequency::Monthly) => Step::Divide(12.0),
        _ => {
            warn!(
                mnemonic = series.mnemonic(),
                frequency = %series.frequency,
                ?annualization,
                "Annualization does not change this series"
            );
            return series.clone();
        }
    };

    let mut result = match step {
        Step::Multiply(factor) => series.map_values(|_, v| v * factor),
        Step::Divide(divisor) => series.map_values(|_, v| v / divisor),
    };
    let label = annualization.display_name();
    result.set_attribute(attributes::WMM_ANNUALIZED, label, label);
    result
}

enum Step {
    Multiply(f64),
    Divide(f64),
}
