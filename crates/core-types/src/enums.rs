use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observation frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Frequency {
    Annual,
    Quarterly,
    Monthly,
    Weekly,
    Daily,
}

impl Frequency {
    /// Derives the frequency from a mnemonic's suffix, e.g. `AFGN1GDPCO.A`.
    pub fn from_mnemonic(mnemonic: &str) -> Result<Self, CoreError> {
        match mnemonic.trim().chars().last() {
            Some('A') => Ok(Frequency::Annual),
            Some('Q') => Ok(Frequency::Quarterly),
            Some('M') => Ok(Frequency::Monthly),
            _ => Err(CoreError::UnknownMnemonicSuffix(mnemonic.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Annual => "Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Annual" => Ok(Frequency::Annual),
            "Quarterly" => Ok(Frequency::Quarterly),
            "Monthly" => Ok(Frequency::Monthly),
            "Weekly" => Ok(Frequency::Weekly),
            "Daily" => Ok(Frequency::Daily),
            other => Err(CoreError::UnknownFrequency(other.to_string())),
        }
    }
}

/// Base frequency of a rebasing operation, as the service encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebasingBase {
    #[serde(rename = "ANNL")]
    Annual,
    #[serde(rename = "QUAR")]
    Quarterly,
    #[serde(rename = "MONT")]
    Monthly,
}

impl RebasingBase {
    pub fn code(&self) -> &'static str {
        match self {
            RebasingBase::Annual => "ANNL",
            RebasingBase::Quarterly => "QUAR",
            RebasingBase::Monthly => "MONT",
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            RebasingBase::Annual => Frequency::Annual,
            RebasingBase::Quarterly => Frequency::Quarterly,
            RebasingBase::Monthly => Frequency::Monthly,
        }
    }

    pub fn from_frequency(frequency: Frequency) -> Result<Self, CoreError> {
        match frequency {
            Frequency::Annual => Ok(RebasingBase::Annual),
            Frequency::Quarterly => Ok(RebasingBase::Quarterly),
            Frequency::Monthly => Ok(RebasingBase::Monthly),
            other => Err(CoreError::UnknownRebasingCode(other.to_string())),
        }
    }
}

impl fmt::Display for RebasingBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.frequency().as_str())
    }
}

impl FromStr for RebasingBase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ANNL" => Ok(RebasingBase::Annual),
            "QUAR" => Ok(RebasingBase::Quarterly),
            "MONT" => Ok(RebasingBase::Monthly),
            other => Err(CoreError::UnknownRebasingCode(other.to_string())),
        }
    }
}

/// Magnitude a series' values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    Unit,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl Scale {
    pub fn multiplier(&self) -> f64 {
        match self {
            Scale::Unit => 1.0,
            Scale::Thousands => 1e3,
            Scale::Millions => 1e6,
            Scale::Billions => 1e9,
            Scale::Trillions => 1e12,
        }
    }
}

impl FromStr for Scale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Unit" => Ok(Scale::Unit),
            "Thousands" => Ok(Scale::Thousands),
            "Millions" => Ok(Scale::Millions),
            "Billions" => Ok(Scale::Billions),
            "Trillions" => Ok(Scale::Trillions),
            other => Err(CoreError::UnknownScale(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Annualization {
    Original,
    Annualized,
    NonAnnualized,
}

impl Annualization {
    /// The label the service writes into the `WmmAnnualized` attribute.
    pub fn display_name(&self) -> &'static str {
        match self {
            Annualization::Original => "Original",
            Annualization::Annualized => "Annualized",
            Annualization::NonAnnualized => "Non-annualized",
        }
    }

    /// The parameter value sent with the annualization function.
    pub fn parameter(&self) -> &'static str {
        match self {
            Annualization::Original => "Original",
            Annualization::Annualized => "Annualized",
            Annualization::NonAnnualized => "NonAnnualized",
        }
    }
}

impl FromStr for Annualization {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Original" => Ok(Annualization::Original),
            "Annualized" => Ok(Annualization::Annualized),
            "NonAnnualized" | "Non-annualized" => Ok(Annualization::NonAnnualized),
            other => Err(CoreError::UnknownAnnualization(other.to_string())),
        }
    }
}

/// Ordering requested for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
    /// Canonical taxonomy order of the column's members.
    Tree,
}

/// Server-side functions that can be applied to a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Rescaling,
    Annualization,
    CurrencyConversion,
    UnitConversion,
}

impl Function {
    pub fn id(&self) -> i32 {
        match self {
            Function::Rescaling => 1,
            Function::Annualization => 2,
            Function::CurrencyConversion => 3,
            Function::UnitConversion => 4,
        }
    }
}

/// Dataset families; only Magellan datasets answer overview queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Magellan,
    Cube,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_from_mnemonic_suffix() {
        assert_eq!(Frequency::from_mnemonic("AFGN1GDPCO.A").unwrap(), Frequency::Annual);
        assert_eq!(Frequency::from_mnemonic("AFGN1CUX$.Q").unwrap(), Frequency::Quarterly);
        assert_eq!(Frequency::from_mnemonic("USAN1CPI.M").unwrap(), Frequency::Monthly);
        assert!(matches!(
            Frequency::from_mnemonic("USAN1CPI.W"),
            Err(CoreError::UnknownMnemonicSuffix(_))
        ));
    }

    #[test]
    fn rebasing_codes() {
        assert_eq!("QUAR".parse::<RebasingBase>().unwrap(), RebasingBase::Quarterly);
        assert_eq!(RebasingBase::Monthly.code(), "MONT");
        assert!("WEEK".parse::<RebasingBase>().is_err());
        assert!(RebasingBase::from_frequency(Frequency::Daily).is_err());
    }

    #[test]
    fn unknown_scale_is_rejected() {
        assert_eq!("Millions".parse::<Scale>().unwrap().multiplier(), 1e6);
        assert_eq!(
            "Hundreds".parse::<Scale>(),
            Err(CoreError::UnknownScale("Hundreds".to_string()))
        );
    }
}
