//! Mapping run configuration
//!
//! Every field has a default, so an empty YAML document is a valid config.

use super::error::{MappingError, MappingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// How peptide quantities are reduced to one abundance per proteoform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbundancePolicy {
    /// Mean value of the peptides with the best candidate score
    #[default]
    HighestSupport,
    Max,
    Mean,
    Median,
    /// Largest magnitude, sign preserved
    Extreme,
}

/// What the summed peptide scores of an accession are divided by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportDenominator {
    /// Every record of the accession, including ones that could not be located
    #[default]
    AllPeptides,
    /// Only records located in the reference sequence
    LocalizedPeptides,
}

/// What summed member scores of a complex are divided by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexAveraging {
    /// Total base-member count (scored and unscored)
    #[default]
    AllMembers,
    /// Only members carrying the value being averaged
    ScoredMembers,
}

/// Lowercases and folds '-' and ' ' to '_' so "Highest-Support" parses
fn normalize_name(s: &str) -> String {
    s.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

impl FromStr for AbundancePolicy {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "highest_support" | "highestsupport" => Ok(AbundancePolicy::HighestSupport),
            "max" => Ok(AbundancePolicy::Max),
            "mean" => Ok(AbundancePolicy::Mean),
            "median" => Ok(AbundancePolicy::Median),
            "extreme" => Ok(AbundancePolicy::Extreme),
            _ => Err(MappingError::UnknownPolicy(s.to_string())),
        }
    }
}

impl FromStr for SupportDenominator {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "all_peptides" | "all" => Ok(SupportDenominator::AllPeptides),
            "localized_peptides" | "localized" => Ok(SupportDenominator::LocalizedPeptides),
            _ => Err(MappingError::UnknownDenominator(s.to_string())),
        }
    }
}

impl FromStr for ComplexAveraging {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "all_members" | "all" => Ok(ComplexAveraging::AllMembers),
            "scored_members" | "scored" => Ok(ComplexAveraging::ScoredMembers),
            _ => Err(MappingError::UnknownAveraging(s.to_string())),
        }
    }
}

/// Header names of the measurement table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub accession: String,
    pub peptide: String,
    pub value: String,
    pub experiment: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            accession: "Protein".to_string(),
            peptide: "Modified sequence".to_string(),
            value: "Ratio".to_string(),
            experiment: "Experiment".to_string(),
        }
    }
}

/// Configuration of one mapping run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub columns: ColumnNames,
    /// Separator inside the accession cell of protein-group rows
    pub accession_separator: char,
    pub abundance_policy: AbundancePolicy,
    pub support_denominator: SupportDenominator,
    pub complex_averaging: ComplexAveraging,
    /// Decimal places kept for support scores and support weights
    pub support_precision: u32,
    /// Decimal places kept for abundance scores and abundance weights
    pub abundance_precision: u32,
    /// Restrict the run to these experiment labels
    pub experiments: Option<Vec<String>>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            accession_separator: ';',
            abundance_policy: AbundancePolicy::default(),
            support_denominator: SupportDenominator::default(),
            complex_averaging: ComplexAveraging::default(),
            support_precision: 2,
            abundance_precision: 4,
            experiments: None,
        }
    }
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> MappingResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> MappingResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn with_policy(mut self, policy: AbundancePolicy) -> Self {
        self.abundance_policy = policy;
        self
    }

    pub fn with_denominator(mut self, denominator: SupportDenominator) -> Self {
        self.support_denominator = denominator;
        self
    }

    pub fn with_complex_averaging(mut self, averaging: ComplexAveraging) -> Self {
        self.complex_averaging = averaging;
        self
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_experiments(mut self, experiments: Vec<String>) -> Self {
        self.experiments = Some(experiments);
        self
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names_parse_loosely() {
        for name in ["highest_support", "HighestSupport", "Highest-Support"] {
            assert_eq!(
                name.parse::<AbundancePolicy>().unwrap(),
                AbundancePolicy::HighestSupport
            );
        }
        assert_eq!("MEDIAN".parse::<AbundancePolicy>().unwrap(), AbundancePolicy::Median);
        assert_eq!(" extreme ".parse::<AbundancePolicy>().unwrap(), AbundancePolicy::Extreme);
    }

    #[test]
    fn test_unknown_policy_is_configuration_error() {
        let err = "geometric".parse::<AbundancePolicy>().unwrap_err();
        assert!(matches!(err, MappingError::UnknownPolicy(ref name) if name == "geometric"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_denominator_and_averaging_parse() {
        assert_eq!(
            "localized".parse::<SupportDenominator>().unwrap(),
            SupportDenominator::LocalizedPeptides
        );
        assert_eq!(
            "all_members".parse::<ComplexAveraging>().unwrap(),
            ComplexAveraging::AllMembers
        );
        assert!("some".parse::<ComplexAveraging>().is_err());
        assert!("half".parse::<SupportDenominator>().is_err());
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = MappingConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.abundance_policy, AbundancePolicy::HighestSupport);
        assert_eq!(config.support_denominator, SupportDenominator::AllPeptides);
        assert_eq!(config.complex_averaging, ComplexAveraging::AllMembers);
        assert_eq!(config.columns.accession, "Protein");
        assert_eq!(config.accession_separator, ';');
        assert_eq!(config.support_precision, 2);
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
columns:
  accession: Leading razor protein
  value: log2FC
abundance_policy: extreme
complex_averaging: scored_members
experiments: [ctrl, insulin_5min]
"#;
        let config = MappingConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.columns.accession, "Leading razor protein");
        assert_eq!(config.columns.value, "log2FC");
        assert_eq!(config.columns.peptide, "Modified sequence");
        assert_eq!(config.abundance_policy, AbundancePolicy::Extreme);
        assert_eq!(config.complex_averaging, ComplexAveraging::ScoredMembers);
        assert_eq!(
            config.experiments,
            Some(vec!["ctrl".to_string(), "insulin_5min".to_string()])
        );
    }

    #[test]
    fn test_yaml_unknown_policy_fails() {
        let err = MappingConfig::from_yaml_str("abundance_policy: geometric").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.7 / 6.0, 2), 0.78);
        assert_eq!(round_to(6.5 / 6.0, 2), 1.08);
        assert_eq!(round_to(44.1 / 5.0, 4), 8.82);
        assert_eq!(round_to(-2.345678, 3), -2.346);
    }
}
