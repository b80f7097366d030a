//! Scenario files
//!
//! A scenario file is YAML where every section is optional:
//!
//! ```yaml
//! assumptions: { growth_rate: 0.052, life_expectancy: 85, tax_rate: 0.24, coverage: single }
//! policy: { initial_premium: 180000, cost_basis: 100000, contract_year: 3, current_age: 63 }
//! policy_record:
//!   total_premium: "$180,000"
//!   issue_effective: "11/1/2019"
//!   valuation_date: "11/1/2022"
//! selection: { rider: "Polaris Income Max", option: "Option 1", activation_age: 70 }
//! projection: { max_activation_age: 78 }
//! ```
//!
//! A `policy_record` wins over `policy` when both are present.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vaplan_core::model::{Assumptions, PolicyFacts, PolicyRecord};
use vaplan_core::projection::ProjectionOptions;

/// Oldest age a scenario file may name
const MAX_MODELED_AGE: u32 = 120;
const MAX_CONTRACT_YEAR: u32 = 100;

/// Rider, option and activation age the user picked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub rider: Option<String>,
    pub option: Option<String>,
    pub activation_age: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub assumptions: Assumptions,
    pub policy: PolicyFacts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_record: Option<PolicyRecord>,
    pub selection: Selection,
    pub projection: ProjectionOptions,
}

/// Error types for scenario file loading
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid scenario: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let scenario: Self =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Reject values the engine would happily compute nonsense from
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.assumptions;
        if !(0.0..=1.0).contains(&a.tax_rate) {
            return Err(ConfigError::Invalid(format!(
                "tax_rate must be between 0 and 1, got {}",
                a.tax_rate
            )));
        }
        if !a.growth_rate.is_finite() || a.growth_rate <= -1.0 {
            return Err(ConfigError::Invalid(format!(
                "growth_rate must be greater than -1, got {}",
                a.growth_rate
            )));
        }

        if a.life_expectancy > MAX_MODELED_AGE {
            return Err(ConfigError::Invalid(format!(
                "life_expectancy must be at most {MAX_MODELED_AGE}, got {}",
                a.life_expectancy
            )));
        }
        if self.projection.max_activation_age > MAX_MODELED_AGE {
            return Err(ConfigError::Invalid(format!(
                "max_activation_age must be at most {MAX_MODELED_AGE}, got {}",
                self.projection.max_activation_age
            )));
        }

        let p = self.policy_facts();
        if p.current_age > MAX_MODELED_AGE {
            return Err(ConfigError::Invalid(format!(
                "current_age must be at most {MAX_MODELED_AGE}, got {}",
                p.current_age
            )));
        }
        if p.contract_year > MAX_CONTRACT_YEAR {
            return Err(ConfigError::Invalid(format!(
                "contract_year must be at most {MAX_CONTRACT_YEAR}, got {}",
                p.contract_year
            )));
        }
        if !(p.initial_premium.is_finite() && p.initial_premium > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_premium must be positive, got {}",
                p.initial_premium
            )));
        }
        if !(p.cost_basis.is_finite() && p.cost_basis >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cost_basis must not be negative, got {}",
                p.cost_basis
            )));
        }
        Ok(())
    }

    /// Policy facts to project, preferring the raw policy record
    pub fn policy_facts(&self) -> PolicyFacts {
        match &self.policy_record {
            Some(record) => PolicyFacts::from_record(record),
            None => self.policy,
        }
    }
}
