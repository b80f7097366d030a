//! Rider definitions and the catalog extracted from a product payload

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::rates::RateTable;

/// How roll-up credits accrue on the benefit base during the credit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupMode {
    /// Credit is a fixed percentage of the initial premium each year
    #[default]
    Simple,
    /// Credit compounds on the prior credited value
    Compound,
}

impl RollupMode {
    /// Credited value of `premium` after `years` contract years at `rate`
    pub fn credited(self, premium: f64, rate: f64, years: u32) -> f64 {
        match self {
            RollupMode::Simple => premium * (1.0 + rate * years as f64),
            RollupMode::Compound => premium * (1.0 + rate).powi(years as i32),
        }
    }
}

/// Withdrawal schedules for one income option.
///
/// `pip_table == None` means income continues at the MAWP rate after the
/// account value is exhausted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionTables {
    pub mawp_table: RateTable,
    pub pip_table: Option<RateTable>,
}

/// A guaranteed-income rider, normalized from the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderDefinition {
    pub id: String,
    pub name: String,
    /// Annual roll-up credit rate (fraction)
    pub credit_rate: f64,
    pub max_credit_years: u32,
    /// Benefit base floor as a multiple of premium once the credit window closes
    pub step_up_guarantee: f64,
    /// Annual rider fee as a fraction of the benefit base
    pub fee_rate: f64,
    #[serde(default)]
    pub rollup_mode: RollupMode,
    /// Income option names in display order
    pub income_options: Vec<String>,
    pub option_tables: FxHashMap<String, OptionTables>,
}

impl RiderDefinition {
    pub fn has_option(&self, option: &str) -> bool {
        self.income_options.iter().any(|o| o == option)
    }

    pub fn first_option(&self) -> Option<&str> {
        self.income_options.first().map(String::as_str)
    }

    pub fn tables_for(&self, option: &str) -> Option<&OptionTables> {
        self.option_tables.get(option)
    }
}

/// All live riders of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderCatalog {
    pub product_name: String,
    pub riders: Vec<RiderDefinition>,
}

impl RiderCatalog {
    pub fn rider_named(&self, name: &str) -> Option<&RiderDefinition> {
        self.riders.iter().find(|r| r.name == name)
    }

    pub fn rider_names(&self) -> impl Iterator<Item = &str> {
        self.riders.iter().map(|r| r.name.as_str())
    }

    /// The rider a fresh session starts on: an "Income Max" rider when the
    /// product has one, otherwise the first rider
    pub fn default_rider(&self) -> Option<&RiderDefinition> {
        self.riders
            .iter()
            .find(|r| r.name.to_lowercase().contains("income max"))
            .or_else(|| self.riders.first())
    }

    /// (rider name, first income option) of the default rider
    pub fn default_selection(&self) -> Option<(&str, Option<&str>)> {
        self.default_rider()
            .map(|rider| (rider.name.as_str(), rider.first_option()))
    }
}
