//! Projection outputs
//!
//! Every type here is a plain value: the projection is recomputed from scratch
//! whenever an input changes, and rendering layers consume these rows as-is.

use serde::{Deserialize, Serialize};

use super::policy::{Assumptions, PolicyFacts};

/// End-of-year contract state for one pre-activation year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreActivationRow {
    pub age: u32,
    pub contract_year: u32,
    pub account_value: f64,
    pub benefit_base: f64,
}

/// Outcome of turning income on at one candidate age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub activate_at_age: u32,
    pub benefit_base_at_activation: f64,
    pub av_at_activation: f64,
    pub mawp_rate: f64,
    /// Annual income while the account value lasts
    pub mawp_income: f64,
    /// Rider fee charged against the benefit base each income year
    pub annual_fee: f64,
    /// First age at which the account value is exhausted, within the horizon
    pub depletes_at_age: Option<u32>,
    pub mawp_years: u32,
    pub mawp_total: f64,
    pub pip_rate: f64,
    /// Annual income the insurer keeps paying after depletion
    pub pip_income: f64,
    pub pip_years: u32,
    pub pip_total: f64,
    pub grand_total: f64,
}

/// Full projection for one parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// One scenario per candidate activation age, ascending
    pub scenarios: Vec<Scenario>,
    /// Age with the highest lifetime income; the current age when nothing beats zero
    pub optimal_age: u32,
    pub pre_activation_rows: Vec<PreActivationRow>,
    pub current_account_value: f64,
    pub current_benefit_base: f64,
    pub fee_rate: f64,
    pub assumptions: Assumptions,
    pub policy: PolicyFacts,
}

impl Projection {
    /// No candidate activation age was in range
    pub fn is_degenerate(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenario_at(&self, age: u32) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.activate_at_age == age)
    }

    pub fn optimal_scenario(&self) -> Option<&Scenario> {
        self.scenario_at(self.optimal_age)
    }

    /// Activating immediately
    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.scenario_at(self.policy.current_age)
    }

    /// The user's chosen activation age when it is a computed scenario,
    /// otherwise the optimal scenario
    pub fn selected(&self, activation_override: Option<u32>) -> Option<&Scenario> {
        activation_override
            .and_then(|age| self.scenario_at(age))
            .or_else(|| self.optimal_scenario())
    }

    /// Extra lifetime income from waiting until the optimal age instead of
    /// activating now
    pub fn waiting_gain(&self) -> f64 {
        match (self.optimal_scenario(), self.current_scenario()) {
            (Some(optimal), Some(current)) => optimal.grand_total - current.grand_total,
            _ => 0.0,
        }
    }
}

/// Which guarantee is paying in an income year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomePhase {
    /// Withdrawals from the account value
    Mawp,
    /// Insurer continues paying after depletion
    Pip,
}

/// One year of post-activation income
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeRow {
    pub age: u32,
    pub account_value: f64,
    pub phase: IncomePhase,
    pub income: f64,
    pub cumulative_income: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownPhase {
    Accumulation,
    Income,
    InsurerPays,
}

/// Year-by-year contract cash flows from valuation through life expectancy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub age: u32,
    pub growth: f64,
    pub fees: f64,
    pub income: f64,
    /// Account value after growth, before fees and income
    pub gross_av: f64,
    pub net_av: f64,
    pub phase: BreakdownPhase,
}

/// Which LIFO pool the next withdrawal dollar comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifoPhase {
    Gain,
    Basis,
    FullyTaxable,
}

/// One year of LIFO tax allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxRow {
    pub age: u32,
    pub phase: IncomePhase,
    pub gross_income: f64,
    pub taxable_portion: f64,
    pub tax_free_portion: f64,
    pub tax_owed: f64,
    pub after_tax_income: f64,
    pub effective_rate: f64,
    pub cumulative_gross: f64,
    pub cumulative_taxable: f64,
    pub cumulative_tax_free: f64,
    pub cumulative_tax: f64,
    pub cumulative_after_tax: f64,
    pub remaining_gain: f64,
    pub remaining_basis: f64,
    pub lifo_phase: LifoPhase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifoTaxResult {
    pub year_by_year: Vec<TaxRow>,
    /// Account value at activation less cost basis (may be negative)
    pub total_gain: f64,
    pub av_at_activation: f64,
}

impl LifoTaxResult {
    /// Result for a projection with no scenario to allocate
    pub fn empty(av_at_activation: f64) -> Self {
        Self {
            year_by_year: Vec::new(),
            total_gain: 0.0,
            av_at_activation,
        }
    }

    pub fn total_tax(&self) -> f64 {
        self.year_by_year.last().map_or(0.0, |r| r.cumulative_tax)
    }

    pub fn total_after_tax(&self) -> f64 {
        self.year_by_year
            .last()
            .map_or(0.0, |r| r.cumulative_after_tax)
    }

    /// First age at which withdrawals start returning basis
    pub fn basis_start_age(&self) -> Option<u32> {
        self.year_by_year
            .iter()
            .find(|r| r.tax_free_portion > 0.0)
            .map(|r| r.age)
    }

    /// First age reported fully taxable
    pub fn fully_taxable_age(&self) -> Option<u32> {
        self.year_by_year
            .iter()
            .find(|r| r.lifo_phase == LifoPhase::FullyTaxable)
            .map(|r| r.age)
    }
}

/// Cumulative after-tax income: annuity versus a plain taxable account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub age: u32,
    pub taxable_cumulative_after_tax: f64,
    pub annuity_cumulative_after_tax: f64,
}
