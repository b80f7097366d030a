//! LIFO tax allocation for non-qualified annuity income
//!
//! Withdrawals from a non-qualified annuity are taxed earnings-first: every
//! dollar comes out of accumulated gain (ordinary income) until the gain is
//! gone, then out of the after-tax cost basis (tax free), and once both pools
//! are empty everything is taxable again. The allocator re-simulates the
//! account under the income recurrence so it tracks depletion on its own.

use serde::{Deserialize, Serialize};

use crate::model::{
    ComparisonPoint, IncomePhase, LifoPhase, LifoTaxResult, Projection, Scenario, TaxRow,
};

/// Running gain and basis pools
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxLotState {
    pub remaining_gain: f64,
    pub remaining_basis: f64,
    pub basis_exhausted: bool,
    /// Account value has run out and the insurer is paying
    pub depleted: bool,
}

/// Split of one withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Allocation {
    pub taxable: f64,
    pub tax_free: f64,
}

impl TaxLotState {
    /// Pools at activation; a loss position starts with no gain
    pub fn new(total_gain: f64, cost_basis: f64) -> Self {
        Self {
            remaining_gain: total_gain.max(0.0),
            remaining_basis: cost_basis.max(0.0),
            basis_exhausted: cost_basis <= 0.0,
            depleted: false,
        }
    }

    /// Draw `gross` from the pools, gain first
    pub fn allocate(&mut self, gross: f64) -> Allocation {
        if gross <= 0.0 {
            return Allocation::default();
        }

        if self.remaining_gain > 0.0 {
            let from_gain = gross.min(self.remaining_gain);
            let excess = gross - from_gain;
            let from_basis = self.draw_basis(excess);
            self.remaining_gain = (self.remaining_gain - from_gain).max(0.0);
            return Allocation {
                taxable: from_gain + (excess - from_basis),
                tax_free: from_basis,
            };
        }

        let from_basis = self.draw_basis(gross);
        Allocation {
            taxable: gross - from_basis,
            tax_free: from_basis,
        }
    }

    fn draw_basis(&mut self, amount: f64) -> f64 {
        if self.basis_exhausted || amount <= 0.0 {
            return 0.0;
        }
        let drawn = amount.min(self.remaining_basis);
        self.remaining_basis = (self.remaining_basis - drawn).max(0.0);
        if self.remaining_basis <= 0.0 {
            self.basis_exhausted = true;
        }
        drawn
    }

    pub fn phase(&self) -> LifoPhase {
        if self.remaining_gain > 0.0 {
            LifoPhase::Gain
        } else if self.remaining_basis > 0.0 {
            LifoPhase::Basis
        } else {
            LifoPhase::FullyTaxable
        }
    }
}

/// Inputs to the LIFO walk that do not come from the scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifoInputs {
    pub cost_basis: f64,
    pub tax_rate: f64,
    pub growth_rate: f64,
    pub fee_rate: f64,
    pub life_expectancy: u32,
}

impl LifoInputs {
    pub fn from_projection(projection: &Projection) -> Self {
        Self {
            cost_basis: projection.policy.cost_basis,
            tax_rate: projection.assumptions.tax_rate,
            growth_rate: projection.assumptions.growth_rate,
            fee_rate: projection.fee_rate,
            life_expectancy: projection.assumptions.life_expectancy,
        }
    }
}

/// Allocate a scenario's income stream between taxable gain and tax-free basis
pub fn allocate_lifo_tax(scenario: &Scenario, inputs: &LifoInputs) -> LifoTaxResult {
    let av_at_activation = scenario.av_at_activation;
    let total_gain = av_at_activation - inputs.cost_basis;
    let annual_fee = scenario.benefit_base_at_activation * inputs.fee_rate;
    let years = inputs
        .life_expectancy
        .saturating_sub(scenario.activate_at_age);

    let mut lots = TaxLotState::new(total_gain, inputs.cost_basis);
    let mut account_value = av_at_activation;
    let mut totals = Cumulative::default();
    let mut year_by_year = Vec::with_capacity(years as usize);

    for year in 0..years {
        let age = scenario.activate_at_age + year;
        let (phase, gross) = if lots.depleted {
            (IncomePhase::Pip, scenario.pip_income)
        } else {
            let gross = scenario.mawp_income;
            account_value =
                account_value + account_value * inputs.growth_rate - annual_fee - gross;
            if account_value <= 0.0 {
                lots.depleted = true;
                account_value = 0.0;
            }
            (IncomePhase::Mawp, gross)
        };

        let split = lots.allocate(gross);
        let tax_owed = split.taxable * inputs.tax_rate;
        let after_tax_income = gross - tax_owed;
        totals.add(gross, &split, tax_owed);

        year_by_year.push(TaxRow {
            age,
            phase,
            gross_income: gross,
            taxable_portion: split.taxable,
            tax_free_portion: split.tax_free,
            tax_owed,
            after_tax_income,
            effective_rate: if gross > 0.0 { tax_owed / gross } else { 0.0 },
            cumulative_gross: totals.gross,
            cumulative_taxable: totals.taxable,
            cumulative_tax_free: totals.tax_free,
            cumulative_tax: totals.tax,
            cumulative_after_tax: totals.after_tax,
            remaining_gain: lots.remaining_gain,
            remaining_basis: lots.remaining_basis,
            lifo_phase: lots.phase(),
        });
    }

    LifoTaxResult {
        year_by_year,
        total_gain,
        av_at_activation,
    }
}

#[derive(Debug, Default)]
struct Cumulative {
    gross: f64,
    taxable: f64,
    tax_free: f64,
    tax: f64,
    after_tax: f64,
}

impl Cumulative {
    fn add(&mut self, gross: f64, split: &Allocation, tax: f64) {
        self.gross += gross;
        self.taxable += split.taxable;
        self.tax_free += split.tax_free;
        self.tax += tax;
        self.after_tax += gross - tax;
    }
}

/// LIFO allocation for the activation age override, or the optimal age
pub fn allocate_selected(
    projection: &Projection,
    activation_override: Option<u32>,
) -> LifoTaxResult {
    match projection.selected(activation_override) {
        Some(scenario) => allocate_lifo_tax(scenario, &LifoInputs::from_projection(projection)),
        None => LifoTaxResult::empty(projection.current_account_value),
    }
}

/// Cumulative after-tax income from the annuity against a taxable account
/// seeded with the same cost basis and drawing the same MAWP income.
///
/// The taxable account compounds from contract issue until activation with
/// half of each year's growth taxed at the marginal rate, then pays out
/// with each withdrawal's gain fraction taxed.
pub fn taxable_comparison(
    projection: &Projection,
    scenario: &Scenario,
    lifo: &LifoTaxResult,
) -> Vec<ComparisonPoint> {
    let growth = projection.assumptions.growth_rate;
    let tax_rate = projection.assumptions.tax_rate;
    let cost_basis = projection.policy.cost_basis;

    let years_held = scenario
        .activate_at_age
        .saturating_sub(projection.policy.current_age)
        + projection.policy.contract_year;
    let mut balance = cost_basis;
    for _ in 0..years_held {
        balance = balance * (1.0 + growth) - balance * growth * tax_rate * 0.5;
    }

    let years = projection
        .assumptions
        .life_expectancy
        .saturating_sub(scenario.activate_at_age);
    let mut cumulative_after_tax = 0.0;

    (0..years)
        .map(|year| {
            let withdrawal = scenario.mawp_income.min(balance.max(0.0));
            let gain_fraction = ((balance - cost_basis) / balance.max(1.0)).max(0.0);
            cumulative_after_tax += withdrawal - withdrawal * gain_fraction * tax_rate;
            balance = ((balance - withdrawal) * (1.0 + growth)).max(0.0);

            ComparisonPoint {
                age: scenario.activate_at_age + year,
                taxable_cumulative_after_tax: cumulative_after_tax,
                annuity_cumulative_after_tax: lifo
                    .year_by_year
                    .get(year as usize)
                    .map_or(0.0, |r| r.cumulative_after_tax),
            }
        })
        .collect()
}
