//! Growth and income projection
//!
//! Models a guaranteed lifetime withdrawal benefit in two phases:
//!
//! 1. **Accumulation.** From the valuation date the account value grows at the
//!    assumed rate, less the rider fee charged on the benefit base. The benefit
//!    base is the greater of the account value and the premium credited at the
//!    roll-up rate; once the credit window closes it is also floored at the
//!    step-up guarantee. It never decreases.
//! 2. **Income.** For each candidate activation age, annual income is the
//!    benefit base times the age-banded MAWP rate. The account pays it (plus
//!    the fee) until it runs dry, after which the insurer continues at the PIP
//!    rate through life expectancy.
//!
//! Every candidate age from the current age through `max_activation_age`
//! becomes a `Scenario`; the optimizer then picks the one with the most
//! lifetime income.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{
    Assumptions, BreakdownPhase, BreakdownRow, DEFAULT_MAWP_RATE, DEFAULT_PIP_RATE, IncomePhase,
    IncomeRow, PolicyFacts, PreActivationRow, Projection, ResolvedParameters, Scenario,
};
use crate::optimization::optimize_activation_age;

/// Oldest age considered for turning income on
pub const MAX_ACTIVATION_AGE: u32 = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionOptions {
    pub max_activation_age: u32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            max_activation_age: MAX_ACTIVATION_AGE,
        }
    }
}

/// Account value and benefit base at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractState {
    pub account_value: f64,
    pub benefit_base: f64,
}

/// Run the full projection with default options
pub fn run_projection(
    params: &ResolvedParameters,
    assumptions: &Assumptions,
    policy: &PolicyFacts,
) -> Projection {
    run_projection_with(params, assumptions, policy, &ProjectionOptions::default())
}

pub fn run_projection_with(
    params: &ResolvedParameters,
    assumptions: &Assumptions,
    policy: &PolicyFacts,
    options: &ProjectionOptions,
) -> Projection {
    let last_queried_age = options.max_activation_age.max(assumptions.life_expectancy);
    let accumulation = Accumulation::new(params, assumptions, policy, last_queried_age);
    let first_age = policy.current_age;
    let last_age = options.max_activation_age;

    if first_age > last_age {
        tracing::warn!(
            current_age = first_age,
            max_activation_age = last_age,
            "current age is past the activation search range; no scenarios computed"
        );
    }

    #[cfg(feature = "parallel")]
    let scenarios: Vec<Scenario> = (first_age..=last_age)
        .into_par_iter()
        .map(|age| accumulation.scenario(age))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scenarios: Vec<Scenario> = (first_age..=last_age)
        .map(|age| accumulation.scenario(age))
        .collect();

    let optimal_age = optimize_activation_age(&scenarios)
        .map(|optimum| optimum.age)
        .unwrap_or(first_age);

    tracing::debug!(
        rider = %params.rider_name,
        scenarios = scenarios.len(),
        optimal_age,
        "projection complete"
    );

    Projection {
        scenarios,
        optimal_age,
        pre_activation_rows: accumulation.rows,
        current_account_value: accumulation.current.account_value,
        current_benefit_base: accumulation.current.benefit_base,
        fee_rate: params.fee_rate,
        assumptions: *assumptions,
        policy: *policy,
    }
}

/// Pre-activation state table plus everything needed to extend it
struct Accumulation<'a> {
    params: &'a ResolvedParameters,
    assumptions: &'a Assumptions,
    policy: &'a PolicyFacts,
    current: ContractState,
    rows: Vec<PreActivationRow>,
}

impl<'a> Accumulation<'a> {
    fn new(
        params: &'a ResolvedParameters,
        assumptions: &'a Assumptions,
        policy: &'a PolicyFacts,
        last_queried_age: u32,
    ) -> Self {
        let current = current_state(params, assumptions, policy);
        let rows = pre_activation_rows(params, assumptions, policy, current, last_queried_age);
        Self {
            params,
            assumptions,
            policy,
            current,
            rows,
        }
    }

    /// State at the start of the year the owner turns `age`
    fn state_at(&self, age: u32) -> ContractState {
        let Some(years) = age.checked_sub(self.policy.current_age).filter(|y| *y > 0) else {
            return self.current;
        };
        let years = years as usize;

        if let Some(row) = self.rows.get(years - 1) {
            return ContractState {
                account_value: row.account_value,
                benefit_base: row.benefit_base,
            };
        }

        // Past the credit window: the benefit base only steps up to a higher account value
        let mut state = self.rows.last().map_or(self.current, |row| ContractState {
            account_value: row.account_value,
            benefit_base: row.benefit_base,
        });
        let growth = self.assumptions.growth_rate;
        for _ in self.rows.len()..years {
            state.account_value = state.account_value + state.account_value * growth
                - state.benefit_base * self.params.fee_rate;
            state.benefit_base = state.account_value.max(state.benefit_base);
        }
        state
    }

    fn scenario(&self, age: u32) -> Scenario {
        let state = self.state_at(age);
        let coverage = self.assumptions.coverage;
        let growth = self.assumptions.growth_rate;
        let life_expectancy = self.assumptions.life_expectancy;

        let mawp_rate = self
            .params
            .mawp_table
            .rate_or(age, coverage, DEFAULT_MAWP_RATE);
        // No PIP schedule: the insurer keeps paying the MAWP rate after depletion
        let pip_rate = match &self.params.pip_table {
            Some(table) => table.rate_or(age, coverage, DEFAULT_PIP_RATE),
            None => mawp_rate,
        };

        let bb = state.benefit_base;
        let mawp_income = bb * mawp_rate;
        let pip_income = bb * pip_rate;
        let annual_fee = bb * self.params.fee_rate;

        let horizon = life_expectancy.saturating_sub(age);
        let mut account_value = state.account_value;
        let mut depletes_at_age = None;
        let mut mawp_years = horizon;

        for year in 0..horizon {
            account_value = account_value * (1.0 + growth) - mawp_income - annual_fee;
            if account_value <= 0.0 {
                depletes_at_age = Some(age + year + 1);
                mawp_years = year + 1;
                break;
            }
        }

        let pip_years = depletes_at_age.map_or(0, |d| life_expectancy.saturating_sub(d));
        let mawp_total = mawp_years as f64 * mawp_income;
        let pip_total = pip_years as f64 * pip_income;

        Scenario {
            activate_at_age: age,
            benefit_base_at_activation: bb,
            av_at_activation: state.account_value,
            mawp_rate,
            mawp_income,
            annual_fee,
            depletes_at_age,
            mawp_years,
            mawp_total,
            pip_rate,
            pip_income,
            pip_years,
            pip_total,
            grand_total: mawp_total + pip_total,
        }
    }
}

/// Contract state at valuation.
///
/// Replays the contract from the initial premium through the elapsed contract
/// years; a positive actual account value replaces the replayed one.
pub fn current_state(
    params: &ResolvedParameters,
    assumptions: &Assumptions,
    policy: &PolicyFacts,
) -> ContractState {
    let premium = policy.initial_premium;
    let growth = assumptions.growth_rate;
    let credited = |years| params.rollup_mode.credited(premium, params.credit_rate, years);

    let mut account_value = premium;
    let mut benefit_base = premium;
    for year in 1..=policy.contract_year {
        account_value = account_value + account_value * growth - benefit_base * params.fee_rate;
        benefit_base = account_value.max(credited(year));
    }

    let account_value = policy
        .current_account_value
        .filter(|v| *v > 0.0)
        .unwrap_or(account_value);

    ContractState {
        account_value,
        benefit_base: account_value.max(credited(policy.contract_year)),
    }
}

/// End-of-year states from valuation through the last credit year.
///
/// The table stops at `last_age`, the oldest age any lookup will ask for,
/// even when the credit window runs longer.
pub fn pre_activation_rows(
    params: &ResolvedParameters,
    assumptions: &Assumptions,
    policy: &PolicyFacts,
    current: ContractState,
    last_age: u32,
) -> Vec<PreActivationRow> {
    let Some(remaining) = params.max_credit_years.checked_sub(policy.contract_year) else {
        return Vec::new();
    };
    let remaining = remaining.min(last_age.saturating_sub(policy.current_age));

    let premium = policy.initial_premium;
    let growth = assumptions.growth_rate;
    let credited = |years| params.rollup_mode.credited(premium, params.credit_rate, years);
    let step_up_floor = premium * params.step_up_guarantee;

    let mut state = current;
    let mut rows = Vec::with_capacity(remaining as usize + 1);

    for offset in 0..=remaining {
        let contract_year = policy.contract_year + offset;
        let account_value = state.account_value + state.account_value * growth
            - state.benefit_base * params.fee_rate;

        let guaranteed = if contract_year < params.max_credit_years {
            credited(contract_year + 1)
        } else {
            credited(params.max_credit_years).max(step_up_floor)
        };
        let benefit_base = account_value.max(guaranteed).max(state.benefit_base);

        rows.push(PreActivationRow {
            age: policy.current_age + offset,
            contract_year,
            account_value,
            benefit_base,
        });
        state = ContractState {
            account_value,
            benefit_base,
        };
    }

    rows
}

/// Year-by-year income after activating at `scenario.activate_at_age`.
///
/// The year the account runs out still pays MAWP income; PIP income starts
/// the year after.
pub fn income_timeline(projection: &Projection, scenario: &Scenario) -> Vec<IncomeRow> {
    let growth = projection.assumptions.growth_rate;
    let horizon = projection
        .assumptions
        .life_expectancy
        .saturating_sub(scenario.activate_at_age);

    let mut account_value = scenario.av_at_activation;
    let mut depleted = false;
    let mut cumulative_income = 0.0;
    let mut rows = Vec::with_capacity(horizon as usize);

    for year in 0..horizon {
        let age = scenario.activate_at_age + year;
        let (phase, income) = if depleted {
            (IncomePhase::Pip, scenario.pip_income)
        } else {
            account_value = account_value + account_value * growth
                - scenario.annual_fee
                - scenario.mawp_income;
            if account_value <= 0.0 {
                depleted = true;
                account_value = 0.0;
            }
            (IncomePhase::Mawp, scenario.mawp_income)
        };

        cumulative_income += income;
        rows.push(IncomeRow {
            age,
            account_value,
            phase,
            income,
            cumulative_income,
        });
    }

    rows
}

/// Accumulation years before activation followed by the income years
pub fn yearly_breakdown(projection: &Projection, scenario: &Scenario) -> Vec<BreakdownRow> {
    let growth_rate = projection.assumptions.growth_rate;
    let fee_rate = projection.fee_rate;
    let mut rows = Vec::new();

    let mut prev_av = projection.current_account_value;
    let mut prev_bb = projection.current_benefit_base;
    for age in projection.policy.current_age..scenario.activate_at_age {
        let offset = (age - projection.policy.current_age) as usize;
        let growth = prev_av * growth_rate;
        let fees = prev_bb * fee_rate;
        let (net_av, benefit_base) = match projection.pre_activation_rows.get(offset) {
            Some(row) => (row.account_value, row.benefit_base),
            None => {
                let av = prev_av + growth - fees;
                (av, av.max(prev_bb))
            }
        };
        rows.push(BreakdownRow {
            age,
            growth,
            fees,
            income: 0.0,
            gross_av: prev_av + growth,
            net_av,
            phase: BreakdownPhase::Accumulation,
        });
        prev_av = net_av;
        prev_bb = benefit_base;
    }

    let mut account_value = scenario.av_at_activation;
    let mut depleted = false;
    let horizon = projection
        .assumptions
        .life_expectancy
        .saturating_sub(scenario.activate_at_age);

    for year in 0..horizon {
        let age = scenario.activate_at_age + year;
        if depleted {
            rows.push(BreakdownRow {
                age,
                growth: 0.0,
                fees: 0.0,
                income: scenario.pip_income,
                gross_av: 0.0,
                net_av: 0.0,
                phase: BreakdownPhase::InsurerPays,
            });
            continue;
        }

        let growth = account_value * growth_rate;
        let end_of_year = account_value + growth - scenario.annual_fee - scenario.mawp_income;
        rows.push(BreakdownRow {
            age,
            growth,
            fees: scenario.annual_fee,
            income: scenario.mawp_income,
            gross_av: account_value + growth,
            net_av: end_of_year.max(0.0),
            phase: BreakdownPhase::Income,
        });
        depleted = end_of_year <= 0.0;
        account_value = end_of_year.max(0.0);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RateBand, RateTable};

    const EPS: f64 = 1e-6;

    fn flat_params(mawp: f64, pip: Option<f64>) -> ResolvedParameters {
        ResolvedParameters {
            mawp_table: RateTable::new(vec![RateBand::new(0, 120, mawp, mawp)]),
            pip_table: pip.map(|r| RateTable::new(vec![RateBand::new(0, 120, r, r)])),
            ..ResolvedParameters::fallback()
        }
    }

    #[test]
    fn test_current_state_replays_contract_years() {
        let params = ResolvedParameters::fallback();
        let assumptions = Assumptions::default();
        let policy = PolicyFacts {
            contract_year: 1,
            ..Default::default()
        };
        let state = current_state(&params, &assumptions, &policy);
        // 180k grows 5.2% less 1.45% fee on a 180k benefit base
        let expected_av = 180_000.0 * 1.052 - 180_000.0 * 0.0145;
        assert!((state.account_value - expected_av).abs() < EPS);
        // Simple credit: 180k * 1.07
        assert!((state.benefit_base - 192_600.0).abs() < EPS);
    }

    #[test]
    fn test_actual_account_value_takes_precedence() {
        let params = ResolvedParameters::fallback();
        let assumptions = Assumptions::default();
        let policy = PolicyFacts {
            current_account_value: Some(250_000.0),
            ..Default::default()
        };
        let state = current_state(&params, &assumptions, &policy);
        assert_eq!(state.account_value, 250_000.0);
        assert_eq!(state.benefit_base, 250_000.0);

        let ignored = PolicyFacts {
            current_account_value: Some(0.0),
            ..Default::default()
        };
        let replayed = current_state(&params, &assumptions, &ignored);
        assert!(replayed.account_value < 250_000.0);
        assert!((replayed.benefit_base - 217_800.0).abs() < EPS);
    }

    #[test]
    fn test_pre_activation_rows_cover_credit_window() {
        let params = ResolvedParameters::fallback();
        let assumptions = Assumptions::default();
        let policy = PolicyFacts::default();
        let current = current_state(&params, &assumptions, &policy);
        let rows = pre_activation_rows(&params, &assumptions, &policy, current, 85);

        // Contract years 3 through 12 inclusive
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].age, 63);
        assert_eq!(rows[0].contract_year, 3);
        assert!((rows[0].benefit_base - 230_400.0).abs() < EPS);

        // Final row applies the 200% step-up floor
        let last = rows.last().unwrap();
        assert_eq!(last.contract_year, 12);
        assert!((last.benefit_base - 360_000.0).abs() < EPS);
    }

    #[test]
    fn test_pre_activation_rows_empty_past_window() {
        let params = ResolvedParameters::fallback();
        let assumptions = Assumptions::default();
        let policy = PolicyFacts {
            contract_year: 15,
            ..Default::default()
        };
        let current = current_state(&params, &assumptions, &policy);
        assert!(pre_activation_rows(&params, &assumptions, &policy, current, 85).is_empty());

        // Lookups still extrapolate from the current state
        let projection = run_projection(&params, &assumptions, &policy);
        assert_eq!(projection.scenarios.len(), 16);
        let later = projection.scenario_at(70).unwrap();
        assert!(later.benefit_base_at_activation >= projection.current_benefit_base);
    }

    #[test]
    fn test_long_credit_window_stops_at_last_queried_age() {
        let params = ResolvedParameters {
            max_credit_years: u32::MAX,
            ..ResolvedParameters::fallback()
        };
        let assumptions = Assumptions::default();
        let policy = PolicyFacts::default();
        let current = current_state(&params, &assumptions, &policy);
        let rows = pre_activation_rows(&params, &assumptions, &policy, current, 80);
        assert_eq!(rows.len(), 18);
        assert_eq!(rows.last().unwrap().age, 80);

        let projection = run_projection(&params, &assumptions, &policy);
        assert_eq!(projection.pre_activation_rows.len(), 23);
        assert_eq!(projection.scenarios.len(), 16);
        assert!(projection.optimal_scenario().is_some());
    }

    #[test]
    fn test_scenario_without_pip_table_keeps_mawp_rate() {
        let params = flat_params(0.09, None);
        let projection = run_projection(&params, &Assumptions::default(), &PolicyFacts::default());
        for scenario in &projection.scenarios {
            assert_eq!(scenario.pip_rate, scenario.mawp_rate);
            assert!((scenario.pip_income - scenario.mawp_income).abs() < EPS);
        }
    }

    #[test]
    fn test_depletion_splits_totals() {
        // High withdrawal rate with no growth depletes quickly
        let params = flat_params(0.20, Some(0.05));
        let assumptions = Assumptions {
            growth_rate: 0.0,
            ..Default::default()
        };
        let projection = run_projection(&params, &assumptions, &PolicyFacts::default());
        let scenario = projection.scenario_at(63).unwrap();

        let depletes = scenario.depletes_at_age.unwrap();
        assert_eq!(scenario.mawp_years, depletes - 63);
        assert_eq!(scenario.pip_years, 85 - depletes);
        let expected_mawp = scenario.mawp_years as f64 * scenario.mawp_income;
        assert!((scenario.mawp_total - expected_mawp).abs() < EPS);
        assert!((scenario.pip_total - scenario.pip_years as f64 * scenario.pip_income).abs() < EPS);
        assert!((scenario.grand_total - scenario.mawp_total - scenario.pip_total).abs() < EPS);
    }

    #[test]
    fn test_sustained_account_has_no_pip() {
        let params = flat_params(0.01, Some(0.005));
        let projection = run_projection(&params, &Assumptions::default(), &PolicyFacts::default());
        let scenario = projection.scenario_at(63).unwrap();
        assert_eq!(scenario.depletes_at_age, None);
        assert_eq!(scenario.mawp_years, 22);
        assert_eq!(scenario.pip_total, 0.0);
    }

    #[test]
    fn test_degenerate_search_range() {
        let policy = PolicyFacts {
            current_age: 80,
            ..Default::default()
        };
        let projection = run_projection(
            &ResolvedParameters::fallback(),
            &Assumptions::default(),
            &policy,
        );
        assert!(projection.is_degenerate());
        assert_eq!(projection.optimal_age, 80);
        assert!(projection.optimal_scenario().is_none());
        assert_eq!(projection.waiting_gain(), 0.0);
    }

    #[test]
    fn test_activation_past_life_expectancy_has_zero_income() {
        let assumptions = Assumptions {
            life_expectancy: 70,
            ..Default::default()
        };
        let projection = run_projection(
            &ResolvedParameters::fallback(),
            &assumptions,
            &PolicyFacts::default(),
        );
        let late = projection.scenario_at(75).unwrap();
        assert_eq!(late.mawp_years, 0);
        assert_eq!(late.grand_total, 0.0);
    }

    #[test]
    fn test_income_timeline_matches_scenario() {
        let params = flat_params(0.20, Some(0.05));
        let assumptions = Assumptions {
            growth_rate: 0.0,
            ..Default::default()
        };
        let projection = run_projection(&params, &assumptions, &PolicyFacts::default());
        let scenario = projection.scenario_at(63).unwrap();
        let timeline = income_timeline(&projection, scenario);

        assert_eq!(timeline.len(), 22);
        let mawp_years = timeline.iter().filter(|r| r.phase == IncomePhase::Mawp).count();
        assert_eq!(mawp_years as u32, scenario.mawp_years);
        let last = timeline.last().unwrap();
        assert!((last.cumulative_income - scenario.grand_total).abs() < 1e-3);
        assert!(timeline.iter().all(|r| r.account_value >= 0.0));
    }

    #[test]
    fn test_yearly_breakdown_phases() {
        let projection = run_projection(
            &ResolvedParameters::fallback(),
            &Assumptions::default(),
            &PolicyFacts::default(),
        );
        let scenario = projection.scenario_at(66).unwrap();
        let rows = yearly_breakdown(&projection, scenario);

        let accumulation: Vec<_> = rows
            .iter()
            .filter(|r| r.phase == BreakdownPhase::Accumulation)
            .collect();
        assert_eq!(accumulation.len(), 3);
        assert_eq!(accumulation[0].age, 63);
        assert_eq!(rows[3].age, 66);
        assert_eq!(rows[3].phase, BreakdownPhase::Income);
        assert_eq!(rows.last().unwrap().age, 84);
        for row in rows.iter().filter(|r| r.phase == BreakdownPhase::InsurerPays) {
            assert_eq!(row.net_av, 0.0);
            assert!((row.income - scenario.pip_income).abs() < EPS);
        }
    }
}
