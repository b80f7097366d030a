//! Tests for the built-in product with the default policy facts
//!
//! With no carrier data the engine projects a 7% simple roll-up, 1.45% fee,
//! 12-year credit window and 200% step-up on a $180,000 premium. These tests
//! verify that:
//! - Waiting to activate beats activating immediately
//! - The optimal scenario's totals decompose into MAWP and PIP income
//! - The LIFO walk passes through gain, basis and fully taxable years

use crate::model::{Assumptions, IncomePhase, LifoPhase, PolicyFacts, ResolvedParameters};
use crate::projection::{income_timeline, run_projection, yearly_breakdown};
use crate::resolve::resolve_parameters;
use crate::taxes::{allocate_selected, taxable_comparison};

const EPS: f64 = 0.01;

fn fallback_projection() -> crate::model::Projection {
    let params = resolve_parameters(None, None, None);
    run_projection(&params, &Assumptions::default(), &PolicyFacts::default())
}

#[test]
fn test_waiting_is_favored() {
    let projection = fallback_projection();
    let current = projection.current_scenario().unwrap();
    let optimal = projection.optimal_scenario().unwrap();

    assert!(
        projection.optimal_age > 63,
        "Expected optimal age after 63, got {}",
        projection.optimal_age
    );
    assert!(optimal.grand_total > current.grand_total);
    assert!(projection.waiting_gain() > 0.0);
}

#[test]
fn test_optimal_scenario_values() {
    let projection = fallback_projection();
    assert_eq!(projection.optimal_age, 72);

    let optimal = projection.optimal_scenario().unwrap();
    // Benefit base carries the year-12 credit: 180k * (1 + 0.07 * 12)
    assert!((optimal.benefit_base_at_activation - 331_200.0).abs() < EPS);
    assert!((optimal.mawp_rate - 0.0925).abs() < 1e-12);
    assert!((optimal.pip_rate - 0.035).abs() < 1e-12);
    assert_eq!(optimal.depletes_at_age, Some(83));
    assert_eq!(optimal.mawp_years, 11);
    assert_eq!(optimal.pip_years, 2);
    assert!(
        (optimal.grand_total - 360_180.0).abs() < 1.0,
        "Expected grand total near 360,180, got {}",
        optimal.grand_total
    );
}

#[test]
fn test_current_state() {
    let projection = fallback_projection();
    assert!((projection.current_benefit_base - 217_800.0).abs() < EPS);
    assert!(projection.current_account_value < projection.current_benefit_base);
    assert_eq!(projection.pre_activation_rows.len(), 10);

    let current = projection.current_scenario().unwrap();
    assert!((current.mawp_rate - 0.061).abs() < 1e-12);
    assert!((current.grand_total - 279_873.0).abs() < 1.0);
}

#[test]
fn test_late_activation_never_depletes() {
    let projection = fallback_projection();
    for age in 75..=78 {
        let scenario = projection.scenario_at(age).unwrap();
        assert_eq!(scenario.depletes_at_age, None, "age {age}");
        assert_eq!(scenario.pip_total, 0.0);
        assert!((scenario.benefit_base_at_activation - 360_000.0).abs() < EPS);
    }
}

#[test]
fn test_lifo_phases() {
    let projection = fallback_projection();
    let lifo = allocate_selected(&projection, None);
    assert_eq!(lifo.year_by_year.len(), 13);
    assert!(lifo.total_gain > 0.0);

    let phases: Vec<LifoPhase> = lifo.year_by_year.iter().map(|r| r.lifo_phase).collect();
    assert_eq!(phases[0], LifoPhase::Gain);
    assert!(phases.contains(&LifoPhase::Basis));
    assert_eq!(*phases.last().unwrap(), LifoPhase::FullyTaxable);

    assert_eq!(lifo.basis_start_age(), Some(77));
    assert_eq!(lifo.fully_taxable_age(), Some(80));

    let pip_years = lifo
        .year_by_year
        .iter()
        .filter(|r| r.phase == IncomePhase::Pip)
        .count();
    assert_eq!(pip_years, 2);

    // Basis comes back tax free exactly once
    let tax_free: f64 = lifo.year_by_year.iter().map(|r| r.tax_free_portion).sum();
    assert!((tax_free - 100_000.0).abs() < EPS);
}

#[test]
fn test_override_selects_other_age() {
    let projection = fallback_projection();
    let lifo = allocate_selected(&projection, Some(66));
    assert_eq!(lifo.year_by_year[0].age, 66);

    // Out-of-range override falls back to the optimum
    let fallback = allocate_selected(&projection, Some(90));
    assert_eq!(fallback.year_by_year[0].age, 72);
}

#[test]
fn test_timelines_line_up() {
    let projection = fallback_projection();
    let optimal = *projection.optimal_scenario().unwrap();

    let income = income_timeline(&projection, &optimal);
    assert_eq!(income.len(), 13);
    let last = income.last().unwrap();
    assert!((last.cumulative_income - optimal.grand_total).abs() < EPS);

    let breakdown = yearly_breakdown(&projection, &optimal);
    assert_eq!(breakdown.len(), 9 + 13);
    assert!((breakdown[8].net_av - optimal.av_at_activation).abs() < EPS);

    let lifo = allocate_selected(&projection, None);
    let comparison = taxable_comparison(&projection, &optimal, &lifo);
    assert_eq!(comparison.len(), 13);
    let end = comparison.last().unwrap();
    assert!((end.annuity_cumulative_after_tax - lifo.total_after_tax()).abs() < EPS);
    assert!(end.annuity_cumulative_after_tax > end.taxable_cumulative_after_tax);
}

#[test]
fn test_fallback_is_stable() {
    let explicit = ResolvedParameters::fallback();
    let resolved = resolve_parameters(None, Some("Anything"), Some("Option 7"));
    assert_eq!(explicit, resolved);
}
