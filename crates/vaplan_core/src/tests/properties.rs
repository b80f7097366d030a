//! Property tests over randomized contracts and assumptions

use proptest::prelude::*;

use crate::model::{
    Assumptions, Coverage, PolicyFacts, RateBand, RateTable, ResolvedParameters, RollupMode,
};
use crate::projection::run_projection;
use crate::resolve::resolve_parameters;
use crate::taxes::{LifoInputs, allocate_lifo_tax};

fn bands_strategy() -> impl Strategy<Value = Vec<RateBand>> {
    prop::collection::vec((40u32..95, 0u32..10, 1u32..1200, 1u32..1200), 1..6).prop_map(|raw| {
        raw.into_iter()
            .map(|(min, span, single, joint)| {
                RateBand::new(min, min + span, single as f64 / 10_000.0, joint as f64 / 10_000.0)
            })
            .collect()
    })
}

fn params_strategy() -> impl Strategy<Value = ResolvedParameters> {
    (
        0u32..1200,
        0u32..300,
        1u32..16,
        100u32..300,
        any::<bool>(),
        bands_strategy(),
        prop::option::of(bands_strategy()),
    )
        .prop_map(|(credit_bp, fee_bp, years, step_up_pct, compound, mawp, pip)| {
            ResolvedParameters {
                credit_rate: credit_bp as f64 / 10_000.0,
                fee_rate: fee_bp as f64 / 10_000.0,
                max_credit_years: years,
                step_up_guarantee: step_up_pct as f64 / 100.0,
                rollup_mode: if compound {
                    RollupMode::Compound
                } else {
                    RollupMode::Simple
                },
                mawp_table: RateTable::new(mawp),
                pip_table: pip.map(RateTable::new),
                ..ResolvedParameters::fallback()
            }
        })
}

fn inputs_strategy() -> impl Strategy<Value = (Assumptions, PolicyFacts)> {
    (
        -300i32..1200,
        70u32..100,
        0u32..50,
        any::<bool>(),
        10_000u32..1_000_000,
        0u32..1_000_000,
        0u32..20,
        45u32..80,
        prop::option::of(1_000u32..1_500_000),
    )
        .prop_map(
            |(growth_bp, life, tax_pct, joint, premium, basis, year, age, actual)| {
                let assumptions = Assumptions {
                    growth_rate: growth_bp as f64 / 10_000.0,
                    life_expectancy: life,
                    tax_rate: tax_pct as f64 / 100.0,
                    coverage: if joint { Coverage::Joint } else { Coverage::Single },
                };
                let policy = PolicyFacts {
                    initial_premium: premium as f64,
                    cost_basis: basis as f64,
                    contract_year: year,
                    current_age: age,
                    current_account_value: actual.map(f64::from),
                };
                (assumptions, policy)
            },
        )
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_rate_lookup_is_total(bands in bands_strategy(), age in 0u32..130) {
        let table = RateTable::new(bands);
        let band = table.band_for(age);
        prop_assert!(band.is_some());
        let band = band.unwrap();
        if !band.covers(age) {
            prop_assert_eq!(Some(band), table.bands().last());
        }
        prop_assert!(table.rate(age, Coverage::Single).is_some());
        prop_assert!(table.rate(age, Coverage::Joint).is_some());
    }

    #[test]
    fn prop_benefit_base_never_decreases(
        params in params_strategy(),
        (assumptions, policy) in inputs_strategy(),
    ) {
        let projection = run_projection(&params, &assumptions, &policy);
        let mut previous = projection.current_benefit_base;
        for row in &projection.pre_activation_rows {
            prop_assert!(row.benefit_base >= previous);
            previous = row.benefit_base;
        }
        for pair in projection.scenarios.windows(2) {
            prop_assert!(pair[1].benefit_base_at_activation >= pair[0].benefit_base_at_activation);
        }
    }

    #[test]
    fn prop_scenario_totals_decompose(
        params in params_strategy(),
        (assumptions, policy) in inputs_strategy(),
    ) {
        let projection = run_projection(&params, &assumptions, &policy);
        for scenario in &projection.scenarios {
            prop_assert_eq!(scenario.grand_total, scenario.mawp_total + scenario.pip_total);
            if scenario.depletes_at_age.is_none() {
                prop_assert_eq!(scenario.pip_total, 0.0);
            }
        }
        if let Some(optimal) = projection.optimal_scenario() {
            for scenario in &projection.scenarios {
                prop_assert!(scenario.grand_total <= optimal.grand_total);
            }
        }
    }

    #[test]
    fn prop_lifo_conserves_income(
        params in params_strategy(),
        (assumptions, policy) in inputs_strategy(),
    ) {
        let projection = run_projection(&params, &assumptions, &policy);
        let inputs = LifoInputs::from_projection(&projection);

        for scenario in &projection.scenarios {
            let result = allocate_lifo_tax(scenario, &inputs);
            let mut gain = f64::INFINITY;
            let mut basis = f64::INFINITY;
            let (mut gross, mut split) = (0.0, 0.0);

            for row in &result.year_by_year {
                let year_split = row.taxable_portion + row.tax_free_portion;
                let tolerance = 1e-6 * row.gross_income.max(1.0);
                prop_assert!((year_split - row.gross_income).abs() <= tolerance);
                prop_assert!(row.remaining_gain >= 0.0 && row.remaining_gain <= gain);
                prop_assert!(row.remaining_basis >= 0.0 && row.remaining_basis <= basis);
                gain = row.remaining_gain;
                basis = row.remaining_basis;
                gross += row.gross_income;
                split += year_split;
            }
            prop_assert!((gross - split).abs() <= 1e-6 * gross.max(1.0));
        }
    }

    #[test]
    fn prop_fallback_ignores_selection(rider in ".*", option in prop::option::of(".*")) {
        let params = resolve_parameters(None, Some(rider.as_str()), option.as_deref());
        prop_assert_eq!(params, ResolvedParameters::fallback());
    }
}
