//! Report rendering for the command line
//!
//! `ProjectionReport` collects everything one run produces into a single
//! serializable value. The JSON format dumps it as-is; the text format is a
//! condensed view for a terminal.

use std::fmt;

use serde::Serialize;
use vaplan_core::model::{
    Assumptions, BreakdownRow, ComparisonPoint, IncomePhase, IncomeRow, LifoPhase, LifoTaxResult,
    PolicyFacts, PreActivationRow, Projection, ResolvedParameters, RiderCatalog, Scenario,
};
use vaplan_core::projection::{income_timeline, yearly_breakdown};
use vaplan_core::taxes::{LifoInputs, allocate_lifo_tax, taxable_comparison};

use crate::util::format::{format_compact_currency, format_currency, format_percentage};

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub product_name: String,
    pub rider_name: String,
    pub selected_option: Option<String>,
    /// Parameters came from carrier data rather than the built-in product
    pub from_api: bool,
    pub assumptions: Assumptions,
    pub policy: PolicyFacts,
    pub fee_rate: f64,
    pub current_account_value: f64,
    pub current_benefit_base: f64,
    pub optimal_age: u32,
    /// Activation age the detail sections describe
    pub selected_age: Option<u32>,
    pub mawp_band: String,
    pub waiting_gain: f64,
    pub scenarios: Vec<Scenario>,
    pub pre_activation_rows: Vec<PreActivationRow>,
    pub income_timeline: Vec<IncomeRow>,
    pub yearly_breakdown: Vec<BreakdownRow>,
    pub lifo: LifoTaxResult,
    pub comparison: Vec<ComparisonPoint>,
}

impl ProjectionReport {
    pub fn build(
        params: &ResolvedParameters,
        projection: &Projection,
        activation_override: Option<u32>,
    ) -> Self {
        if let Some(age) = activation_override
            && projection.scenario_at(age).is_none()
        {
            tracing::warn!(
                age,
                optimal_age = projection.optimal_age,
                "activation age is outside the projected range; reporting the optimal age"
            );
        }

        let selected = projection.selected(activation_override).copied();
        let (timeline, breakdown, lifo, comparison) = match &selected {
            Some(scenario) => {
                let lifo = allocate_lifo_tax(scenario, &LifoInputs::from_projection(projection));
                let comparison = taxable_comparison(projection, scenario, &lifo);
                (
                    income_timeline(projection, scenario),
                    yearly_breakdown(projection, scenario),
                    lifo,
                    comparison,
                )
            }
            None => (
                Vec::new(),
                Vec::new(),
                LifoTaxResult::empty(projection.current_account_value),
                Vec::new(),
            ),
        };

        let selected_age = selected.map(|s| s.activate_at_age);
        let mawp_band = params
            .mawp_table
            .band_label(selected_age.unwrap_or(projection.policy.current_age));

        Self {
            product_name: params.product_name.clone(),
            rider_name: params.rider_name.clone(),
            selected_option: params.selected_option.clone(),
            from_api: params.from_api,
            assumptions: projection.assumptions,
            policy: projection.policy,
            fee_rate: projection.fee_rate,
            current_account_value: projection.current_account_value,
            current_benefit_base: projection.current_benefit_base,
            optimal_age: projection.optimal_age,
            selected_age,
            mawp_band,
            waiting_gain: projection.waiting_gain(),
            scenarios: projection.scenarios.clone(),
            pre_activation_rows: projection.pre_activation_rows.clone(),
            income_timeline: timeline,
            yearly_breakdown: breakdown,
            lifo,
            comparison,
        }
    }

    fn selected_scenario(&self) -> Option<&Scenario> {
        let age = self.selected_age?;
        self.scenarios.iter().find(|s| s.activate_at_age == age)
    }
}

pub fn render_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn render_text(report: &ProjectionReport) -> String {
    TextReport(report).to_string()
}

struct TextReport<'a>(&'a ProjectionReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let option = r
            .selected_option
            .as_deref()
            .map(|o| format!(" ({o})"))
            .unwrap_or_default();
        let source = if r.from_api {
            "carrier data"
        } else {
            "built-in fallback"
        };

        writeln!(f, "{} / {}{} [{}]", r.product_name, r.rider_name, option, source)?;
        writeln!(
            f,
            "Age {}, contract year {}, premium {}, cost basis {}",
            r.policy.current_age,
            r.policy.contract_year,
            format_currency(r.policy.initial_premium),
            format_currency(r.policy.cost_basis)
        )?;
        writeln!(
            f,
            "Account value {}  Benefit base {}  Rider fee {}",
            format_currency(r.current_account_value),
            format_currency(r.current_benefit_base),
            format_percentage(r.fee_rate)
        )?;
        writeln!(
            f,
            "Growth {}  Life expectancy {}  Tax rate {}",
            format_percentage(r.assumptions.growth_rate),
            r.assumptions.life_expectancy,
            format_percentage(r.assumptions.tax_rate)
        )?;
        writeln!(f)?;

        if r.scenarios.is_empty() {
            writeln!(f, "No activation ages to evaluate at age {}.", r.policy.current_age)?;
            return Ok(());
        }

        writeln!(
            f,
            "  {:>3}  {:>12}  {:>6}  {:>9}  {:>8}  {:>10}",
            "Age", "Benefit base", "MAWP", "Income", "Depletes", "Lifetime"
        )?;
        for s in &r.scenarios {
            let marker = if s.activate_at_age == r.optimal_age {
                '*'
            } else if Some(s.activate_at_age) == r.selected_age {
                '>'
            } else {
                ' '
            };
            let depletes = s
                .depletes_at_age
                .map_or_else(|| "never".to_string(), |a| a.to_string());
            writeln!(
                f,
                "{} {:>3}  {:>12}  {:>6}  {:>9}  {:>8}  {:>10}",
                marker,
                s.activate_at_age,
                format_currency(s.benefit_base_at_activation),
                format_percentage(s.mawp_rate),
                format_currency(s.mawp_income),
                depletes,
                format_currency(s.grand_total)
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Optimal activation age {}: waiting adds {} of lifetime income",
            r.optimal_age,
            format_compact_currency(r.waiting_gain)
        )?;

        let Some(selected) = r.selected_scenario() else {
            return Ok(());
        };
        writeln!(
            f,
            "Activating at {} (band {}): {} a year while the account lasts, then {}",
            selected.activate_at_age,
            r.mawp_band,
            format_currency(selected.mawp_income),
            format_currency(selected.pip_income)
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "LIFO tax schedule (total gain {})",
            format_currency(r.lifo.total_gain)
        )?;
        writeln!(
            f,
            "  {:>3}  {:>5}  {:>9}  {:>9}  {:>9}  {:>8}  {:>9}  {}",
            "Age", "Phase", "Gross", "Taxable", "Tax-free", "Tax", "After-tax", "Status"
        )?;
        for row in &r.lifo.year_by_year {
            let phase = match row.phase {
                IncomePhase::Mawp => "MAWP",
                IncomePhase::Pip => "PIP",
            };
            let status = match row.lifo_phase {
                LifoPhase::Gain => "gains",
                LifoPhase::Basis => "basis",
                LifoPhase::FullyTaxable => "taxable",
            };
            writeln!(
                f,
                "  {:>3}  {:>5}  {:>9}  {:>9}  {:>9}  {:>8}  {:>9}  {}",
                row.age,
                phase,
                format_currency(row.gross_income),
                format_currency(row.taxable_portion),
                format_currency(row.tax_free_portion),
                format_currency(row.tax_owed),
                format_currency(row.after_tax_income),
                status
            )?;
        }
        writeln!(
            f,
            "Lifetime tax {}, lifetime after-tax income {}",
            format_currency(r.lifo.total_tax()),
            format_currency(r.lifo.total_after_tax())
        )?;

        if let Some(end) = r.comparison.last() {
            writeln!(
                f,
                "By age {}: annuity {} after tax vs taxable account {}",
                end.age,
                format_currency(end.annuity_cumulative_after_tax),
                format_currency(end.taxable_cumulative_after_tax)
            )?;
        }
        Ok(())
    }
}

/// Text listing of a catalog, or of the fallback product when there is none
pub fn render_catalog_text(catalog: Option<&RiderCatalog>) -> String {
    CatalogText(catalog).to_string()
}

struct CatalogText<'a>(Option<&'a RiderCatalog>);

impl fmt::Display for CatalogText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(catalog) = self.0 else {
            let fallback = ResolvedParameters::fallback();
            return writeln!(
                f,
                "No active riders in payload; projections use the built-in {} / {}",
                fallback.product_name, fallback.rider_name
            );
        };

        writeln!(f, "{}", catalog.product_name)?;
        let default = catalog.default_rider().map(|r| r.name.as_str());
        for rider in &catalog.riders {
            let marker = if Some(rider.name.as_str()) == default {
                '*'
            } else {
                ' '
            };
            writeln!(
                f,
                "{} {} (id {}): credit {} for {} years, step-up {}x, fee {}",
                marker,
                rider.name,
                rider.id,
                format_percentage(rider.credit_rate),
                rider.max_credit_years,
                rider.step_up_guarantee,
                format_percentage(rider.fee_rate)
            )?;
            for option in &rider.income_options {
                let Some(tables) = rider.tables_for(option) else {
                    continue;
                };
                let bands: Vec<String> = tables
                    .mawp_table
                    .bands()
                    .iter()
                    .map(|b| format!("{}-{} {}", b.min_age, b.max_age, format_percentage(b.single)))
                    .collect();
                let pip = if tables.pip_table.is_some() {
                    "with PIP schedule"
                } else {
                    "no PIP schedule"
                };
                writeln!(f, "    {}: {} ({})", option, bands.join(", "), pip)?;
            }
        }
        Ok(())
    }
}
