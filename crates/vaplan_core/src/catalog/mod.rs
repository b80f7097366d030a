//! Rider catalog extraction
//!
//! Turns the third-party annuity-data payload into a `RiderCatalog`:
//! terminated riders are dropped, each remaining rider's case list is split
//! into fee, roll-up and withdrawal cases, and withdrawal cases are grouped
//! into per-option MAWP / PIP rate tables through a `CaseClassifier`.
//!
//! Extraction never fails loudly. A payload that does not parse, or that has
//! no live riders, yields `None` and the resolver falls back to built-in
//! parameters.

mod classify;
mod payload;

pub use classify::{CaseClassifier, NoteClassifier, option_numbers_in};
pub use payload::{
    CaseKind, RawBasicInfo, RawCase, RawPayload, RawProduct, RawRider, RawSection, RawTabs,
};

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::model::{
    FALLBACK_CREDIT_RATE, FALLBACK_FEE_RATE, FALLBACK_MAX_CREDIT_YEARS, FALLBACK_PRODUCT_NAME,
    FALLBACK_STEP_UP_GUARANTEE, OptionTables, RateBand, RateTable, RiderCatalog, RiderDefinition,
    RollupMode, fallback_mawp_table,
};

/// Option name used when a rider's cases name no income options
pub const DEFAULT_OPTION: &str = "Default";

const UNKNOWN_RIDER: &str = "Unknown Rider";

/// Single-life charge type code on fee cases
const SINGLE_LIFE_CHARGE: i64 = 1;

/// Longest roll-up window a rider record is trusted to carry
const MAX_CREDIT_YEARS: f64 = 40.0;

/// Parse a payload string
pub fn parse_payload(raw: &str) -> Result<RawPayload> {
    Ok(serde_json::from_str(raw)?)
}

/// Extract a catalog from an already-parsed JSON value using the note heuristic
pub fn extract_catalog(raw: &serde_json::Value) -> Option<RiderCatalog> {
    extract_catalog_with(raw, &NoteClassifier)
}

/// Extract a catalog from a JSON string using the note heuristic
pub fn extract_catalog_str(raw: &str) -> Option<RiderCatalog> {
    let outcome =
        parse_payload(raw).and_then(|payload| try_extract_catalog(&payload, &NoteClassifier));
    log_outcome(outcome)
}

/// Extract a catalog with a caller-supplied classifier
pub fn extract_catalog_with<C>(raw: &serde_json::Value, classifier: &C) -> Option<RiderCatalog>
where
    C: CaseClassifier + ?Sized,
{
    let outcome = RawPayload::deserialize(raw)
        .map_err(CatalogError::from)
        .and_then(|payload| try_extract_catalog(&payload, classifier));
    log_outcome(outcome)
}

fn log_outcome(outcome: Result<RiderCatalog>) -> Option<RiderCatalog> {
    match outcome {
        Ok(catalog) => {
            tracing::debug!(
                product = %catalog.product_name,
                riders = catalog.riders.len(),
                "rider catalog extracted"
            );
            Some(catalog)
        }
        Err(CatalogError::Empty) => {
            tracing::info!("payload has no active riders; using fallback parameters");
            None
        }
        Err(err) => {
            tracing::warn!("{err}; using fallback parameters");
            None
        }
    }
}

/// Build a catalog from a parsed payload, reporting why none could be built
pub fn try_extract_catalog<C>(payload: &RawPayload, classifier: &C) -> Result<RiderCatalog>
where
    C: CaseClassifier + ?Sized,
{
    let riders: Vec<RiderDefinition> = payload
        .riders()
        .iter()
        .filter(|r| !r.terminated())
        .map(|r| build_rider(r, classifier))
        .collect();

    if riders.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(RiderCatalog {
        product_name: payload
            .product_name()
            .unwrap_or(FALLBACK_PRODUCT_NAME)
            .to_string(),
        riders,
    })
}

fn build_rider<C>(rider: &RawRider, classifier: &C) -> RiderDefinition
where
    C: CaseClassifier + ?Sized,
{
    let cases = rider.cases();
    let rollup_case = cases.iter().find(|c| c.kind() == CaseKind::Rollup);

    let credit_rate = rider
        .rollup_percentage
        .or_else(|| rollup_case.and_then(|c| c.num1))
        .map(|pct| pct / 100.0)
        .unwrap_or(FALLBACK_CREDIT_RATE);

    let max_credit_years = credit_years(rider.max_rollup_years)
        .or_else(|| credit_years(rollup_case.and_then(|c| c.max_rollup_years)))
        .unwrap_or(FALLBACK_MAX_CREDIT_YEARS);

    let step_up_guarantee = rider
        .step_up_perct
        .map(|pct| pct / 100.0)
        .unwrap_or(FALLBACK_STEP_UP_GUARANTEE);

    let name = rider
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_RIDER.to_string());
    let id = rider.id_text().unwrap_or_else(|| name.clone());

    let (income_options, option_tables) = build_option_tables(cases, classifier);

    RiderDefinition {
        id,
        name,
        credit_rate,
        max_credit_years,
        step_up_guarantee,
        fee_rate: fee_rate(cases),
        rollup_mode: RollupMode::Simple,
        income_options,
        option_tables,
    }
}

fn credit_years(value: Option<f64>) -> Option<u32> {
    let years = value.filter(|v| *v >= 1.0)?;
    if years > MAX_CREDIT_YEARS {
        tracing::warn!(years, "ignoring implausible roll-up window");
        return None;
    }
    Some(years.round() as u32)
}

/// Annual fee as a fraction, from the single-life charge case when present
fn fee_rate(cases: &[RawCase]) -> f64 {
    let fee_cases: Vec<&RawCase> = cases
        .iter()
        .filter(|c| c.kind() == CaseKind::Fee)
        .collect();
    let chosen = fee_cases
        .iter()
        .find(|c| c.single_joint_chrg_type == Some(SINGLE_LIFE_CHARGE))
        .or_else(|| fee_cases.first());

    match chosen {
        Some(case) => normalize_fee(case.num1.unwrap_or(0.0)),
        None => FALLBACK_FEE_RATE,
    }
}

/// Fee percentages below 1 are quarterly charges; anything else is annual
pub fn normalize_fee(raw_percent: f64) -> f64 {
    let annual_percent = if raw_percent < 1.0 {
        raw_percent * 4.0
    } else {
        raw_percent
    };
    annual_percent / 100.0
}

fn build_option_tables<C>(
    cases: &[RawCase],
    classifier: &C,
) -> (Vec<String>, FxHashMap<String, OptionTables>)
where
    C: CaseClassifier + ?Sized,
{
    let withdrawals: Vec<&RawCase> = cases
        .iter()
        .filter(|c| c.kind() == CaseKind::Withdrawal)
        .collect();
    let all_banded = band_table(withdrawals.iter().copied());

    let numbers: BTreeSet<u32> = cases
        .iter()
        .flat_map(|c| classifier.option_numbers(c))
        .collect();

    let mut options = Vec::new();
    let mut tables = FxHashMap::default();

    if numbers.is_empty() {
        let primary = band_table(withdrawals.iter().copied().filter(|c| classifier.is_primary(c)));
        let secondary =
            band_table(withdrawals.iter().copied().filter(|c| classifier.is_secondary(c)));
        options.push(DEFAULT_OPTION.to_string());
        tables.insert(
            DEFAULT_OPTION.to_string(),
            option_tables(primary, secondary, &all_banded),
        );
        return (options, tables);
    }

    for number in numbers {
        let in_option: Vec<&RawCase> = withdrawals
            .iter()
            .copied()
            .filter(|c| classifier.option_numbers(c).contains(&number))
            .collect();
        let primary = band_table(in_option.iter().copied().filter(|c| classifier.is_primary(c)));
        let secondary =
            band_table(in_option.iter().copied().filter(|c| classifier.is_secondary(c)));

        let name = format!("Option {number}");
        tables.insert(name.clone(), option_tables(primary, secondary, &all_banded));
        options.push(name);
    }

    (options, tables)
}

fn option_tables(primary: RateTable, secondary: RateTable, all_banded: &RateTable) -> OptionTables {
    let mawp_table = if !primary.is_empty() {
        primary
    } else if !all_banded.is_empty() {
        all_banded.clone()
    } else {
        fallback_mawp_table()
    };

    OptionTables {
        mawp_table,
        pip_table: (!secondary.is_empty()).then_some(secondary),
    }
}

/// Rate bands from withdrawal cases that carry an age band
fn band_table<'a>(cases: impl Iterator<Item = &'a RawCase>) -> RateTable {
    let bands = cases
        .filter_map(|c| {
            let min_age = c.age_band1?;
            let max_age = c.age_band2.unwrap_or(min_age);
            let single = c.num1.unwrap_or(0.0);
            let joint = c.num2.filter(|v| *v != 0.0).unwrap_or(single);
            Some(RateBand::new(
                min_age.round() as u32,
                max_age.round() as u32,
                single / 100.0,
                joint / 100.0,
            ))
        })
        .collect();
    RateTable::new(bands)
}
