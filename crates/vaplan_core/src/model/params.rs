//! Flat rider parameters consumed by the projection

use serde::{Deserialize, Serialize};

use super::rates::{RateBand, RateTable};
use super::rider::RollupMode;

pub const FALLBACK_PRODUCT_NAME: &str = "Polaris Platinum III";
pub const FALLBACK_RIDER_NAME: &str = "Polaris Income Max";
pub const FALLBACK_CREDIT_RATE: f64 = 0.07;
pub const FALLBACK_FEE_RATE: f64 = 0.0145;
pub const FALLBACK_MAX_CREDIT_YEARS: u32 = 12;
pub const FALLBACK_STEP_UP_GUARANTEE: f64 = 2.0;

/// Rate used when a MAWP table turns out to be empty
pub const DEFAULT_MAWP_RATE: f64 = 0.0935;
/// Rate used when a PIP table turns out to be empty
pub const DEFAULT_PIP_RATE: f64 = 0.035;

const FALLBACK_MAWP_BANDS: [RateBand; 5] = [
    RateBand::new(45, 59, 0.0505, 0.0505),
    RateBand::new(60, 64, 0.0610, 0.0610),
    RateBand::new(65, 69, 0.0900, 0.0900),
    RateBand::new(70, 74, 0.0925, 0.0925),
    RateBand::new(75, 99, 0.0935, 0.0935),
];

const FALLBACK_PIP_BANDS: [RateBand; 2] = [
    RateBand::new(45, 64, 0.0325, 0.0325),
    RateBand::new(65, 99, 0.0350, 0.0350),
];

pub fn fallback_mawp_table() -> RateTable {
    RateTable::new(FALLBACK_MAWP_BANDS.to_vec())
}

pub fn fallback_pip_table() -> RateTable {
    RateTable::new(FALLBACK_PIP_BANDS.to_vec())
}

/// Everything the simulator needs to know about the selected rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParameters {
    pub product_name: String,
    pub rider_name: String,
    pub credit_rate: f64,
    pub fee_rate: f64,
    pub max_credit_years: u32,
    pub step_up_guarantee: f64,
    #[serde(default)]
    pub rollup_mode: RollupMode,
    pub mawp_table: RateTable,
    pub pip_table: Option<RateTable>,
    pub selected_option: Option<String>,
    /// `false` when these are the built-in defaults rather than payload data
    pub from_api: bool,
}

impl ResolvedParameters {
    /// Built-in parameters used whenever no catalog is available
    pub fn fallback() -> Self {
        Self {
            product_name: FALLBACK_PRODUCT_NAME.to_string(),
            rider_name: FALLBACK_RIDER_NAME.to_string(),
            credit_rate: FALLBACK_CREDIT_RATE,
            fee_rate: FALLBACK_FEE_RATE,
            max_credit_years: FALLBACK_MAX_CREDIT_YEARS,
            step_up_guarantee: FALLBACK_STEP_UP_GUARANTEE,
            rollup_mode: RollupMode::Simple,
            mawp_table: fallback_mawp_table(),
            pip_table: Some(fallback_pip_table()),
            selected_option: None,
            from_api: false,
        }
    }
}

impl Default for ResolvedParameters {
    fn default() -> Self {
        Self::fallback()
    }
}
