mod params;
mod policy;
mod rates;
mod results;
mod rider;

pub use params::{
    DEFAULT_MAWP_RATE, DEFAULT_PIP_RATE, FALLBACK_CREDIT_RATE, FALLBACK_FEE_RATE,
    FALLBACK_MAX_CREDIT_YEARS, FALLBACK_PRODUCT_NAME, FALLBACK_RIDER_NAME,
    FALLBACK_STEP_UP_GUARANTEE, ResolvedParameters, fallback_mawp_table, fallback_pip_table,
};
pub use policy::{
    Assumptions, DEFAULT_CONTRACT_YEAR, DEFAULT_COST_BASIS, DEFAULT_CURRENT_AGE,
    DEFAULT_INITIAL_PREMIUM, PolicyFacts, PolicyRecord, contract_years_between, parse_currency,
    parse_policy_date,
};
pub use rates::{Coverage, RateBand, RateTable};
pub use results::{
    BreakdownPhase, BreakdownRow, ComparisonPoint, IncomePhase, IncomeRow, LifoPhase,
    LifoTaxResult, PreActivationRow, Projection, Scenario, TaxRow,
};
pub use rider::{OptionTables, RiderCatalog, RiderDefinition, RollupMode};
