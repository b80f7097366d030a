//! Market assumptions and contract facts
//!
//! `Assumptions` are the user-adjustable sliders (growth, life expectancy, tax
//! rate). `PolicyFacts` are the contract's own numbers. Both are passed into
//! every projection explicitly.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::rates::Coverage;

pub const DEFAULT_INITIAL_PREMIUM: f64 = 180_000.0;
pub const DEFAULT_COST_BASIS: f64 = 100_000.0;
pub const DEFAULT_CONTRACT_YEAR: u32 = 3;
pub const DEFAULT_CURRENT_AGE: u32 = 63;

const DAYS_PER_YEAR: f64 = 365.25;

/// User-adjustable projection assumptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Annual account value growth (fraction)
    pub growth_rate: f64,
    /// Age through which income is projected
    pub life_expectancy: u32,
    /// Marginal ordinary income tax rate (fraction)
    pub tax_rate: f64,
    pub coverage: Coverage,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            growth_rate: 0.052,
            life_expectancy: 85,
            tax_rate: 0.24,
            coverage: Coverage::Single,
        }
    }
}

/// Contract facts as of the valuation date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyFacts {
    pub initial_premium: f64,
    /// After-tax dollars invested (the LIFO basis pool)
    pub cost_basis: f64,
    /// Completed contract years at valuation
    pub contract_year: u32,
    pub current_age: u32,
    /// Actual account value from the carrier, when known
    pub current_account_value: Option<f64>,
}

impl Default for PolicyFacts {
    fn default() -> Self {
        Self {
            initial_premium: DEFAULT_INITIAL_PREMIUM,
            cost_basis: DEFAULT_COST_BASIS,
            contract_year: DEFAULT_CONTRACT_YEAR,
            current_age: DEFAULT_CURRENT_AGE,
            current_account_value: None,
        }
    }
}

/// Policy data as it arrives from the book of business: display strings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyRecord {
    pub total_premium: Option<String>,
    pub cost_basis: Option<String>,
    /// Current contract value
    pub value: Option<String>,
    pub client_age: Option<u32>,
    pub issue_effective: Option<String>,
    pub valuation_date: Option<String>,
}

impl PolicyFacts {
    /// Convert a display-string policy record, keeping defaults for anything
    /// missing, unparsable or non-positive
    pub fn from_record(record: &PolicyRecord) -> Self {
        let defaults = Self::default();
        let positive = |field: &Option<String>| {
            field
                .as_deref()
                .and_then(parse_currency)
                .filter(|v| *v > 0.0)
        };

        let contract_year = match (&record.issue_effective, &record.valuation_date) {
            (Some(issue), Some(valuation)) => contract_years_between(issue, valuation),
            _ => None,
        };

        Self {
            initial_premium: positive(&record.total_premium).unwrap_or(defaults.initial_premium),
            cost_basis: positive(&record.cost_basis).unwrap_or(defaults.cost_basis),
            contract_year: contract_year.unwrap_or(defaults.contract_year),
            current_age: record.client_age.unwrap_or(defaults.current_age),
            current_account_value: positive(&record.value),
        }
    }
}

/// Parse a currency string like "$211,664" or "1,250.50"
pub fn parse_currency(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `MM/DD/YYYY` (or `M/D/YYYY`) and ISO `YYYY-MM-DD` dates; "--" means no date
pub fn parse_policy_date(text: &str) -> Option<Date> {
    let text = text.trim();
    if text.is_empty() || text == "--" {
        return None;
    }

    let parts: Vec<&str> = text.split('/').collect();
    if let [month, day, year] = parts.as_slice() {
        let year = year.trim().parse::<i16>().ok()?;
        let month = month.trim().parse::<i8>().ok()?;
        let day = day.trim().parse::<i8>().ok()?;
        return Date::new(year, month, day).ok();
    }

    text.parse::<Date>().ok()
}

/// Whole contract years between issue and valuation, rounded to nearest.
/// Valuation before issue counts as year 0.
pub fn contract_years_between(issue_effective: &str, valuation_date: &str) -> Option<u32> {
    let issue = parse_policy_date(issue_effective)?;
    let valuation = parse_policy_date(valuation_date)?;
    let days = issue.until(valuation).ok()?.get_days();
    let years = (days as f64 / DAYS_PER_YEAR).round().max(0.0);
    Some(years as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$211,664"), Some(211_664.0));
        assert_eq!(parse_currency("1,250.50"), Some(1_250.5));
        assert_eq!(parse_currency("$0"), Some(0.0));
        assert_eq!(parse_currency("--"), None);
        assert_eq!(parse_currency(""), None);
    }

    #[test]
    fn test_parse_policy_date_formats() {
        assert_eq!(
            parse_policy_date("11/1/2019"),
            Some(jiff::civil::date(2019, 11, 1))
        );
        assert_eq!(
            parse_policy_date("2022-11-01"),
            Some(jiff::civil::date(2022, 11, 1))
        );
        assert_eq!(parse_policy_date("--"), None);
        assert_eq!(parse_policy_date("13/40/2020"), None);
    }

    #[test]
    fn test_contract_years_between() {
        assert_eq!(contract_years_between("11/1/2019", "11/1/2022"), Some(3));
        // 2 years 8 months rounds up
        assert_eq!(contract_years_between("03/01/2020", "11/01/2022"), Some(3));
        // Valuation before issue floors at zero
        assert_eq!(contract_years_between("2022-01-01", "2020-01-01"), Some(0));
        assert_eq!(contract_years_between("--", "2020-01-01"), None);
    }

    #[test]
    fn test_policy_facts_from_record() {
        let record = PolicyRecord {
            total_premium: Some("$180,000".to_string()),
            cost_basis: Some("$100,000".to_string()),
            value: Some("$211,664".to_string()),
            client_age: Some(66),
            issue_effective: Some("11/1/2019".to_string()),
            valuation_date: Some("11/1/2022".to_string()),
        };
        let facts = PolicyFacts::from_record(&record);
        assert_eq!(facts.initial_premium, 180_000.0);
        assert_eq!(facts.cost_basis, 100_000.0);
        assert_eq!(facts.current_account_value, Some(211_664.0));
        assert_eq!(facts.current_age, 66);
        assert_eq!(facts.contract_year, 3);
    }

    #[test]
    fn test_policy_facts_from_sparse_record_keeps_defaults() {
        let record = PolicyRecord {
            total_premium: Some("$0".to_string()),
            value: Some("n/a".to_string()),
            ..Default::default()
        };
        let facts = PolicyFacts::from_record(&record);
        assert_eq!(facts, PolicyFacts::default());
    }
}
