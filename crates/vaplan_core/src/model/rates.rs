//! Age-banded withdrawal rate tables
//!
//! Riders quote their guaranteed withdrawal percentage by attained age at
//! activation. A `RateTable` is the sorted list of those bands with a total
//! lookup: ages past the last band use the last band's rate.

use serde::{Deserialize, Serialize};

/// Whose lives the guarantee covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    #[default]
    Single,
    Joint,
}

/// One age band of a withdrawal rate schedule. Rates are fractions (0.0605 = 6.05%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min_age: u32,
    pub max_age: u32,
    pub single: f64,
    pub joint: f64,
}

impl RateBand {
    pub const fn new(min_age: u32, max_age: u32, single: f64, joint: f64) -> Self {
        Self {
            min_age,
            max_age,
            single,
            joint,
        }
    }

    pub fn covers(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }

    pub fn rate(&self, coverage: Coverage) -> f64 {
        match coverage {
            Coverage::Single => self.single,
            Coverage::Joint => self.joint,
        }
    }
}

/// Bands sorted ascending by `min_age`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<RateBand>", into = "Vec<RateBand>")]
pub struct RateTable {
    bands: Vec<RateBand>,
}

impl From<Vec<RateBand>> for RateTable {
    fn from(bands: Vec<RateBand>) -> Self {
        Self::new(bands)
    }
}

impl From<RateTable> for Vec<RateBand> {
    fn from(table: RateTable) -> Self {
        table.bands
    }
}

impl RateTable {
    /// Build a table, sorting bands by `min_age` (stable, so duplicate bands keep input order)
    pub fn new(mut bands: Vec<RateBand>) -> Self {
        bands.sort_by_key(|b| b.min_age);
        Self { bands }
    }

    pub fn bands(&self) -> &[RateBand] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// The band covering `age`, or the last band when no band covers it.
    /// `None` only for an empty table.
    pub fn band_for(&self, age: u32) -> Option<&RateBand> {
        self.bands
            .iter()
            .find(|b| b.covers(age))
            .or_else(|| self.bands.last())
    }

    /// Rate for `age`; `None` only for an empty table
    pub fn rate(&self, age: u32, coverage: Coverage) -> Option<f64> {
        self.band_for(age).map(|b| b.rate(coverage))
    }

    /// Rate for `age`, or `default` when the table is empty
    pub fn rate_or(&self, age: u32, coverage: Coverage, default: f64) -> f64 {
        self.rate(age, coverage).unwrap_or(default)
    }

    /// Display label for the band that applies at `age`, e.g. "65–69".
    /// Ages younger than every band read as "under 45" (the first band's
    /// floor); any other uncovered age reads as "75+" (the last band's floor).
    pub fn band_label(&self, age: u32) -> String {
        if let Some(band) = self.bands.iter().find(|b| b.covers(age)) {
            return format!("{}–{}", band.min_age, band.max_age);
        }
        match (self.bands.first(), self.bands.last()) {
            (Some(first), _) if age < first.min_age => format!("under {}", first.min_age),
            (_, Some(last)) => format!("{}+", last.min_age),
            _ => "n/a".to_string(),
        }
    }
}
