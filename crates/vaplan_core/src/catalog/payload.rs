//! Lenient typed view of the annuity-data payload
//!
//! Only the fields the engine reads are modeled. Everything is optional so a
//! sparse payload still deserializes. Scalar fields take whatever the feed
//! sends: numbers may arrive as strings and flags as 0/1, and a value of the
//! wrong kind reads as absent. A rider or case that is not an object at all is
//! skipped on its own. Only a structurally wrong payload (something other than
//! a list where the rider list belongs) fails as a whole.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayload {
    pub tabs: Option<RawTabs>,
    pub basic_info: Option<RawBasicInfo>,
}

impl RawPayload {
    pub fn riders(&self) -> &[RawRider] {
        self.tabs
            .as_ref()
            .and_then(|t| t.gmwb.as_ref())
            .and_then(|g| g.data.as_deref())
            .unwrap_or(&[])
    }

    pub fn product_name(&self) -> Option<&str> {
        self.basic_info
            .as_ref()
            .and_then(|b| b.va_product.as_ref())
            .and_then(|p| p.product_name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTabs {
    pub gmwb: Option<RawSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSection {
    #[serde(deserialize_with = "lenient::list")]
    pub data: Option<Vec<RawRider>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBasicInfo {
    pub va_product: Option<RawProduct>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProduct {
    #[serde(deserialize_with = "lenient::text")]
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRider {
    /// Numeric or string identifier
    pub id: Option<serde_json::Value>,
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_terminated: Option<bool>,
    /// Whole percent
    #[serde(deserialize_with = "lenient::number")]
    pub rollup_percentage: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub max_rollup_years: Option<f64>,
    /// Whole percent of premium
    #[serde(deserialize_with = "lenient::number")]
    pub step_up_perct: Option<f64>,
    #[serde(deserialize_with = "lenient::list")]
    pub new_va_gmwb_cases: Option<Vec<RawCase>>,
}

impl RawRider {
    pub fn terminated(&self) -> bool {
        self.is_terminated.unwrap_or(false)
    }

    pub fn cases(&self) -> &[RawCase] {
        self.new_va_gmwb_cases.as_deref().unwrap_or(&[])
    }

    /// Identifier as text, falling back to the rider name
    pub fn id_text(&self) -> Option<String> {
        match &self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => self.name.clone(),
        }
    }
}

/// Discriminator of a rider case record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    /// "C": rider charge
    Fee,
    /// "R": roll-up credit
    Rollup,
    /// "A": withdrawal rate
    Withdrawal,
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCase {
    #[serde(rename = "isCaseAOrC", deserialize_with = "lenient::text")]
    pub case_type: Option<String>,
    #[serde(deserialize_with = "lenient::code")]
    pub single_joint_chrg_type: Option<i64>,
    #[serde(deserialize_with = "lenient::code")]
    pub charge_frequency_id: Option<i64>,
    /// Whole percent; single-life rate for withdrawal cases
    #[serde(deserialize_with = "lenient::number")]
    pub num1: Option<f64>,
    /// Whole percent; joint-life rate for withdrawal cases
    #[serde(deserialize_with = "lenient::number")]
    pub num2: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub age_band1: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub age_band2: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub max_rollup_years: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub notes: Option<String>,
}

impl RawCase {
    pub fn kind(&self) -> CaseKind {
        match self.case_type.as_deref().map(str::trim) {
            Some("C") => CaseKind::Fee,
            Some("R") => CaseKind::Rollup,
            Some("A") => CaseKind::Withdrawal,
            _ => CaseKind::Other,
        }
    }

    pub fn notes(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }

    pub fn has_age_band(&self) -> bool {
        self.age_band1.is_some()
    }
}

/// Field deserializers that read loosely typed feed values
mod lenient {
    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Value>::deserialize(deserializer)
    }

    fn parse_number(text: &str) -> Option<f64> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '%' | '$' | ','))
            .collect();
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// A number, or a string holding one ("6", "6%")
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => parse_number(&s),
            _ => None,
        })
    }

    /// An integer code; fractional or textual forms are rounded
    pub fn code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|v| v.round() as i64)),
            Some(Value::String(s)) => parse_number(&s).map(|v| v.round() as i64),
            _ => None,
        })
    }

    /// A boolean, or 0/1 and "true"/"false" style stand-ins
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "no" | "n" => Some(false),
                _ => Some(true),
            },
            _ => None,
        })
    }

    /// A string; numbers are taken in their JSON spelling
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match value(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// A list whose entries are decoded one by one; undecodable entries are skipped
    pub fn list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = match value(deserializer)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(D::Error::custom(format!("expected a list, found {other}")));
            }
        };

        let decoded = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    tracing::warn!(index, "skipping malformed payload entry: {err}");
                    None
                }
            })
            .collect();
        Ok(Some(decoded))
    }
}
