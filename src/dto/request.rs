use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, ApiResult};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Token carried in a request body instead of the `Authorization` header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenBody {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(values) => values,
            OneOrMany::One(value) => vec![value],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn to_f64(&self, field: &str) -> ApiResult<f64> {
        let value = match self {
            NumberOrText::Number(n) => *n,
            NumberOrText::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ApiError::InvalidInput(format!("{field} is not a number")))?,
        };
        if !value.is_finite() {
            return Err(ApiError::InvalidInput(format!("{field} is not a number")));
        }
        Ok(value)
    }

    fn to_id(&self) -> ApiResult<i32> {
        let invalid = || ApiError::InvalidInput("category_ids must contain integer ids".to_string());
        match self {
            NumberOrText::Number(n) if n.fract() == 0.0 && *n >= 1.0 && *n <= i32::MAX as f64 => {
                Ok(*n as i32)
            }
            NumberOrText::Number(_) => Err(invalid()),
            NumberOrText::Text(s) => s.trim().parse::<i32>().map_err(|_| invalid()),
        }
    }
}

/// Category ids as sent in the `category_ids` form field: a JSON array of
/// integers or numeric strings. Duplicates collapse, first-seen order kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIds(pub Vec<i32>);

impl CategoryIds {
    pub fn parse(raw: &str) -> ApiResult<Self> {
        let mut ids = CategoryIds::default();
        ids.extend_from_str(raw)?;
        Ok(ids)
    }

    /// Adds the ids in `raw`, which may also be a single bare id.
    pub fn extend_from_str(&mut self, raw: &str) -> ApiResult<()> {
        let values = match serde_json::from_str::<OneOrMany<NumberOrText>>(raw) {
            Ok(values) => values.into_vec(),
            Err(_) => vec![NumberOrText::Text(raw.to_string())],
        };
        for value in values {
            let id = value.to_id()?;
            if !self.0.contains(&id) {
                self.0.push(id);
            }
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawPriceEntry {
    min_price: NumberOrText,
    max_price: NumberOrText,
    division: String,
    date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceEntry {
    pub min_price: f64,
    pub max_price: f64,
    pub division: String,
    pub date: DateTime<Utc>,
}

impl PriceEntry {
    /// Parses the `price` form field: a JSON array of entries (a lone object
    /// is accepted too).
    pub fn parse_list(raw: &str) -> ApiResult<Vec<Self>> {
        let entries = serde_json::from_str::<OneOrMany<RawPriceEntry>>(raw)
            .map_err(|e| ApiError::InvalidInput(format!("price is malformed: {e}")))?;
        entries
            .into_vec()
            .into_iter()
            .map(PriceEntry::try_from)
            .collect()
    }
}

impl TryFrom<RawPriceEntry> for PriceEntry {
    type Error = ApiError;

    fn try_from(raw: RawPriceEntry) -> Result<Self, Self::Error> {
        let division = raw.division.trim().to_string();
        if division.is_empty() {
            return Err(ApiError::InvalidInput("price division is empty".to_string()));
        }
        Ok(PriceEntry {
            min_price: raw.min_price.to_f64("min_price")?,
            max_price: raw.max_price.to_f64("max_price")?,
            division,
            date: parse_price_date(&raw.date)?,
        })
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` taken as UTC.
pub fn parse_price_date(raw: &str) -> ApiResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    Err(ApiError::InvalidInput(format!("price date '{raw}' is not a date")))
}
