//! Boundary helpers shared by the request and transporter payloads.
//!
//! Payload fields arrive loosely typed from the client: sub-structures may be
//! pre-parsed JSON or a JSON-encoded string, dates may carry a time part and
//! required values may simply be absent. Everything here turns that into the
//! concrete types the stores persist.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::{AppError, Result};

/// Ordered list of requested service names.
pub type ServiceTypes = Vec<String>;

/// Price per service name, kept as raw JSON values so that whatever the
/// client sent comes back unchanged.
pub type ServicePrices = serde_json::Map<String, Value>;

/// Service type stored when the submitted value cannot be decoded.
pub fn fallback_service_types() -> ServiceTypes {
    vec!["Transport".to_string()]
}

/// A structured sub-field as it arrives at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JsonField<T> {
    /// Already structured JSON of the expected shape.
    Decoded(T),
    /// JSON text that still needs decoding.
    Raw(String),
    /// Anything else.
    Malformed(Value),
}

impl<T: DeserializeOwned> JsonField<T> {
    /// Normalize to the structured form. `None` means the value could not
    /// be decoded; the caller picks the replacement.
    pub fn decode(self, field: &str) -> Option<T> {
        match self {
            JsonField::Decoded(value) => Some(value),
            JsonField::Raw(text) => match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Error parsing {}: {}", field, e);
                    None
                }
            },
            JsonField::Malformed(value) => {
                tracing::warn!("Error parsing {}: unexpected value {}", field, value);
                None
            }
        }
    }
}

/// Decode a JSON text column, falling back to the type's default.
pub fn decode_stored<T: DeserializeOwned + Default>(column: &str, text: &str) -> T {
    serde_json::from_str(text).unwrap_or_else(|e| {
        tracing::warn!("Stored {} is not valid JSON: {}", column, e);
        T::default()
    })
}

/// Round to two decimal places and keep exactly two.
pub fn to_two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Parse a calendar date, accepting `YYYY-MM-DD` or a timestamp whose time
/// part is dropped (timestamps with an offset are taken in UTC).
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn date_field(name: &'static str, value: &str) -> Result<NaiveDate> {
    parse_calendar_date(value)
        .ok_or_else(|| AppError::Validation(format!("{name} must be a date (YYYY-MM-DD)")))
}

pub fn non_negative(name: &'static str, value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{name} must not be negative")));
    }
    Ok(value)
}

/// Treat blank strings like absent ones.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Collects absent required fields so they can be reported together.
#[derive(Debug, Default)]
pub struct FieldCheck {
    missing: Vec<&'static str>,
}

impl FieldCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, name: &'static str, value: Option<String>) -> String {
        match optional_text(value) {
            Some(value) => value,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    pub fn value<T: Default>(&mut self, name: &'static str, value: Option<T>) -> T {
        match value {
            Some(value) => value,
            None => {
                self.missing.push(name);
                T::default()
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingFields(self.missing))
        }
    }
}

pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> std::result::Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    text.trim()
        .parse::<Decimal>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}
