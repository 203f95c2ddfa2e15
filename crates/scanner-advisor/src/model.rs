//! Domain Models
//!
//! Scanner timeframes, signal directions, the validator request, and the
//! uniform result shapes handed back to the model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdvisorError;
use crate::staleness::{CacheAge, staleness_warning};

/// Scanner timeframe
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// Scalping
    #[serde(rename = "15m")]
    M15,
    /// Intraday setups
    #[serde(rename = "30m")]
    M30,
    /// Daily context
    #[default]
    #[serde(rename = "1h")]
    H1,
    /// Main trend
    #[serde(rename = "4h")]
    H4,
}

impl Timeframe {
    pub const ALL: [Self; 4] = [Self::M15, Self::M30, Self::H1, Self::H4];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H4 => "4h",
        }
    }

    /// Comma-separated list of accepted values
    pub fn valid_values() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == wanted)
            .ok_or_else(|| {
                AdvisorError::InvalidArguments(format!(
                    "invalid timeframe '{s}', use one of: {}",
                    Self::valid_values()
                ))
            })
    }
}

/// Signal direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub const ALL: [Self; 2] = [Self::Long, Self::Short];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete signal to validate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Trading pair, compact (`BTCUSDT`) or slashed (`BTC/USDT`)
    pub symbol: String,

    pub direction: Direction,

    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    pub take_profit: Decimal,

    #[serde(default)]
    pub timeframe: Timeframe,
}

/// Outcome of a scanner run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScannerResult {
    pub success: bool,

    /// Raw scanner payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,

    /// Human-readable cache age (`"3m"`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<String>,

    /// Set when cache-derived data is stale for the timeframe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<bool>,
}

impl ScannerResult {
    /// Build from the backend's JSON body
    pub fn from_response(timeframe: Timeframe, data: Value) -> Self {
        let cached = data.get("cached").and_then(Value::as_bool).unwrap_or(false);
        let age = CacheAge::new(
            data.get("cache_age_seconds").and_then(Value::as_f64),
            data.get("cache_age_human").and_then(Value::as_str),
        );

        Self {
            success: true,
            timeframe: Some(timeframe),
            cached: Some(cached),
            cache_age: Some(age.label()),
            warning: staleness_warning(timeframe, cached, &age),
            data: Some(data),
            ..Self::default()
        }
    }

    /// Failed run; timeouts are flagged
    pub fn failure(error: &AdvisorError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            timeout: error.is_timeout().then_some(true),
            ..Self::default()
        }
    }
}

/// Outcome of a signal validation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<bool>,
}

impl ValidationResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failure(error: &AdvisorError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            timeout: error.is_timeout().then_some(true),
            ..Self::default()
        }
    }
}
