//! Raw and normalized ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named feed a raw record was loaded from.
///
/// Variant order is the concatenation order used when building the
/// record sequence for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "injData")]
    Inj,
    #[serde(rename = "usdt45Data")]
    Usdt45,
    #[serde(rename = "usdtFinanceData")]
    UsdtFinance,
}

impl Origin {
    /// Key under which this origin's array appears in a data document
    pub fn key(self) -> &'static str {
        match self {
            Self::Inj => "injData",
            Self::Usdt45 => "usdt45Data",
            Self::UsdtFinance => "usdtFinanceData",
        }
    }

    /// All origins in concatenation order
    pub fn all() -> &'static [Origin] {
        &[Origin::Inj, Origin::Usdt45, Origin::UsdtFinance]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|o| o.key() == key)
    }
}

/// Arbitrarily keyed record as it appears in a feed
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub origin: Origin,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(origin: Origin, fields: Map<String, Value>) -> Self {
        Self { origin, fields }
    }

    /// Build a record from any JSON value; non-objects become an empty record
    /// so that every array element still yields exactly one record.
    pub fn from_value(origin: Origin, value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { origin, fields },
            _ => Self {
                origin,
                fields: Map::new(),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Canonical view of a raw record. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub origin: Origin,
    pub product: String,
    pub amount: f64,
    pub user: String,
    pub end_date_raw: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    /// Pass-through descriptive fields for display layers
    pub start: Option<String>,
    pub daily_return: Option<f64>,
    pub status: Option<String>,
    pub extra: Option<f64>,
    pub address: Option<String>,
}
