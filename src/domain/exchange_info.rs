//! Exchange metadata shown by the `info` command

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request-weight or order-count limit published by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    /// e.g. `REQUEST_WEIGHT`, `ORDERS`
    pub kind: String,
    /// e.g. `MINUTE`, `SECOND`
    pub interval: String,
    pub interval_num: u32,
    pub limit: u32,
}

/// Whether the adapter implements a given capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub supported: bool,
}

impl Feature {
    pub fn new(name: impl Into<String>, supported: bool) -> Self {
        Self { name: name.into(), supported }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    pub id: String,
    pub name: String,
    pub url: String,
    pub version: String,
    pub timezone: Option<String>,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub server_time: Option<DateTime<Utc>>,
    pub rate_limits: Vec<RateLimit>,
    pub features: Vec<Feature>,
}
