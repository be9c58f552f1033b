//! Domain Layer - Exchange records
//!
//! Plain data returned by the exchange port and consumed by the formatter:
//! - Order: submitted buy/sell instructions and their fill state
//! - Position: open exposure on a derivatives market
//! - Market: tradable instruments with precision and limits
//! - ExchangeInfo: venue metadata and supported features

pub mod order;
pub mod position;
pub mod market;
pub mod exchange_info;

pub use order::{Order, OrderRequest, OrderSide, OrderStatus, OrderType};
pub use position::{ClosedPosition, MarginMode, Position, PositionSide};
pub use market::{Market, MarketFilter, MarketLimits, MarketPrecision, MarketType};
pub use exchange_info::{ExchangeInfo, Feature, RateLimit};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Canonical text form of a timestamp, shared by table and JSON output
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert exchange milliseconds to a UTC timestamp
pub fn timestamp_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_millis() {
        let ts = timestamp_from_millis(1_700_000_000_123).unwrap();
        assert_eq!(format_timestamp(&ts), "2023-11-14T22:13:20.123Z");
    }
}
