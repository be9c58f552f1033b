//! Market records and client-side filtering

use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Instrument classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    /// Perpetual contract
    Swap,
    /// Dated delivery contract
    Future,
}

impl MarketType {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Swap => "swap",
            MarketType::Future => "future",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decimal places accepted for amounts and prices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPrecision {
    pub amount: Option<u32>,
    pub price: Option<u32>,
}

/// Order size, price and notional bounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketLimits {
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub cost_min: Option<Decimal>,
}

/// A tradable instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange-native identifier, e.g. `BTCUSDT`
    pub id: String,
    /// Unified symbol, e.g. `BTC/USDT:USDT`
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub settle: Option<String>,
    #[serde(rename = "type")]
    pub market_type: MarketType,
    pub active: bool,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub expiry: Option<DateTime<Utc>>,
    pub precision: MarketPrecision,
    pub limits: MarketLimits,
}

/// Client-side market selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilter {
    pub active_only: bool,
    pub market_type: Option<MarketType>,
    pub quote: Option<String>,
}

impl MarketFilter {
    pub fn matches(&self, market: &Market) -> bool {
        if self.active_only && !market.active {
            return false;
        }
        if let Some(market_type) = self.market_type {
            if market.market_type != market_type {
                return false;
            }
        }
        if let Some(ref quote) = self.quote {
            if !market.quote.eq_ignore_ascii_case(quote) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, markets: Vec<Market>) -> Vec<Market> {
        markets.into_iter().filter(|m| self.matches(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(symbol: &str, quote: &str, market_type: MarketType, active: bool) -> Market {
        Market {
            id: symbol.replace('/', ""),
            symbol: symbol.to_string(),
            base: symbol.split('/').next().unwrap().to_string(),
            quote: quote.to_string(),
            settle: Some(quote.to_string()),
            market_type,
            active,
            expiry: None,
            precision: MarketPrecision::default(),
            limits: MarketLimits::default(),
        }
    }

    fn sample() -> Vec<Market> {
        vec![
            market("BTC/USDT", "USDT", MarketType::Swap, true),
            market("ETH/USDT", "USDT", MarketType::Future, true),
            market("SOL/USDC", "USDC", MarketType::Swap, true),
            market("LUNA/USDT", "USDT", MarketType::Swap, false),
        ]
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        assert_eq!(MarketFilter::default().apply(sample()).len(), 4);
    }

    #[test]
    fn test_active_filter() {
        let filter = MarketFilter { active_only: true, ..Default::default() };
        let result = filter.apply(sample());
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|m| m.active));
    }

    #[test]
    fn test_filters_compose() {
        let filter = MarketFilter {
            active_only: true,
            market_type: Some(MarketType::Swap),
            quote: Some("usdt".to_string()),
        };
        let result = filter.apply(sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].symbol, "BTC/USDT");
    }

    #[test]
    fn test_spot_filter_on_derivatives_is_empty() {
        let filter = MarketFilter { market_type: Some(MarketType::Spot), ..Default::default() };
        assert!(filter.apply(sample()).is_empty());
    }
}
