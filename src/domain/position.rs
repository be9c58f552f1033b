//! Position records
//!
//! Open exposure on derivatives markets, and how to offset it.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderRequest, OrderSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Order side that reduces a position on this side
    pub fn closing_side(self) -> OrderSide {
        match self {
            PositionSide::Long => OrderSide::Sell,
            PositionSide::Short => OrderSide::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Cross,
    Isolated,
}

impl MarginMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MarginMode::Cross => "cross",
            MarginMode::Isolated => "isolated",
        }
    }
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exchange-tracked position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    /// Absolute position size in contracts
    pub contracts: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Option<Decimal>,
    pub unrealized_pnl: Decimal,
    /// Unrealized PnL as a percentage of initial margin
    pub percentage: Option<Decimal>,
    pub initial_margin: Option<Decimal>,
    pub leverage: u32,
    pub liquidation_price: Option<Decimal>,
    pub margin_mode: MarginMode,
    /// One leg of a hedge-mode pair, addressed by its side
    pub hedged: bool,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.contracts.is_zero()
    }

    /// Market order that offsets the full position.
    ///
    /// Hedge-mode legs are targeted by side and never carry reduce-only,
    /// which the exchange rejects in that mode.
    pub fn closing_request(&self, reduce_only: bool) -> OrderRequest {
        let request = OrderRequest::market(self.symbol.clone(), self.side.closing_side(), self.contracts);
        if self.hedged {
            request.with_position_side(self.side)
        } else {
            request.with_reduce_only(reduce_only)
        }
    }
}

/// Result of closing a position: what was open and the order that offset it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position: Position,
    pub order: Order,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(symbol: &str, side: PositionSide, contracts: Decimal) -> Position {
        Position {
            symbol: symbol.to_string(),
            side,
            contracts,
            entry_price: dec!(100),
            mark_price: Some(dec!(101)),
            unrealized_pnl: dec!(1),
            percentage: None,
            initial_margin: None,
            leverage: 10,
            liquidation_price: None,
            margin_mode: MarginMode::Cross,
            hedged: false,
            timestamp: None,
        }
    }

    #[test]
    fn test_closing_side() {
        assert_eq!(PositionSide::Long.closing_side(), OrderSide::Sell);
        assert_eq!(PositionSide::Short.closing_side(), OrderSide::Buy);
    }

    #[test]
    fn test_flat_position() {
        assert!(position("BTC/USDT:USDT", PositionSide::Long, dec!(0)).is_flat());
        assert!(!position("BTC/USDT:USDT", PositionSide::Long, dec!(0.1)).is_flat());
    }

    #[test]
    fn test_one_way_close_is_reduce_only() {
        let request = position("BTC/USDT:USDT", PositionSide::Long, dec!(0.5)).closing_request(true);
        assert_eq!(request.symbol, "BTC/USDT:USDT");
        assert_eq!(request.side, OrderSide::Sell);
        assert_eq!(request.amount, dec!(0.5));
        assert!(request.price.is_none());
        assert!(request.reduce_only);
        assert!(request.position_side.is_none());
    }

    #[test]
    fn test_hedged_close_targets_leg_without_reduce_only() {
        let mut short = position("ETH/USDT:USDT", PositionSide::Short, dec!(3));
        short.hedged = true;

        let request = short.closing_request(true);
        assert_eq!(request.side, OrderSide::Buy);
        assert_eq!(request.position_side, Some(PositionSide::Short));
        assert!(!request.reduce_only);
    }
}
