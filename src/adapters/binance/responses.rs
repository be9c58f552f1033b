//! Binance USDⓈ-M Wire Types
//!
//! Raw REST payloads and their conversion into domain records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{
    timestamp_from_millis, ExchangeInfo, Feature, MarginMode, Market, MarketLimits,
    MarketPrecision, MarketType, Order, OrderSide, OrderStatus, Position, PositionSide, RateLimit,
};
use crate::ports::{ExchangeError, ExchangeResult};

/// `{ "code": -2019, "msg": "Margin is insufficient." }`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}

/// Order as returned by `/fapi/v1/order`, `/openOrders` and `/allOrders`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: i64,
    pub symbol: String,
    pub status: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    pub orig_qty: Decimal,
    pub executed_qty: Decimal,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub update_time: Option<i64>,
}

impl OrderResponse {
    /// Convert to a domain order, labelling it with the unified `symbol`
    pub fn into_order(self, symbol: String) -> ExchangeResult<Order> {
        Ok(Order {
            id: self.order_id.to_string(),
            client_order_id: self.client_order_id.filter(|id| !id.is_empty()),
            symbol,
            order_type: self.order_type.to_ascii_lowercase(),
            side: parse_side(&self.side)?,
            amount: self.orig_qty,
            filled: self.executed_qty,
            price: non_zero(self.price),
            average: self.avg_price.and_then(non_zero),
            status: parse_status(&self.status)?,
            reduce_only: self.reduce_only,
            timestamp: self.time.or(self.update_time).and_then(timestamp_from_millis),
        })
    }
}

/// Entry of `/fapi/v2/positionRisk`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRiskResponse {
    pub symbol: String,
    pub position_amt: Decimal,
    pub entry_price: Decimal,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    pub un_realized_profit: Decimal,
    #[serde(default)]
    pub liquidation_price: Option<Decimal>,
    pub leverage: String,
    pub margin_type: String,
    #[serde(default)]
    pub notional: Option<Decimal>,
    #[serde(default = "default_position_side")]
    pub position_side: String,
    #[serde(default)]
    pub update_time: Option<i64>,
}

fn default_position_side() -> String {
    "BOTH".to_string()
}

impl PositionRiskResponse {
    pub fn into_position(self, symbol: String) -> ExchangeResult<Position> {
        let hedged = matches!(self.position_side.as_str(), "LONG" | "SHORT");
        let side = match self.position_side.as_str() {
            "LONG" => PositionSide::Long,
            "SHORT" => PositionSide::Short,
            _ if self.position_amt.is_sign_negative() => PositionSide::Short,
            _ => PositionSide::Long,
        };

        let leverage: u32 = self.leverage.parse().map_err(|_| {
            ExchangeError::Decode(format!("invalid leverage '{}' for {}", self.leverage, self.symbol))
        })?;

        let margin_mode = if self.margin_type.eq_ignore_ascii_case("isolated") {
            MarginMode::Isolated
        } else {
            MarginMode::Cross
        };

        let initial_margin = match (self.notional, leverage) {
            (Some(notional), lev) if lev > 0 => Some(notional.abs() / Decimal::from(lev)),
            _ => None,
        };
        let percentage = initial_margin
            .filter(|margin| !margin.is_zero())
            .map(|margin| (self.un_realized_profit / margin * Decimal::ONE_HUNDRED).round_dp(2));

        Ok(Position {
            symbol,
            side,
            contracts: self.position_amt.abs(),
            entry_price: self.entry_price,
            mark_price: self.mark_price.and_then(non_zero),
            unrealized_pnl: self.un_realized_profit,
            percentage,
            initial_margin,
            leverage,
            liquidation_price: self.liquidation_price.and_then(non_zero),
            margin_mode,
            hedged,
            timestamp: self.update_time.filter(|t| *t > 0).and_then(timestamp_from_millis),
        })
    }
}

/// `/fapi/v1/exchangeInfo`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfoResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub server_time: Option<i64>,
    #[serde(default)]
    pub rate_limits: Vec<RateLimitResponse>,
    pub symbols: Vec<SymbolResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResponse {
    pub rate_limit_type: String,
    pub interval: String,
    pub interval_num: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResponse {
    pub symbol: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub delivery_date: Option<i64>,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default)]
    pub margin_asset: Option<String>,
    #[serde(default)]
    pub price_precision: Option<u32>,
    #[serde(default)]
    pub quantity_precision: Option<u32>,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "PRICE_FILTER", rename_all = "camelCase")]
    Price { min_price: Decimal, max_price: Decimal },
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize { min_qty: Decimal, max_qty: Decimal },
    #[serde(rename = "MIN_NOTIONAL")]
    MinNotional { notional: Decimal },
    #[serde(other)]
    Other,
}

impl SymbolResponse {
    pub fn is_perpetual(&self) -> bool {
        self.contract_type.ends_with("PERPETUAL")
    }

    fn expiry(&self) -> Option<DateTime<Utc>> {
        if self.is_perpetual() {
            return None;
        }
        self.delivery_date.and_then(timestamp_from_millis)
    }

    /// `BASE/QUOTE:SETTLE`, plus `-YYMMDD` for dated contracts
    pub fn unified_symbol(&self) -> String {
        let settle = self.margin_asset.as_deref().unwrap_or(&self.quote_asset);
        let mut symbol = format!("{}/{}:{}", self.base_asset, self.quote_asset, settle);
        if let Some(expiry) = self.expiry() {
            symbol.push('-');
            symbol.push_str(&expiry.format("%y%m%d").to_string());
        }
        symbol
    }

    pub fn into_market(self) -> Market {
        let mut limits = MarketLimits::default();
        for filter in &self.filters {
            match filter {
                SymbolFilter::Price { min_price, max_price } => {
                    limits.price_min = non_zero(*min_price);
                    limits.price_max = non_zero(*max_price);
                }
                SymbolFilter::LotSize { min_qty, max_qty } => {
                    limits.amount_min = non_zero(*min_qty);
                    limits.amount_max = non_zero(*max_qty);
                }
                SymbolFilter::MinNotional { notional } => {
                    limits.cost_min = non_zero(*notional);
                }
                SymbolFilter::Other => {}
            }
        }

        let market_type = if self.is_perpetual() { MarketType::Swap } else { MarketType::Future };

        Market {
            symbol: self.unified_symbol(),
            expiry: self.expiry(),
            settle: Some(self.margin_asset.clone().unwrap_or_else(|| self.quote_asset.clone())),
            active: self.status == "TRADING",
            precision: MarketPrecision {
                amount: self.quantity_precision,
                price: self.price_precision,
            },
            id: self.symbol,
            base: self.base_asset,
            quote: self.quote_asset,
            market_type,
            limits,
        }
    }
}

impl ExchangeInfoResponse {
    pub fn into_exchange_info(self, url: &str, features: Vec<Feature>) -> ExchangeInfo {
        ExchangeInfo {
            id: super::EXCHANGE_ID.to_string(),
            name: super::EXCHANGE_NAME.to_string(),
            url: url.to_string(),
            version: super::API_VERSION.to_string(),
            timezone: self.timezone,
            server_time: self.server_time.and_then(timestamp_from_millis),
            rate_limits: self
                .rate_limits
                .into_iter()
                .map(|r| RateLimit {
                    kind: r.rate_limit_type,
                    interval: r.interval,
                    interval_num: r.interval_num,
                    limit: r.limit,
                })
                .collect(),
            features,
        }
    }
}

fn non_zero(value: Decimal) -> Option<Decimal> {
    if value.is_zero() {
        None
    } else {
        Some(value.normalize())
    }
}

fn parse_side(side: &str) -> ExchangeResult<OrderSide> {
    match side {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        other => Err(ExchangeError::Decode(format!("unknown order side '{}'", other))),
    }
}

fn parse_status(status: &str) -> ExchangeResult<OrderStatus> {
    match status {
        "NEW" | "PARTIALLY_FILLED" => Ok(OrderStatus::Open),
        "FILLED" => Ok(OrderStatus::Closed),
        "CANCELED" => Ok(OrderStatus::Canceled),
        "EXPIRED" | "EXPIRED_IN_MATCH" => Ok(OrderStatus::Expired),
        "REJECTED" => Ok(OrderStatus::Rejected),
        other => Err(ExchangeError::Decode(format!("unknown order status '{}'", other))),
    }
}
