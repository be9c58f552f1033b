//! Exchange Port
//!
//! The single seam between the CLI and an exchange backend. Every command
//! maps onto exactly one of these operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    ClosedPosition, ExchangeInfo, Market, Order, OrderRequest, Position,
};

/// Result type for exchange operations
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Failures reported by an exchange backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The exchange rejected the request
    #[error("Exchange error {code}: {message} (HTTP {status})")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    /// The backend cannot perform this request as asked
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Operations the CLI can perform against an exchange
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangePort: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> ExchangeResult<Order>;

    async fn cancel_order(&self, id: &str, symbol: &str) -> ExchangeResult<Order>;

    async fn fetch_order(&self, id: &str, symbol: &str) -> ExchangeResult<Order>;

    async fn fetch_open_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>>;

    async fn fetch_closed_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>>;

    /// Open and historical orders
    async fn fetch_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>>;

    /// All positions, including flat ones if the exchange reports them
    async fn fetch_positions(&self) -> ExchangeResult<Vec<Position>>;

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>>;

    async fn fetch_exchange_info(&self) -> ExchangeResult<ExchangeInfo>;

    /// Unified symbol (`BASE/QUOTE:SETTLE[-YYMMDD]`) of the market `symbol` names
    async fn resolve_symbol(&self, symbol: &str) -> ExchangeResult<String>;

    /// Offset every open position on `symbol` with market orders.
    ///
    /// One-way mode has at most one position per market; hedge mode can
    /// hold a long and a short leg, and both are closed. Returns an empty
    /// list when nothing is open.
    async fn close_position(
        &self,
        symbol: &str,
        reduce_only: bool,
    ) -> ExchangeResult<Vec<ClosedPosition>> {
        let unified = self.resolve_symbol(symbol).await?;
        let open: Vec<Position> = self
            .fetch_positions()
            .await?
            .into_iter()
            .filter(|p| !p.is_flat() && p.symbol == unified)
            .collect();

        let mut closed = Vec::with_capacity(open.len());
        for position in open {
            tracing::info!(
                "Closing {} {} {} with a market {}",
                position.side,
                position.contracts,
                position.symbol,
                position.side.closing_side()
            );

            let order = self.create_order(position.closing_request(reduce_only)).await?;
            closed.push(ClosedPosition { position, order });
        }
        Ok(closed)
    }
}
