//! Command Dispatcher
//!
//! Validates one action, runs the close confirmation when needed, and
//! performs exactly one exchange port operation. Validation failures never
//! reach the port.

use clap::ValueEnum;
use rust_decimal::Decimal;

use crate::domain::{
    ClosedPosition, ExchangeInfo, Market, MarketFilter, Order, OrderRequest, OrderSide,
    OrderType, Position,
};
use crate::error::CliError;
use crate::ports::ExchangePort;

use super::confirm::Confirmation;

/// Which orders `orders` lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OrderScope {
    #[default]
    Open,
    Closed,
    All,
}

impl std::fmt::Display for OrderScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderScope::Open => f.write_str("open"),
            OrderScope::Closed => f.write_str("closed"),
            OrderScope::All => f.write_str("all"),
        }
    }
}

/// A parsed, not yet validated, user request
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreateOrder {
        symbol: String,
        side: OrderSide,
        order_type: OrderType,
        amount: Decimal,
        price: Option<Decimal>,
        reduce_only: bool,
    },
    CancelOrder {
        id: String,
        symbol: String,
    },
    OrderStatus {
        id: String,
        symbol: String,
    },
    Orders {
        symbol: Option<String>,
        scope: OrderScope,
    },
    OpenOrders {
        symbol: String,
    },
    Positions,
    ClosePosition {
        symbol: String,
        /// Skip the interactive prompt
        confirmed: bool,
    },
    Markets(MarketFilter),
    Info,
}

/// Outcome of a dispatched action, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    OrderCreated(Order),
    OrderCancelled(Order),
    OrderStatus(Order),
    Orders { orders: Vec<Order> },
    OpenOrders { symbol: String, orders: Vec<Order> },
    Positions(Vec<Position>),
    /// One entry per leg closed, both legs in hedge mode
    PositionClosed(Vec<ClosedPosition>),
    NoPosition { symbol: String },
    Markets(Vec<Market>),
    Info(ExchangeInfo),
}

/// Routes actions to an exchange port
pub struct Dispatcher<E, C> {
    exchange: E,
    confirmation: C,
}

impl<E: ExchangePort, C: Confirmation> Dispatcher<E, C> {
    pub fn new(exchange: E, confirmation: C) -> Self {
        Self { exchange, confirmation }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Run one action to completion
    pub async fn run(&mut self, action: Action) -> Result<Report, CliError> {
        match action {
            Action::CreateOrder {
                symbol,
                side,
                order_type,
                amount,
                price,
                reduce_only,
            } => {
                let request = order_request(&symbol, side, order_type, amount, price)?
                    .with_reduce_only(reduce_only);
                tracing::info!(
                    "Creating {} {} order: {} {} @ {}",
                    request.order_type,
                    request.side,
                    request.amount,
                    request.symbol,
                    request
                        .price
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "market".to_string())
                );
                let order = self
                    .exchange
                    .create_order(request)
                    .await
                    .map_err(CliError::exchange("create order"))?;
                Ok(Report::OrderCreated(order))
            }

            Action::CancelOrder { id, symbol } => {
                let id = required("order-id", &id)?;
                let symbol = required("symbol", &symbol)?;
                tracing::info!("Cancelling order {} on {}", id, symbol);
                let order = self
                    .exchange
                    .cancel_order(id, symbol)
                    .await
                    .map_err(CliError::exchange("cancel order"))?;
                Ok(Report::OrderCancelled(order))
            }

            Action::OrderStatus { id, symbol } => {
                let id = required("order-id", &id)?;
                let symbol = required("symbol", &symbol)?;
                let order = self
                    .exchange
                    .fetch_order(id, symbol)
                    .await
                    .map_err(CliError::exchange("fetch order status"))?;
                Ok(Report::OrderStatus(order))
            }

            Action::Orders { symbol, scope } => {
                let symbol = match symbol {
                    Some(s) => Some(required("symbol", &s)?.to_string()),
                    None => None,
                };
                tracing::debug!("Fetching {} orders for {:?}", scope, symbol);
                let orders = match scope {
                    OrderScope::Open => self.exchange.fetch_open_orders(symbol).await,
                    OrderScope::Closed => self.exchange.fetch_closed_orders(symbol).await,
                    OrderScope::All => self.exchange.fetch_orders(symbol).await,
                }
                .map_err(CliError::exchange("fetch orders"))?;
                Ok(Report::Orders { orders })
            }

            Action::OpenOrders { symbol } => {
                let symbol = required("symbol", &symbol)?.to_string();
                let orders = self
                    .exchange
                    .fetch_open_orders(Some(symbol.clone()))
                    .await
                    .map_err(CliError::exchange("fetch open orders"))?;
                Ok(Report::OpenOrders { symbol, orders })
            }

            Action::Positions => {
                let positions: Vec<Position> = self
                    .exchange
                    .fetch_positions()
                    .await
                    .map_err(CliError::exchange("fetch positions"))?
                    .into_iter()
                    .filter(|p| !p.is_flat())
                    .collect();
                tracing::debug!("{} open positions", positions.len());
                Ok(Report::Positions(positions))
            }

            Action::ClosePosition { symbol, confirmed } => {
                let symbol = required("symbol", &symbol)?.to_string();

                if !confirmed {
                    let prompt = format!("Are you sure you want to close the position for {}?", symbol);
                    if !self.confirmation.confirm(&prompt)? {
                        return Err(CliError::UserCancelled);
                    }
                }

                let closed = self
                    .exchange
                    .close_position(&symbol, true)
                    .await
                    .map_err(CliError::exchange("close position"))?;

                if closed.is_empty() {
                    tracing::info!("No open position for {}", symbol);
                    Ok(Report::NoPosition { symbol })
                } else {
                    Ok(Report::PositionClosed(closed))
                }
            }

            Action::Markets(filter) => {
                let markets = self
                    .exchange
                    .fetch_markets()
                    .await
                    .map_err(CliError::exchange("fetch markets"))?;
                let total = markets.len();
                let markets = filter.apply(markets);
                tracing::debug!("{} of {} markets match", markets.len(), total);
                Ok(Report::Markets(markets))
            }

            Action::Info => {
                let info = self
                    .exchange
                    .fetch_exchange_info()
                    .await
                    .map_err(CliError::exchange("fetch exchange info"))?;
                Ok(Report::Info(info))
            }
        }
    }
}

/// Trimmed non-empty value or a validation error naming the flag
fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CliError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CliError::validation(field, "must not be empty"));
    }
    Ok(value)
}

fn order_request(
    symbol: &str,
    side: OrderSide,
    order_type: OrderType,
    amount: Decimal,
    price: Option<Decimal>,
) -> Result<OrderRequest, CliError> {
    let symbol = required("symbol", symbol)?;

    if amount <= Decimal::ZERO {
        return Err(CliError::validation("amount", format!("must be greater than 0, got {}", amount)));
    }

    match order_type {
        OrderType::Limit => match price {
            Some(price) if price > Decimal::ZERO => {
                Ok(OrderRequest::limit(symbol, side, amount, price))
            }
            Some(price) => Err(CliError::validation(
                "price",
                format!("must be greater than 0, got {}", price),
            )),
            None => Err(CliError::validation("price", "required for limit orders")),
        },
        OrderType::Market => {
            if let Some(price) = price {
                tracing::warn!("Ignoring --price {} for market order", price);
            }
            Ok(OrderRequest::market(symbol, side, amount))
        }
    }
}
