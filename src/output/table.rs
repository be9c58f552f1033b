//! Grid tables for terminal output
//!
//! Lists render one row per record; single records render as a
//! field/value table. Missing values are empty cells.

use chrono::{DateTime, Utc};
use prettytable::{format, Cell, Row, Table};

use crate::application::Report;
use crate::domain::{format_timestamp, ExchangeInfo, Feature, Market, Order, Position, RateLimit};

/// A record that can be laid out as a table row
pub trait TableRecord {
    const HEADERS: &'static [&'static str];

    /// One cell per header, in header order
    fn cells(&self) -> Vec<String>;
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn ts(value: &Option<DateTime<Utc>>) -> String {
    value.as_ref().map(format_timestamp).unwrap_or_default()
}

impl TableRecord for Order {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Client ID", "Symbol", "Type", "Side", "Amount", "Filled", "Price", "Average",
        "Status", "Reduce Only", "Created",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            opt(&self.client_order_id),
            self.symbol.clone(),
            self.order_type.clone(),
            self.side.to_string(),
            self.amount.to_string(),
            self.filled.to_string(),
            opt(&self.price),
            opt(&self.average),
            self.status.to_string(),
            self.reduce_only.to_string(),
            ts(&self.timestamp),
        ]
    }
}

impl TableRecord for Position {
    const HEADERS: &'static [&'static str] = &[
        "Symbol", "Side", "Contracts", "Entry Price", "Mark Price", "Unrealized PnL", "PnL %",
        "Initial Margin", "Leverage", "Liq. Price", "Margin Mode", "Hedged", "Updated",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.symbol.clone(),
            self.side.to_string(),
            self.contracts.to_string(),
            self.entry_price.to_string(),
            opt(&self.mark_price),
            self.unrealized_pnl.to_string(),
            opt(&self.percentage),
            opt(&self.initial_margin),
            self.leverage.to_string(),
            opt(&self.liquidation_price),
            self.margin_mode.to_string(),
            self.hedged.to_string(),
            ts(&self.timestamp),
        ]
    }
}

impl TableRecord for Market {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Symbol", "Base", "Quote", "Settle", "Type", "Active", "Expiry", "Amount Prec.",
        "Price Prec.", "Min Amount", "Max Amount", "Min Price", "Max Price", "Min Cost",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.symbol.clone(),
            self.base.clone(),
            self.quote.clone(),
            opt(&self.settle),
            self.market_type.to_string(),
            self.active.to_string(),
            ts(&self.expiry),
            opt(&self.precision.amount),
            opt(&self.precision.price),
            opt(&self.limits.amount_min),
            opt(&self.limits.amount_max),
            opt(&self.limits.price_min),
            opt(&self.limits.price_max),
            opt(&self.limits.cost_min),
        ]
    }
}

impl TableRecord for RateLimit {
    const HEADERS: &'static [&'static str] = &["Type", "Interval", "Interval Num", "Limit"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.interval.clone(),
            self.interval_num.to_string(),
            self.limit.to_string(),
        ]
    }
}

impl TableRecord for Feature {
    const HEADERS: &'static [&'static str] = &["Feature", "Supported"];

    fn cells(&self) -> Vec<String> {
        vec![self.name.clone(), self.supported.to_string()]
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_DEFAULT);
    table
}

fn row(cells: &[String]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c)).collect())
}

/// One row per record under a header row
fn grid<T: TableRecord>(records: &[T]) -> String {
    let mut table = new_table();
    let headers: Vec<String> = T::HEADERS.iter().map(|h| h.to_string()).collect();
    table.set_titles(row(&headers));
    for record in records {
        table.add_row(row(&record.cells()));
    }
    table.to_string()
}

/// A single record as field/value pairs
fn detail<T: TableRecord>(record: &T) -> String {
    let mut table = new_table();
    for (header, value) in T::HEADERS.iter().zip(record.cells()) {
        table.add_row(row(&[header.to_string(), value]));
    }
    table.to_string()
}

fn info(info: &ExchangeInfo) -> String {
    let mut table = new_table();
    let fields = [
        ("ID", info.id.clone()),
        ("Name", info.name.clone()),
        ("URL", info.url.clone()),
        ("Version", info.version.clone()),
        ("Timezone", opt(&info.timezone)),
        ("Server Time", ts(&info.server_time)),
    ];
    for (field, value) in fields {
        table.add_row(row(&[field.to_string(), value]));
    }

    let mut out = format!("Exchange Information\n{}", table);
    if !info.rate_limits.is_empty() {
        out.push_str(&format!("\nRate Limits\n{}", grid(&info.rate_limits)));
    }
    out.push_str(&format!("\nFeatures\n{}", grid(&info.features)));
    out
}

pub(super) fn render(report: &Report) -> String {
    let out = match report {
        Report::OrderCreated(order) => format!("Order created successfully!\n{}", detail(order)),
        Report::OrderCancelled(order) => {
            format!("Order {} cancelled successfully!\n{}", order.id, detail(order))
        }
        Report::OrderStatus(order) => detail(order),
        Report::Orders { orders } if orders.is_empty() => "No orders found.".to_string(),
        Report::Orders { orders } => {
            format!("{}\nTotal: {} orders", grid(orders), orders.len())
        }
        Report::OpenOrders { symbol, orders } if orders.is_empty() => {
            format!("No open orders found for {}", symbol)
        }
        Report::OpenOrders { symbol, orders } => format!(
            "Open orders for {}\n{}\nTotal open orders: {}",
            symbol,
            grid(orders),
            orders.len()
        ),
        Report::Positions(positions) if positions.is_empty() => {
            "No open positions found.".to_string()
        }
        Report::Positions(positions) => grid(positions),
        Report::PositionClosed(closed) => {
            let mut out = String::from("Position closed successfully!\n");
            for leg in closed {
                out.push_str(&format!(
                    "\nPosition\n{}\nClosing order\n{}",
                    detail(&leg.position),
                    detail(&leg.order)
                ));
            }
            out
        }
        Report::NoPosition { symbol } => format!("No open position found for {}", symbol),
        Report::Markets(markets) if markets.is_empty() => {
            "No markets found matching the criteria.".to_string()
        }
        Report::Markets(markets) => {
            format!("{}\nTotal markets: {}", grid(markets), markets.len())
        }
        Report::Info(exchange) => info(exchange),
    };
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_has_header_and_rows() {
        let limits = vec![
            RateLimit { kind: "REQUEST_WEIGHT".into(), interval: "MINUTE".into(), interval_num: 1, limit: 2400 },
            RateLimit { kind: "ORDERS".into(), interval: "SECOND".into(), interval_num: 10, limit: 300 },
        ];
        let out = grid(&limits);
        assert!(out.contains("Interval Num"));
        assert!(out.contains("REQUEST_WEIGHT"));
        assert!(out.contains("300"));
        assert!(out.lines().count() >= 5);
    }

    #[test]
    fn test_detail_lists_every_header() {
        let feature = Feature::new("Close Position", true);
        let out = detail(&feature);
        assert!(out.contains("Feature"));
        assert!(out.contains("Close Position"));
        assert!(out.contains("Supported"));
        assert!(out.contains("true"));
    }

    #[test]
    fn test_missing_option_is_empty_cell() {
        assert_eq!(opt::<String>(&None), "");
        assert_eq!(ts(&None), "");
    }
}
