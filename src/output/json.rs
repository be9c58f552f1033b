//! JSON rendering for scripts and pipelines

use serde_json::to_string_pretty;

use crate::application::Report;

pub(super) fn render(report: &Report) -> serde_json::Result<String> {
    match report {
        Report::OrderCreated(order) | Report::OrderCancelled(order) | Report::OrderStatus(order) => {
            to_string_pretty(order)
        }
        Report::Orders { orders } | Report::OpenOrders { orders, .. } => to_string_pretty(orders),
        Report::Positions(positions) => to_string_pretty(positions),
        Report::PositionClosed(closed) => to_string_pretty(closed),
        Report::NoPosition { .. } => Ok("null".to_string()),
        Report::Markets(markets) => to_string_pretty(markets),
        Report::Info(info) => to_string_pretty(info),
    }
}
