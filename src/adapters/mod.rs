//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Binance: USDⓈ-M futures REST client
//! - CLI: Command-line interface handlers

pub mod binance;
pub mod cli;

pub use binance::BinanceFuturesClient;
pub use cli::CliApp;
