//! Binance Adapter
//!
//! Implementation of the ExchangePort for Binance USDⓈ-M futures.
//! Handles request signing, symbol mapping and response decoding.

mod auth;
mod client;
mod error;
mod responses;
mod symbols;

pub use client::{BinanceConfig, BinanceFuturesClient, MAINNET_URL, TESTNET_URL};
pub use symbols::MarketTable;

/// Exchange identifier used in config files and logs
pub const EXCHANGE_ID: &str = "binance-usdm";
pub const EXCHANGE_NAME: &str = "Binance USDⓈ-M Futures";
pub const API_VERSION: &str = "fapi/v1";
