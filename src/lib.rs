//! dexcli - Command-line trading client library
//!
//! Places and inspects orders, lists and closes positions, and browses
//! markets on a derivatives exchange.
//!
//! # Modules
//!
//! - `domain`: Exchange records (Order, Position, Market, ExchangeInfo)
//! - `ports`: Trait abstractions (ExchangePort)
//! - `adapters`: External implementations (Binance USDⓈ-M futures, CLI)
//! - `config`: Configuration file and credential loading
//! - `application`: Command dispatch and confirmation
//! - `output`: Table and JSON rendering
//! - `error`: CLI error type and exit codes

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
pub mod output;
pub mod error;
