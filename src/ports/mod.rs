//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, the dispatcher depends only on
//! `ExchangePort`; concrete exchanges live under `adapters`.

pub mod exchange;

pub use exchange::{ExchangeError, ExchangePort, ExchangeResult};

#[cfg(test)]
pub use exchange::MockExchangePort;
