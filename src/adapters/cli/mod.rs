//! CLI Adapter
//!
//! Command-line interface for dexcli.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    build_exchange, execute, load_env_file, CancelCmd, CliApp, CloseCmd, Command, CreateCmd,
    MarketsCmd, OpenOrdersCmd, OrdersCmd, StatusCmd,
};

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
