//! CLI Command Handlers
//!
//! Argument definitions for every dexcli command and the glue that turns a
//! parsed command line into rendered output.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::adapters::binance::BinanceFuturesClient;
use crate::application::{Action, Dispatcher, OrderScope, StdinConfirmation};
use crate::config::{
    expand_path, load_optional, AppConfig, ConfigError, Credentials, BASE_URL_VAR, CONFIG_PATH_VAR,
};
use crate::domain::{MarketFilter, MarketType, OrderSide, OrderType};
use crate::error::CliError;
use crate::output::{self, OutputFormat};

/// dexcli - trade derivatives from the command line
#[derive(Parser, Debug)]
#[command(
    name = "dexcli",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Command-line trading client for Binance USDⓈ-M futures",
    long_about = "dexcli places, cancels and inspects orders, lists and closes positions, \
                  and browses markets. Credentials are read from DEXCLI_API_KEY and \
                  DEXCLI_API_SECRET, optionally loaded from a .env file."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output format (defaults to the config file, then table)
    #[arg(short, long, global = true, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file (or set DEXCLI_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Use the exchange testnet
    #[arg(long, global = true)]
    pub testnet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new order
    Create(CreateCmd),

    /// Cancel an existing order
    Cancel(CancelCmd),

    /// Check the status of an order
    Status(StatusCmd),

    /// List orders
    Orders(OrdersCmd),

    /// List open orders for a symbol
    GetOpenOrders(OpenOrdersCmd),

    /// List open positions
    Positions,

    /// Close the open position on a symbol
    Close(CloseCmd),

    /// List available markets
    Markets(MarketsCmd),

    /// Show exchange information
    Info,
}

/// Create a new order
#[derive(Parser, Debug)]
pub struct CreateCmd {
    /// Trading pair (e.g., BTC/USDT)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: String,

    /// Order side
    #[arg(short = 'd', long, value_enum)]
    pub side: OrderSide,

    /// Order type
    #[arg(short = 't', long = "type", value_enum, default_value_t = OrderType::Limit)]
    pub order_type: OrderType,

    /// Order amount in base currency
    #[arg(short, long, value_name = "AMOUNT", allow_negative_numbers = true)]
    pub amount: Decimal,

    /// Limit price (required for limit orders)
    #[arg(short, long, value_name = "PRICE", allow_negative_numbers = true)]
    pub price: Option<Decimal>,

    /// Only reduce an existing position
    #[arg(long)]
    pub reduce_only: bool,
}

/// Cancel an order
#[derive(Parser, Debug)]
pub struct CancelCmd {
    /// Order ID to cancel
    #[arg(short = 'i', long, value_name = "ID")]
    pub order_id: String,

    /// Trading pair (e.g., BTC/USDT)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: String,
}

/// Check order status
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Order ID to look up
    #[arg(short = 'i', long, value_name = "ID")]
    pub order_id: String,

    /// Trading pair (e.g., BTC/USDT)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: String,
}

/// List orders
#[derive(Parser, Debug)]
pub struct OrdersCmd {
    /// Only orders on this trading pair
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: Option<String>,

    /// Which orders to list
    #[arg(short = 't', long, value_enum, default_value_t = OrderScope::Open)]
    pub status: OrderScope,
}

/// List open orders for a symbol
#[derive(Parser, Debug)]
pub struct OpenOrdersCmd {
    /// Trading pair (e.g., BTC/USDT)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: String,
}

/// Close a position
#[derive(Parser, Debug)]
pub struct CloseCmd {
    /// Trading pair (e.g., BTC/USDT)
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: String,

    /// Close without prompting
    #[arg(short = 'y', long)]
    pub confirm: bool,
}

/// List markets
#[derive(Parser, Debug)]
pub struct MarketsCmd {
    /// Only active markets
    #[arg(short, long)]
    pub active: bool,

    /// Only markets of this type
    #[arg(short = 't', long = "type", value_enum)]
    pub market_type: Option<MarketType>,

    /// Only markets quoted in this currency (e.g., USDT)
    #[arg(short, long, value_name = "CURRENCY")]
    pub quote: Option<String>,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Create(cmd) => Action::CreateOrder {
                symbol: cmd.symbol,
                side: cmd.side,
                order_type: cmd.order_type,
                amount: cmd.amount,
                price: cmd.price,
                reduce_only: cmd.reduce_only,
            },
            Command::Cancel(cmd) => Action::CancelOrder {
                id: cmd.order_id,
                symbol: cmd.symbol,
            },
            Command::Status(cmd) => Action::OrderStatus {
                id: cmd.order_id,
                symbol: cmd.symbol,
            },
            Command::Orders(cmd) => Action::Orders {
                symbol: cmd.symbol,
                scope: cmd.status,
            },
            Command::GetOpenOrders(cmd) => Action::OpenOrders { symbol: cmd.symbol },
            Command::Positions => Action::Positions,
            Command::Close(cmd) => Action::ClosePosition {
                symbol: cmd.symbol,
                confirmed: cmd.confirm,
            },
            Command::Markets(cmd) => Action::Markets(MarketFilter {
                active_only: cmd.active,
                market_type: cmd.market_type,
                quote: cmd.quote,
            }),
            Command::Info => Action::Info,
        }
    }
}

/// Load `--env-file`, or `./.env` when present.
///
/// Variables already set in the environment win.
pub fn load_env_file(path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => {
            let path = expand_path(path);
            dotenvy::from_path(&path).map_err(|e| ConfigError::EnvFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            tracing::debug!("Loaded environment from {}", path.display());
        }
        None => default_env_loaded(dotenvy::dotenv())?,
    }
    Ok(())
}

/// Only an absent `./.env` is ignored, a malformed one is reported
fn default_env_loaded(result: Result<PathBuf, dotenvy::Error>) -> Result<(), CliError> {
    match result {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::EnvFile {
            path: PathBuf::from(".env"),
            reason: e.to_string(),
        }
        .into()),
    }
}

/// Construct the exchange adapter, failing fast on missing credentials
pub fn build_exchange<F>(
    config: &AppConfig,
    testnet: bool,
    lookup: F,
) -> Result<BinanceFuturesClient, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(&lookup)?;
    let binance = config.binance_config(lookup(BASE_URL_VAR), testnet);
    tracing::debug!("Using exchange endpoint {}", binance.base_url);

    BinanceFuturesClient::new(credentials, binance)
        .map_err(CliError::exchange("initialize exchange client"))
}

/// Execute the CLI command and return the rendered output
pub async fn execute(app: CliApp) -> Result<String, CliError> {
    let config_path = app
        .config
        .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));
    let config = load_optional(config_path.as_deref())?;

    let format = app
        .format
        .or(config.output.format)
        .unwrap_or_default();

    let exchange = build_exchange(&config, app.testnet, |var| std::env::var(var).ok())?;
    let mut dispatcher = Dispatcher::new(exchange, StdinConfirmation);

    let report = dispatcher.run(Action::from(app.command)).await?;
    Ok(output::render(&report, format)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{API_KEY_VAR, API_SECRET_VAR};
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_app_parse_create() {
        let args = vec![
            "dexcli", "create", "-s", "BTC/USDT", "-d", "buy", "-a", "0.001", "-p", "50000.10",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Create(cmd) => {
                assert_eq!(cmd.symbol, "BTC/USDT");
                assert_eq!(cmd.side, OrderSide::Buy);
                assert_eq!(cmd.order_type, OrderType::Limit);
                assert_eq!(cmd.amount, dec!(0.001));
                assert_eq!(cmd.price, Some(dec!(50000.10)));
                assert!(!cmd.reduce_only);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_cli_app_parse_create_market() {
        let args = vec![
            "dexcli", "create", "--symbol", "ETH/USDT", "--side", "sell", "--type", "market",
            "--amount", "2", "--reduce-only",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Create(cmd) => {
                assert_eq!(cmd.order_type, OrderType::Market);
                assert!(cmd.price.is_none());
                assert!(cmd.reduce_only);
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_cli_app_rejects_bad_values() {
        let bad_side = vec!["dexcli", "create", "-s", "BTC/USDT", "-d", "hold", "-a", "1"];
        assert!(CliApp::try_parse_from(bad_side).is_err());

        let bad_amount = vec!["dexcli", "create", "-s", "BTC/USDT", "-d", "buy", "-a", "lots"];
        assert!(CliApp::try_parse_from(bad_amount).is_err());

        let missing_symbol = vec!["dexcli", "cancel", "-i", "123"];
        assert!(CliApp::try_parse_from(missing_symbol).is_err());
    }

    #[test]
    fn test_cli_app_parse_get_open_orders() {
        let args = vec!["dexcli", "get-open-orders", "-s", "BTC/USDT"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(matches!(app.command, Command::GetOpenOrders(ref cmd) if cmd.symbol == "BTC/USDT"));
    }

    #[test]
    fn test_cli_app_parse_orders_scope() {
        let app = CliApp::try_parse_from(vec!["dexcli", "orders"]).unwrap();
        match app.command {
            Command::Orders(cmd) => {
                assert!(cmd.symbol.is_none());
                assert_eq!(cmd.status, OrderScope::Open);
            }
            _ => panic!("Expected Orders command"),
        }

        let app = CliApp::try_parse_from(vec!["dexcli", "orders", "-t", "all", "-s", "BTC/USDT"]).unwrap();
        assert!(matches!(app.command, Command::Orders(ref cmd) if cmd.status == OrderScope::All));
    }

    #[test]
    fn test_cli_app_parse_close() {
        let app = CliApp::try_parse_from(vec!["dexcli", "close", "-s", "BTC/USDT", "-y"]).unwrap();
        let action = Action::from(app.command);
        assert_eq!(
            action,
            Action::ClosePosition { symbol: "BTC/USDT".into(), confirmed: true }
        );
    }

    #[test]
    fn test_cli_app_parse_markets_filters() {
        let args = vec!["dexcli", "markets", "--active", "-t", "swap", "-q", "USDT"];
        let app = CliApp::try_parse_from(args).unwrap();
        let action = Action::from(app.command);
        assert_eq!(
            action,
            Action::Markets(MarketFilter {
                active_only: true,
                market_type: Some(MarketType::Swap),
                quote: Some("USDT".into()),
            })
        );
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["dexcli", "positions", "--format", "json", "-v", "--testnet"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert_eq!(app.format, Some(OutputFormat::Json));
        assert!(app.verbose);
        assert!(app.testnet);
        assert!(!app.debug);
        assert!(matches!(app.command, Command::Positions));
    }

    #[test]
    fn test_default_format_unset() {
        let app = CliApp::try_parse_from(vec!["dexcli", "info"]).unwrap();
        assert!(app.format.is_none());
        assert!(app.config.is_none());
    }

    #[test]
    fn test_build_exchange_requires_credentials() {
        let err = build_exchange(&AppConfig::default(), false, |_| None).unwrap_err();
        assert!(matches!(err, CliError::MissingCredentials { ref vars } if vars.len() == 2));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_build_exchange_honours_base_url_override() {
        let lookup = |var: &str| match var {
            API_KEY_VAR => Some("key".to_string()),
            API_SECRET_VAR => Some("secret".to_string()),
            BASE_URL_VAR => Some("http://127.0.0.1:9999/".to_string()),
            _ => None,
        };
        let client = build_exchange(&AppConfig::default(), true, lookup).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_missing_env_file_is_config_error() {
        let err = load_env_file(Some(Path::new("/nonexistent/dexcli.env"))).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::EnvFile { .. })));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_absent_default_env_file_is_ignored() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no .env");
        assert!(default_env_loaded(Err(dotenvy::Error::Io(missing))).is_ok());
    }

    #[test]
    fn test_malformed_default_env_file_is_config_error() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NOT VALID LINE").unwrap();
        let result = dotenvy::from_path(file.path()).map(|_| file.path().to_path_buf());

        let err = default_env_loaded(result).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::EnvFile { .. })));
        assert_eq!(err.exit_code(), 2);
    }
}
