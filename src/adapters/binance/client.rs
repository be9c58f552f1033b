//! Binance USDⓈ-M Futures REST Client
//!
//! Implements `ExchangePort` over the `/fapi` REST API. Requests are sent
//! once; there is no retry or client-side rate limiting.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::auth::build_signed_query;
use super::error::{map_api_error, map_transport_error};
use super::responses::{ExchangeInfoResponse, OrderResponse, PositionRiskResponse};
use super::symbols::MarketTable;
use super::EXCHANGE_ID;
use crate::config::Credentials;
use crate::domain::{
    ExchangeInfo, Feature, Market, Order, OrderRequest, OrderSide, OrderStatus, OrderType,
    Position, PositionSide,
};
use crate::ports::{ExchangeError, ExchangePort, ExchangeResult};

pub const MAINNET_URL: &str = "https://fapi.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// Binance client configuration
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST base URL
    pub base_url: String,
    /// `recvWindow` for signed requests in milliseconds
    pub recv_window_ms: u64,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: MAINNET_URL.to_string(),
            recv_window_ms: 5000,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BinanceConfig {
    pub fn testnet() -> Self {
        Self {
            base_url: TESTNET_URL.to_string(),
            ..Self::default()
        }
    }
}

/// Binance USDⓈ-M futures client
#[derive(Debug)]
pub struct BinanceFuturesClient {
    config: BinanceConfig,
    credentials: Credentials,
    http: Client,
    /// Loaded on first symbol lookup
    markets: OnceCell<MarketTable>,
}

impl BinanceFuturesClient {
    pub fn new(credentials: Credentials, config: BinanceConfig) -> ExchangeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExchangeError::Network(format!("Failed to create HTTP client: {}", e)))?;

        debug!("[{}] client ready for {}", EXCHANGE_ID, config.base_url);
        Ok(Self {
            config,
            credentials,
            http,
            markets: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Capabilities implemented by this adapter
    pub fn features() -> Vec<Feature> {
        vec![
            Feature::new("Fetch Ticker", false),
            Feature::new("Fetch Order Book", false),
            Feature::new("Fetch Trades", false),
            Feature::new("Fetch OHLCV", false),
            Feature::new("Fetch Balance", false),
            Feature::new("Create Order", true),
            Feature::new("Cancel Order", true),
            Feature::new("Fetch Order", true),
            Feature::new("Fetch Orders", true),
            Feature::new("Fetch Open Orders", true),
            Feature::new("Fetch Closed Orders", true),
            Feature::new("Fetch Positions", true),
            Feature::new("Close Position", true),
            Feature::new("Fetch Markets", true),
        ]
    }

    /// Full URL of a signed request
    fn signed_url(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
        timestamp_ms: i64,
    ) -> ExchangeResult<String> {
        params.push(("recvWindow", self.config.recv_window_ms.to_string()));
        params.push(("timestamp", timestamp_ms.to_string()));
        let query = build_signed_query(&params, self.credentials.api_secret())?;
        Ok(format!("{}{}?{}", self.config.base_url, path, query))
    }

    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> ExchangeResult<T> {
        let url = self.signed_url(path, params, chrono::Utc::now().timestamp_millis())?;
        debug!("[{}] {} {}", EXCHANGE_ID, method, path);

        let response = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", self.credentials.api_key())
            .send()
            .await
            .map_err(map_transport_error)?;

        Self::handle_response(response).await
    }

    async fn public<T: DeserializeOwned>(&self, path: &str) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("[{}] GET {}", EXCHANGE_ID, path);

        let response = self.http.get(&url).send().await.map_err(map_transport_error)?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ExchangeResult<T> {
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(map_api_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ExchangeError::Decode(format!("Failed to parse response: {}", e)))
    }

    async fn exchange_info_raw(&self) -> ExchangeResult<ExchangeInfoResponse> {
        self.public("/fapi/v1/exchangeInfo").await
    }

    async fn market_table(&self) -> ExchangeResult<&MarketTable> {
        self.markets
            .get_or_try_init(|| async {
                let markets = self.load_markets().await?;
                debug!("[{}] loaded {} markets", EXCHANGE_ID, markets.len());
                Ok::<_, ExchangeError>(MarketTable::new(&markets))
            })
            .await
    }

    async fn load_markets(&self) -> ExchangeResult<Vec<Market>> {
        let info = self.exchange_info_raw().await?;
        Ok(info.symbols.into_iter().map(|s| s.into_market()).collect())
    }

    /// Resolve a user symbol to `(market id, unified symbol)`
    async fn resolve(&self, symbol: &str) -> ExchangeResult<(String, String)> {
        let table = self.market_table().await?;
        table
            .resolve(symbol)
            .map(|m| (m.id.clone(), m.symbol.clone()))
            .ok_or_else(|| ExchangeError::InvalidSymbol(format!("{} is not listed on {}", symbol, EXCHANGE_ID)))
    }

    async fn convert_orders(&self, raw: Vec<OrderResponse>) -> ExchangeResult<Vec<Order>> {
        let table = self.market_table().await?;
        raw.into_iter()
            .map(|o| {
                let symbol = table.symbol_for(&o.symbol);
                o.into_order(symbol)
            })
            .collect()
    }

    async fn all_orders(&self, symbol: Option<String>, action: &str) -> ExchangeResult<Vec<Order>> {
        let symbol = require_symbol(symbol, action)?;
        let (id, _) = self.resolve(&symbol).await?;
        let raw: Vec<OrderResponse> = self
            .signed(Method::GET, "/fapi/v1/allOrders", vec![("symbol", id)])
            .await?;
        self.convert_orders(raw).await
    }
}

/// `allOrders` is per symbol only
fn require_symbol(symbol: Option<String>, action: &str) -> ExchangeResult<String> {
    symbol.ok_or_else(|| {
        ExchangeError::Unsupported(format!("{} requires a symbol to {}", EXCHANGE_ID, action))
    })
}

/// Fully filled orders
fn closed_only(orders: Vec<Order>) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| o.status == OrderStatus::Closed)
        .collect()
}

/// Query parameters for `POST /fapi/v1/order`
pub(crate) fn order_params(market_id: String, request: &OrderRequest) -> Vec<(&'static str, String)> {
    let side = match request.side {
        OrderSide::Buy => "BUY",
        OrderSide::Sell => "SELL",
    };

    let mut params = vec![
        ("symbol", market_id),
        ("side", side.to_string()),
        ("type", request.order_type.as_str().to_ascii_uppercase()),
        ("quantity", request.amount.to_string()),
    ];

    if request.order_type == OrderType::Limit {
        if let Some(price) = request.price {
            params.push(("price", price.to_string()));
        }
        params.push(("timeInForce", "GTC".to_string()));
    }

    match request.position_side {
        Some(PositionSide::Long) => params.push(("positionSide", "LONG".to_string())),
        Some(PositionSide::Short) => params.push(("positionSide", "SHORT".to_string())),
        // reduceOnly is rejected in hedge mode
        None if request.reduce_only => params.push(("reduceOnly", "true".to_string())),
        None => {}
    }

    params.push(("newOrderRespType", "RESULT".to_string()));
    params
}

fn parse_order_id(id: &str) -> ExchangeResult<String> {
    id.trim()
        .parse::<u64>()
        .map(|n| n.to_string())
        .map_err(|_| ExchangeError::OrderNotFound(format!("'{}' is not a valid order id", id)))
}

#[async_trait]
impl ExchangePort for BinanceFuturesClient {
    async fn create_order(&self, request: OrderRequest) -> ExchangeResult<Order> {
        let (id, symbol) = self.resolve(&request.symbol).await?;

        let raw: OrderResponse = self
            .signed(Method::POST, "/fapi/v1/order", order_params(id, &request))
            .await?;
        let order = raw.into_order(symbol)?;

        info!(
            "[{}] order {} created: {} {} {} ({})",
            EXCHANGE_ID, order.id, order.side, order.amount, order.symbol, order.status
        );
        Ok(order)
    }

    async fn cancel_order(&self, id: &str, symbol: &str) -> ExchangeResult<Order> {
        let order_id = parse_order_id(id)?;
        let (market_id, unified) = self.resolve(symbol).await?;

        let raw: OrderResponse = self
            .signed(
                Method::DELETE,
                "/fapi/v1/order",
                vec![("symbol", market_id), ("orderId", order_id)],
            )
            .await?;
        let order = raw.into_order(unified)?;

        info!("[{}] order {} canceled", EXCHANGE_ID, order.id);
        Ok(order)
    }

    async fn fetch_order(&self, id: &str, symbol: &str) -> ExchangeResult<Order> {
        let order_id = parse_order_id(id)?;
        let (market_id, unified) = self.resolve(symbol).await?;

        let raw: OrderResponse = self
            .signed(
                Method::GET,
                "/fapi/v1/order",
                vec![("symbol", market_id), ("orderId", order_id)],
            )
            .await?;
        raw.into_order(unified)
    }

    async fn fetch_open_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>> {
        let mut params = Vec::new();
        if let Some(ref symbol) = symbol {
            let (id, _) = self.resolve(symbol).await?;
            params.push(("symbol", id));
        }

        let raw: Vec<OrderResponse> = self
            .signed(Method::GET, "/fapi/v1/openOrders", params)
            .await?;
        self.convert_orders(raw).await
    }

    async fn fetch_closed_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>> {
        let orders = self.all_orders(symbol, "fetch closed orders").await?;
        Ok(closed_only(orders))
    }

    async fn fetch_orders(&self, symbol: Option<String>) -> ExchangeResult<Vec<Order>> {
        self.all_orders(symbol, "fetch order history").await
    }

    async fn fetch_positions(&self) -> ExchangeResult<Vec<Position>> {
        let raw: Vec<PositionRiskResponse> = self
            .signed(Method::GET, "/fapi/v2/positionRisk", Vec::new())
            .await?;
        let table = self.market_table().await?;

        raw.into_iter()
            .map(|p| {
                let symbol = table.symbol_for(&p.symbol);
                p.into_position(symbol)
            })
            .collect()
    }

    async fn fetch_markets(&self) -> ExchangeResult<Vec<Market>> {
        let markets = self.load_markets().await?;
        if self.markets.get().is_none() {
            // Reuse the listing for any later symbol lookups
            let _ = self.markets.set(MarketTable::new(&markets));
        }
        Ok(markets)
    }

    async fn fetch_exchange_info(&self) -> ExchangeResult<ExchangeInfo> {
        let info = self.exchange_info_raw().await?;
        Ok(info.into_exchange_info(&self.config.base_url, Self::features()))
    }

    async fn resolve_symbol(&self, symbol: &str) -> ExchangeResult<String> {
        let (_, unified) = self.resolve(symbol).await?;
        Ok(unified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn client(config: BinanceConfig) -> BinanceFuturesClient {
        BinanceFuturesClient::new(Credentials::new("key", "secret"), config).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = BinanceConfig::default();
        assert_eq!(config.base_url, MAINNET_URL);
        assert_eq!(config.recv_window_ms, 5000);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_testnet() {
        assert_eq!(BinanceConfig::testnet().base_url, TESTNET_URL);
    }

    #[test]
    fn test_signed_url_layout() {
        let client = client(BinanceConfig::default());
        let url = client
            .signed_url("/fapi/v1/order", vec![("symbol", "BTCUSDT".into())], 1_700_000_000_000)
            .unwrap();

        assert!(url.starts_with(
            "https://fapi.binance.com/fapi/v1/order?symbol=BTCUSDT&recvWindow=5000&timestamp=1700000000000&signature="
        ));
    }

    #[test]
    fn test_limit_order_params() {
        let request = OrderRequest::limit("BTC/USDT", OrderSide::Buy, dec!(0.001), dec!(50000));
        let params = order_params("BTCUSDT".into(), &request);

        assert_eq!(
            params,
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("side", "BUY".to_string()),
                ("type", "LIMIT".to_string()),
                ("quantity", "0.001".to_string()),
                ("price", "50000".to_string()),
                ("timeInForce", "GTC".to_string()),
                ("newOrderRespType", "RESULT".to_string()),
            ]
        );
    }

    #[test]
    fn test_market_order_params_skip_price() {
        let mut request = OrderRequest::market("ETH/USDT", OrderSide::Sell, dec!(2)).with_reduce_only(true);
        // A stray price on a market request must never reach the exchange
        request.price = Some(dec!(3000));
        let params = order_params("ETHUSDT".into(), &request);

        assert!(params.iter().all(|(k, _)| *k != "price" && *k != "timeInForce"));
        assert!(params.contains(&("reduceOnly", "true".to_string())));
        assert!(params.contains(&("type", "MARKET".to_string())));
    }

    #[test]
    fn test_hedged_close_params_carry_position_side() {
        let request = OrderRequest::market("BTC/USDT:USDT", OrderSide::Sell, dec!(0.5))
            .with_reduce_only(true)
            .with_position_side(PositionSide::Long);
        let params = order_params("BTCUSDT".into(), &request);

        assert_eq!(
            params,
            vec![
                ("symbol", "BTCUSDT".to_string()),
                ("side", "SELL".to_string()),
                ("type", "MARKET".to_string()),
                ("quantity", "0.5".to_string()),
                ("positionSide", "LONG".to_string()),
                ("newOrderRespType", "RESULT".to_string()),
            ]
        );
    }

    #[test]
    fn test_order_history_requires_symbol() {
        let err = require_symbol(None, "fetch closed orders").unwrap_err();
        assert!(matches!(err, ExchangeError::Unsupported(ref msg) if msg.contains("fetch closed orders")));
        assert_eq!(require_symbol(Some("BTC/USDT".into()), "fetch orders").unwrap(), "BTC/USDT");
    }

    #[test]
    fn test_closed_only_keeps_filled_orders() {
        let order = |id: &str, status: OrderStatus| Order {
            id: id.into(),
            client_order_id: None,
            symbol: "BTC/USDT:USDT".into(),
            order_type: "limit".into(),
            side: OrderSide::Buy,
            amount: dec!(1),
            filled: dec!(0),
            price: Some(dec!(100)),
            average: None,
            status,
            reduce_only: false,
            timestamp: None,
        };

        let kept = closed_only(vec![
            order("1", OrderStatus::Open),
            order("2", OrderStatus::Closed),
            order("3", OrderStatus::Canceled),
            order("4", OrderStatus::Expired),
            order("5", OrderStatus::Closed),
        ]);
        let ids: Vec<&str> = kept.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5"]);
    }

    #[test]
    fn test_parse_order_id() {
        assert_eq!(parse_order_id(" 22542179 ").unwrap(), "22542179");
        assert!(matches!(parse_order_id("abc"), Err(ExchangeError::OrderNotFound(_))));
    }

    #[test]
    fn test_features_cover_cli_commands() {
        let features = BinanceFuturesClient::features();
        for name in ["Create Order", "Cancel Order", "Fetch Positions", "Fetch Markets"] {
            assert!(features.iter().any(|f| f.name == name && f.supported), "{name}");
        }
    }
}
