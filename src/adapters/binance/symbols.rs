//! Symbol resolution between unified symbols and Binance market ids

use std::collections::HashMap;

use crate::domain::Market;

/// Lookup table built from `exchangeInfo`
#[derive(Debug, Clone, Default)]
pub struct MarketTable {
    by_id: HashMap<String, Market>,
    /// Uppercased unified symbol -> market id
    ids: HashMap<String, String>,
}

impl MarketTable {
    pub fn new(markets: &[Market]) -> Self {
        let mut table = Self::default();
        for market in markets {
            table.ids.insert(market.symbol.to_ascii_uppercase(), market.id.clone());
            table.by_id.insert(market.id.clone(), market.clone());
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Find a market by unified symbol, `BASE/QUOTE` shorthand or raw id.
    ///
    /// The shorthand resolves to the perpetual settled in the quote asset.
    pub fn resolve(&self, symbol: &str) -> Option<&Market> {
        let key = symbol.trim().to_ascii_uppercase();

        if let Some(id) = self.ids.get(&key) {
            return self.by_id.get(id);
        }

        if !key.contains(':') {
            if let Some((_, quote)) = key.split_once('/') {
                let linear = format!("{}:{}", key, quote);
                if let Some(id) = self.ids.get(&linear) {
                    return self.by_id.get(id);
                }
            }
        }

        self.by_id.get(&key)
    }

    /// Unified symbol for a market id, or the id itself when unknown
    pub fn symbol_for(&self, id: &str) -> String {
        self.by_id
            .get(id)
            .map(|m| m.symbol.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
