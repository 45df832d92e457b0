#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use zaif_export::api::{
    ApiError, Currency, CurrencyPair, FuturesGroup, HistoryQuery, HistorySource, MarketCatalog,
    Page, PageRequest,
};
use zaif_export::ExportConfig;

/// In-memory exchange: scripted pages per query, empty pages once a script
/// runs out. Every history request is recorded.
#[derive(Default)]
pub struct FakeExchange {
    pub pairs: Vec<CurrencyPair>,
    pub currencies: Vec<Currency>,
    pub groups: Vec<FuturesGroup>,
    scripts: Mutex<HashMap<HistoryQuery, VecDeque<Result<Page, ApiError>>>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl FakeExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pairs(mut self, pairs: &[(&str, &str)]) -> Self {
        self.pairs = pairs
            .iter()
            .map(|(name, pair)| CurrencyPair {
                name: name.to_string(),
                currency_pair: pair.to_string(),
            })
            .collect();
        self
    }

    pub fn with_currencies(mut self, names: &[&str]) -> Self {
        self.currencies = names
            .iter()
            .map(|name| Currency {
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_groups(mut self, ids: &[u64]) -> Self {
        self.groups = ids.iter().map(|&id| FuturesGroup { id }).collect();
        self
    }

    pub fn script(self, query: HistoryQuery, responses: Vec<Result<Page, ApiError>>) -> Self {
        self.scripts.lock().unwrap().insert(query, responses.into());
        self
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistorySource for FakeExchange {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&request.query)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Page::new()))
    }
}

#[async_trait]
impl MarketCatalog for FakeExchange {
    async fn currency_pairs(&self) -> Result<Vec<CurrencyPair>, ApiError> {
        Ok(self.pairs.clone())
    }

    async fn currencies(&self) -> Result<Vec<Currency>, ApiError> {
        Ok(self.currencies.clone())
    }

    async fn futures_groups(&self) -> Result<Vec<FuturesGroup>, ApiError> {
        Ok(self.groups.clone())
    }
}

/// Build a page from `(id, record)` pairs
pub fn page(entries: Vec<(&str, Value)>) -> Result<Page, ApiError> {
    Ok(entries
        .into_iter()
        .map(|(id, record)| (id.to_string(), record))
        .collect())
}

pub fn deposit_record(timestamp: i64, amount: f64) -> Value {
    json!({
        "timestamp": timestamp,
        "address": "addr",
        "amount": amount,
        "txid": "tx"
    })
}

pub fn spot_record(pair: &str, action: &str, your_action: &str) -> Value {
    json!({
        "currency_pair": pair,
        "action": action,
        "amount": 0.5,
        "price": 100,
        "fee_amount": 0,
        "your_action": your_action,
        "bonus": null,
        "timestamp": 1402018713,
        "comment": ""
    })
}

pub fn config(limit: u32, cache_limit: usize) -> ExportConfig {
    ExportConfig {
        wait_interval: Duration::from_secs(30),
        limit,
        cache_limit,
        ..ExportConfig::default()
    }
}
