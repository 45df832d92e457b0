use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ApiError;

/// A single history record as returned by the exchange
pub type RawRecord = Map<String, Value>;

/// One page of history: record id (string-encoded integer) -> record
pub type Page = Map<String, Value>;

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Position family queried through the leverage API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    Margin,
    Futures { group_id: u64 },
}

/// Per-kind parameters for a history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryQuery {
    /// Spot trades for one currency pair (e.g. "btc_jpy")
    Trades { currency_pair: String },
    /// Margin or futures positions
    Positions(PositionType),
    /// Deposits of one currency
    Deposits { currency: String },
    /// Withdrawals of one currency
    Withdrawals { currency: String },
}

/// Request for one page of history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Offset of the first record
    pub from: u64,
    /// Maximum number of records on the page
    pub count: u32,
    pub query: HistoryQuery,
}

/// Tradable currency pair listed by the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Display name (e.g. "BTC/JPY")
    pub name: String,
    /// API identifier (e.g. "btc_jpy")
    pub currency_pair: String,
}

/// Currency listed by the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub name: String,
}

/// Futures contract group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuturesGroup {
    pub id: u64,
}

/// Paginated private history endpoints
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch a single page. Transient failures must surface as errors whose
    /// message names the failure (rate limit, 502, 504).
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, ApiError>;
}

/// Public listings used to enumerate what to export
#[async_trait]
pub trait MarketCatalog: Send + Sync {
    async fn currency_pairs(&self) -> Result<Vec<CurrencyPair>, ApiError>;

    async fn currencies(&self) -> Result<Vec<Currency>, ApiError>;

    async fn futures_groups(&self) -> Result<Vec<FuturesGroup>, ApiError>;
}
