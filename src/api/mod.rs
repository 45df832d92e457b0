pub mod client;
pub mod error;
pub mod rate_limiter;
pub mod zaif;

pub use client::{
    Currency, CurrencyPair, FuturesGroup, HistoryQuery, HistorySource, MarketCatalog, Page,
    PageRequest, PositionType, RateLimitConfig, RawRecord,
};
pub use error::ApiError;
pub use rate_limiter::RateLimiter;
