//! Paginated history fetching: retry, ordering and de-duplication.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod retry;

pub use cache::DedupCache;
pub use error::{FetchError, TransformError};
pub use fetcher::{FetchCursor, HistoryFetcher};
pub use retry::{RetryPolicy, TransientFailure};
