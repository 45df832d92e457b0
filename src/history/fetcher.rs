use futures::stream::{self, Stream};
use serde_json::Value;
use std::collections::VecDeque;

use crate::api::{HistoryQuery, HistorySource, Page, PageRequest, PositionType, RawRecord};

use super::cache::DedupCache;
use super::error::{FetchError, TransformError};
use super::retry::RetryPolicy;

/// Position in the paginated history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCursor {
    /// Offset sent as `from` on the next request
    pub offset: u64,
    /// Pages consumed so far
    pub pages: u64,
}

impl FetchCursor {
    /// Move past a page of `raw_len` records, duplicates included
    pub fn advance(&mut self, raw_len: usize) {
        self.offset += raw_len as u64;
        self.pages += 1;
    }
}

/// Turns an offset-paginated, possibly overlapping history endpoint into an
/// ordered stream of records, each id emitted at most once within the
/// dedup window.
#[derive(Debug, Clone)]
pub struct HistoryFetcher {
    page_limit: u32,
    cache_limit: usize,
    retry: RetryPolicy,
}

struct FetchState<T, O> {
    query: HistoryQuery,
    transform: T,
    cursor: FetchCursor,
    cache: DedupCache,
    pending: VecDeque<O>,
    exhausted: bool,
}

impl HistoryFetcher {
    pub fn new(page_limit: u32, cache_limit: usize, retry: RetryPolicy) -> Self {
        Self {
            page_limit,
            cache_limit,
            retry,
        }
    }

    /// Lazily page through `query` on `source`, passing every newly seen record
    /// through `transform`.
    ///
    /// Pages are requested only when the consumer has drained the previous
    /// one. The stream ends after the first empty page, or after the first
    /// error.
    pub fn fetch<'a, S, T, O>(
        &'a self,
        source: &'a S,
        query: HistoryQuery,
        transform: T,
    ) -> impl Stream<Item = Result<O, FetchError>> + 'a
    where
        S: HistorySource + ?Sized,
        T: Fn(RawRecord) -> Result<Vec<O>, TransformError> + 'a,
        O: 'a,
    {
        let state = FetchState {
            query,
            transform,
            cursor: FetchCursor::default(),
            cache: DedupCache::new(self.cache_limit),
            pending: VecDeque::new(),
            exhausted: false,
        };

        stream::try_unfold(state, move |state| self.next_record(source, state))
    }

    async fn next_record<S, T, O>(
        &self,
        source: &S,
        mut state: FetchState<T, O>,
    ) -> Result<Option<(O, FetchState<T, O>)>, FetchError>
    where
        S: HistorySource + ?Sized,
        T: Fn(RawRecord) -> Result<Vec<O>, TransformError>,
    {
        loop {
            if let Some(record) = state.pending.pop_front() {
                return Ok(Some((record, state)));
            }
            if state.exhausted {
                return Ok(None);
            }

            let request = PageRequest {
                from: state.cursor.offset,
                count: self.page_limit,
                query: state.query.clone(),
            };
            let label = format!("{} from={}", describe(&request.query), request.from);
            let page = self.retry.run(&label, || source.fetch_page(&request)).await?;

            if page.is_empty() {
                log::info!(
                    "{}: exhausted after {} pages ({} records)",
                    describe(&state.query),
                    state.cursor.pages,
                    state.cursor.offset
                );
                state.exhausted = true;
                continue;
            }

            let raw_len = page.len();
            let emitted = absorb_page(page, &mut state)?;
            state.cursor.advance(raw_len);

            log::info!(
                "{}: page {} with {} records, {} rows emitted, next from={}",
                describe(&state.query),
                state.cursor.pages,
                raw_len,
                emitted,
                state.cursor.offset
            );
        }
    }
}

/// Sort a page by id (descending), drop ids already in the window and queue
/// the transformed output. Returns the number of rows queued.
fn absorb_page<T, O>(page: Page, state: &mut FetchState<T, O>) -> Result<usize, FetchError>
where
    T: Fn(RawRecord) -> Result<Vec<O>, TransformError>,
{
    let mut entries = page
        .into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<i64>()
                .map(|id| (id, value))
                .map_err(|_| FetchError::InvalidRecordId(key))
        })
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    let before = state.pending.len();
    for (id, value) in entries {
        if state.cache.contains(id) {
            log::debug!("{}: skipping duplicate id {}", describe(&state.query), id);
            continue;
        }
        state.cache.insert(id);

        let Value::Object(mut record) = value else {
            return Err(FetchError::InvalidRecord(id));
        };
        record.insert("id".to_string(), Value::from(id));

        state.pending.extend((state.transform)(record)?);
    }

    Ok(state.pending.len() - before)
}

fn describe(query: &HistoryQuery) -> String {
    match query {
        HistoryQuery::Trades { currency_pair } => format!("trades[{}]", currency_pair),
        HistoryQuery::Positions(PositionType::Margin) => "positions[margin]".to_string(),
        HistoryQuery::Positions(PositionType::Futures { group_id }) => {
            format!("positions[futures/{}]", group_id)
        }
        HistoryQuery::Deposits { currency } => format!("deposits[{}]", currency),
        HistoryQuery::Withdrawals { currency } => format!("withdrawals[{}]", currency),
    }
}
