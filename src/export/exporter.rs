use futures::stream::{self, LocalBoxStream, StreamExt};

use crate::api::{ApiError, HistoryQuery, HistorySource, MarketCatalog, PositionType};
use crate::config::ExportConfig;
use crate::history::{FetchError, HistoryFetcher, RetryPolicy};
use crate::models::OutputRecord;

use super::kind::ExportKind;
use super::transform;

/// Rows of one export, in output order
pub type RecordStream<'a> = LocalBoxStream<'a, Result<OutputRecord, FetchError>>;

/// Runs one export kind across every pair, group or currency it covers,
/// one history fetch at a time.
pub struct Exporter<C> {
    client: C,
    fetcher: HistoryFetcher,
    config: ExportConfig,
}

impl<C> Exporter<C>
where
    C: HistorySource + MarketCatalog,
{
    pub fn new(client: C, config: ExportConfig) -> Self {
        let retry = RetryPolicy::new(config.wait_interval).with_max_retries(config.max_retries);
        let fetcher = HistoryFetcher::new(config.limit, config.cache_limit, retry);

        Self {
            client,
            fetcher,
            config,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Resolve what `kind` covers and return the lazy row stream. Listing
    /// failures surface here; history failures surface from the stream.
    pub async fn export(&self, kind: ExportKind) -> Result<RecordStream<'_>, ApiError> {
        log::info!("Exporting {} history", kind);

        match kind {
            ExportKind::Spot => self.export_spot().await,
            ExportKind::Margin => Ok(self.export_margin()),
            ExportKind::Future => self.export_future().await,
            ExportKind::Deposit => self.export_deposit().await,
            ExportKind::Withdrawal => self.export_withdrawal().await,
        }
    }

    async fn export_spot(&self) -> Result<RecordStream<'_>, ApiError> {
        let mut pairs = self.client.currency_pairs().await?;
        pairs.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!("Found {} currency pairs", pairs.len());

        Ok(stream::iter(pairs)
            .map(move |pair| {
                let query = HistoryQuery::Trades {
                    currency_pair: pair.currency_pair,
                };
                self.fetcher.fetch(&self.client, query, transform::spot_trade)
            })
            .flatten()
            .boxed_local())
    }

    fn export_margin(&self) -> RecordStream<'_> {
        self.fetcher
            .fetch(
                &self.client,
                HistoryQuery::Positions(PositionType::Margin),
                transform::position,
            )
            .boxed_local()
    }

    async fn export_future(&self) -> Result<RecordStream<'_>, ApiError> {
        let mut group_ids: Vec<u64> = self
            .client
            .futures_groups()
            .await?
            .into_iter()
            .map(|group| group.id)
            .collect();
        group_ids.sort_unstable();
        log::info!("Found {} futures groups", group_ids.len());

        Ok(stream::iter(group_ids)
            .map(move |group_id| {
                let query = HistoryQuery::Positions(PositionType::Futures { group_id });
                self.fetcher.fetch(&self.client, query, transform::position)
            })
            .flatten()
            .boxed_local())
    }

    async fn export_deposit(&self) -> Result<RecordStream<'_>, ApiError> {
        let currencies = self.selected_currencies().await?;

        Ok(stream::iter(currencies)
            .map(move |currency| {
                let query = HistoryQuery::Deposits {
                    currency: currency.clone(),
                };
                self.fetcher
                    .fetch(&self.client, query, move |raw| transform::deposit(&currency, raw))
            })
            .flatten()
            .boxed_local())
    }

    async fn export_withdrawal(&self) -> Result<RecordStream<'_>, ApiError> {
        let currencies = self.selected_currencies().await?;

        Ok(stream::iter(currencies)
            .map(move |currency| {
                let query = HistoryQuery::Withdrawals {
                    currency: currency.clone(),
                };
                self.fetcher
                    .fetch(&self.client, query, move |raw| transform::withdrawal(&currency, raw))
            })
            .flatten()
            .boxed_local())
    }

    /// Listed currency names, sorted, narrowed by `--currencies`
    async fn selected_currencies(&self) -> Result<Vec<String>, ApiError> {
        let mut currencies: Vec<String> = self
            .client
            .currencies()
            .await?
            .into_iter()
            .map(|currency| currency.name)
            .filter(|name| self.config.includes_currency(name))
            .collect();
        currencies.sort();
        log::info!("Exporting {} currencies", currencies.len());

        Ok(currencies)
    }
}
