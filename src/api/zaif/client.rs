use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::Sha512;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::api::{
    client::{
        Currency, CurrencyPair, FuturesGroup, HistoryQuery, HistorySource, MarketCatalog, Page,
        PageRequest, PositionType, RateLimitConfig,
    },
    error::ApiError,
    rate_limiter::RateLimiter,
};

use super::types::{payload_to_page, PrivateCall, ZaifResponse};

type HmacSha512 = Hmac<Sha512>;

const TRADE_API_URL: &str = "https://api.zaif.jp/tapi";
const LEVERAGE_API_URL: &str = "https://api.zaif.jp/tlapi";
const PUBLIC_API_URL: &str = "https://api.zaif.jp/api/1";
const FUTURES_PUBLIC_API_URL: &str = "https://api.zaif.jp/fapi/1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ZaifClient {
    api_key: String,
    api_secret: String,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    last_nonce: AtomicU64,
}

impl ZaifClient {
    pub fn new(api_key: String, api_secret: String, requests_per_second: u32) -> Result<Self, ApiError> {
        let rate_limiter = RateLimiter::new(RateLimitConfig {
            requests_per_second,
            burst_size: requests_per_second,
        });

        let http_client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            api_key,
            api_secret,
            http_client,
            rate_limiter,
            last_nonce: AtomicU64::new(0),
        })
    }

    /// Next nonce in microseconds; strictly increasing even within one tick
    fn next_nonce(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let previous = self
            .last_nonce
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    /// Generate HMAC-SHA512 signature of the request body, hex encoded
    fn generate_signature(&self, body: &str) -> Result<String, ApiError> {
        let mut mac = HmacSha512::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| ApiError::AuthenticationError(format!("Invalid API secret: {}", e)))?;
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build authenticated headers for the private APIs
    fn build_headers(&self, signature: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(
            "key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ApiError::AuthenticationError(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(
            "sign",
            HeaderValue::from_str(signature)
                .map_err(|e| ApiError::AuthenticationError(format!("Invalid signature: {}", e)))?,
        );

        Ok(headers)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        self.rate_limiter.acquire().await;

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ApiError::AuthenticationError(
                "Invalid API credentials or permissions".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(map_transport_error)
    }

    /// Signed POST against the trade or leverage API
    async fn call_private(&self, call: &PrivateCall) -> Result<Value, ApiError> {
        let nonce = self.next_nonce();
        let body = encode_body(call, nonce);
        let signature = self.generate_signature(&body)?;
        let headers = self.build_headers(&signature)?;

        log::debug!("POST {} method={}", call.url, call.method);

        let response_text = self
            .send(self.http_client.post(call.url).headers(headers).body(body))
            .await?;

        let response: ZaifResponse = serde_json::from_str(&response_text).map_err(|e| {
            ApiError::ParseError(format!("Failed to parse response: {} - Body: {}", e, response_text))
        })?;

        response.into_result()
    }

    /// Unsigned GET against a public listing endpoint
    async fn call_public<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>, ApiError> {
        log::debug!("GET {}", url);

        let response_text = self.send(self.http_client.get(&url)).await?;
        let payload: Value = serde_json::from_str(&response_text).map_err(|e| {
            ApiError::ParseError(format!("Failed to parse response: {} - Body: {}", e, response_text))
        })?;

        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            return Err(ApiError::ExchangeError(error.to_string()));
        }

        Ok(serde_json::from_value(payload)?)
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::TimeoutError(err.to_string())
    } else {
        ApiError::HttpError(err)
    }
}

/// Map a page request onto the private method that serves it
pub fn private_call(request: &PageRequest) -> PrivateCall {
    let mut params = vec![
        ("from", request.from.to_string()),
        ("count", request.count.to_string()),
    ];

    let (url, method) = match &request.query {
        HistoryQuery::Trades { currency_pair } => {
            params.push(("currency_pair", currency_pair.clone()));
            (TRADE_API_URL, "trade_history")
        }
        HistoryQuery::Positions(PositionType::Margin) => {
            params.push(("type", "margin".to_string()));
            (LEVERAGE_API_URL, "get_positions")
        }
        HistoryQuery::Positions(PositionType::Futures { group_id }) => {
            params.push(("type", "futures".to_string()));
            params.push(("group_id", group_id.to_string()));
            (LEVERAGE_API_URL, "get_positions")
        }
        HistoryQuery::Deposits { currency } => {
            params.push(("currency", currency.clone()));
            (TRADE_API_URL, "deposit_history")
        }
        HistoryQuery::Withdrawals { currency } => {
            params.push(("currency", currency.clone()));
            (TRADE_API_URL, "withdraw_history")
        }
    };

    PrivateCall { url, method, params }
}

/// Form body `method=..&nonce=..&<params>`; nonce is rendered as seconds
fn encode_body(call: &PrivateCall, nonce_micros: u64) -> String {
    let nonce = format!("{}.{:06}", nonce_micros / 1_000_000, nonce_micros % 1_000_000);

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("method", call.method);
    serializer.append_pair("nonce", &nonce);
    for (key, value) in &call.params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[async_trait]
impl HistorySource for ZaifClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page, ApiError> {
        let call = private_call(request);
        let payload = self.call_private(&call).await?;
        payload_to_page(payload)
    }
}

#[async_trait]
impl MarketCatalog for ZaifClient {
    async fn currency_pairs(&self) -> Result<Vec<CurrencyPair>, ApiError> {
        self.call_public(format!("{}/currency_pairs/all", PUBLIC_API_URL)).await
    }

    async fn currencies(&self) -> Result<Vec<Currency>, ApiError> {
        self.call_public(format!("{}/currencies/all", PUBLIC_API_URL)).await
    }

    async fn futures_groups(&self) -> Result<Vec<FuturesGroup>, ApiError> {
        self.call_public(format!("{}/groups/all", FUTURES_PUBLIC_API_URL)).await
    }
}
