use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-200 response from the exchange. The message text is matched by the
    /// retry classifier, so keep the "return status code is N" wording.
    #[error("return status code is {0}")]
    HttpStatus(u16),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Invalid API response: {0}")]
    ParseError(String),

    #[error("Exchange API error: {0}")]
    ExchangeError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ParseError(err.to_string())
    }
}
