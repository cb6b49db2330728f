/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request address could not be parsed as a URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// A configured header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    Header(String),
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with a bounded response body snippet.
    #[error("http response status {status}, message is: {snippet}")]
    Http {
        /// Status code of the response.
        status: u16,
        /// First up-to-1024 bytes of the raw response body.
        snippet: String,
    },
    /// Failure serializing a JSON request body.
    #[error("encode error: {0}")]
    Encode(serde_json::Error),
    /// Failure deserializing a JSON response body.
    #[error("decode error: {0}")]
    Decode(serde_json::Error),
}

impl FetchError {
    /// Whether the error is worth another attempt.
    ///
    /// Server errors (5xx) and transport failures are assumed possibly
    /// transient; client errors (4xx) and everything produced before the
    /// request leaves the process are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { status, .. } => *status >= 500,
            FetchError::Transport(_) => true,
            _ => false,
        }
    }
}
