use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::{FetchError, Result};

/// Timeout applied when a call sets none (or sets it to zero).
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep between retry attempts when retries are requested without a delay.
pub(crate) const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-call configuration: headers, timeout, retry behavior, host override.
///
/// Built by chaining setters over [`RequestOptions::new`]. Later calls
/// overwrite earlier ones, except [`RequestOptions::header`] which
/// accumulates values per name.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use fetchkit::RequestOptions;
///
/// let opts = RequestOptions::new()
///     .header("X-Request-Id", "abc")
///     .timeout(Duration::from_secs(2))
///     .retry(3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    retry: u32,
    delay: Option<Duration>,
    host: Option<String>,
}

impl RequestOptions {
    /// Creates an empty option set; all defaults apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value. Calling twice with the same name sends both
    /// values, it does not overwrite.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets the per-attempt timeout. Zero counts as unset and falls back to
    /// the 5-second default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many additional attempts to make beyond the first.
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the sleep between retry attempts. Zero counts as unset and falls
    /// back to the 1-second default.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Overrides the `Host` header sent with the request. The connection
    /// target (the URL's host) is unaffected; useful for routing through an
    /// IP while presenting a virtual host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub(crate) fn retry_count(&self) -> u32 {
        self.retry
    }

    pub(crate) fn resolved_timeout(&self) -> Duration {
        match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => DEFAULT_TIMEOUT,
        }
    }

    pub(crate) fn resolved_delay(&self) -> Duration {
        match self.delay {
            Some(delay) if !delay.is_zero() => delay,
            _ => DEFAULT_RETRY_DELAY,
        }
    }

    /// Builds the header map for the outgoing request. Accumulated pairs are
    /// appended in call order; the host override, if any, replaces `Host`.
    pub(crate) fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len() + 1);
        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| FetchError::Header(format!("invalid header name '{key}'")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| FetchError::Header(format!("invalid value for header '{key}'")))?;
            map.append(name, value);
        }
        if let Some(host) = &self.host {
            let value = HeaderValue::from_str(host)
                .map_err(|_| FetchError::Header(format!("invalid host override '{host}'")))?;
            map.insert(header::HOST, value);
        }
        Ok(map)
    }
}
