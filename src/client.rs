use std::time::Duration;

use bytes::Bytes;
use reqwest::{Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;

use crate::{query, FetchError, RequestOptions, Result};

/// Upper bound on the response-body excerpt captured into an HTTP error.
const SNIPPET_LIMIT: usize = 1024;

/// Convenience HTTP client.
///
/// Wraps a single `reqwest::Client`; cheap to clone and safe to share across
/// tasks. All per-call behavior lives in [`RequestOptions`], the client itself
/// holds no mutable state.
///
/// # Example
///
/// ```no_run
/// use fetchkit::{Client, RequestOptions};
///
/// # async fn run() -> fetchkit::Result<()> {
/// let client = Client::new()?;
/// let response = client
///     .get("https://api.example/items", &[("page", "2")], RequestOptions::new())
///     .await?;
/// let body = response.text().await.ok();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
}

/// Configures the transport defaults of a [`Client`].
///
/// The defaults mirror a scrappy service-to-service setup: TLS certificate
/// verification is **disabled** and connections are not reused. Both are
/// explicit knobs here so callers can opt into stricter behavior.
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    verify_tls: bool,
    pool_max_idle_per_host: usize,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            verify_tls: false,
            pool_max_idle_per_host: 0,
        }
    }
}

impl ClientBuilder {
    /// Enables or disables TLS certificate verification. Off by default.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Sets how many idle connections per host may be kept for reuse.
    /// Zero (the default) disables connection reuse entirely.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Builds the client, failing if the underlying transport cannot be
    /// initialized.
    pub fn build(self) -> Result<Client> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!self.verify_tls)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Client { http })
    }
}

impl Client {
    /// Creates a client with the default transport configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns a [`ClientBuilder`] for customizing transport defaults.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Wraps a pre-built `reqwest::Client`, keeping whatever transport
    /// configuration it carries.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Sends a GET request.
    pub async fn get(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        opts: RequestOptions,
    ) -> Result<Response> {
        self.execute(Method::GET, addr, queries, None, opts).await
    }

    /// Sends a POST request with a buffered body. An empty body is valid.
    pub async fn post(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        body: impl Into<Bytes>,
        opts: RequestOptions,
    ) -> Result<Response> {
        self.execute(Method::POST, addr, queries, Some(body.into()), opts)
            .await
    }

    /// Sends a PUT request with a buffered body.
    pub async fn put(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        body: impl Into<Bytes>,
        opts: RequestOptions,
    ) -> Result<Response> {
        self.execute(Method::PUT, addr, queries, Some(body.into()), opts)
            .await
    }

    /// Sends a GET request expecting a JSON response.
    ///
    /// Adds `Accept: application/json` and decodes the body into `T`. A
    /// no-content response (204, or a 2xx with an empty body) is success and
    /// yields `None`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        opts: RequestOptions,
    ) -> Result<Option<T>> {
        let opts = opts.header("Accept", "application/json");
        let response = self.execute(Method::GET, addr, queries, None, opts).await?;
        decode_json_body(response).await
    }

    /// Sends a POST request with a JSON body, expecting a JSON response.
    ///
    /// `body = None` sends an empty body without touching the serializer.
    /// The response is decoded like [`Client::get_json`].
    pub async fn post_json<B, T>(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        body: Option<&B>,
        opts: RequestOptions,
    ) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(body) => Bytes::from(serde_json::to_vec(body).map_err(FetchError::Encode)?),
            None => Bytes::new(),
        };
        let opts = opts.header("Content-Type", "application/json; charset=utf-8");
        let response = self
            .execute(Method::POST, addr, queries, Some(payload), opts)
            .await?;
        decode_json_body(response).await
    }

    /// Sends a POST request with a URL-encoded form body.
    pub async fn post_form(
        &self,
        addr: &str,
        queries: &[(&str, &str)],
        form: &[(&str, &str)],
        opts: RequestOptions,
    ) -> Result<Response> {
        let opts = opts.header(
            "Content-Type",
            "application/x-www-form-urlencoded; charset=utf-8",
        );
        let body = Bytes::from(query::encode_form(form));
        self.execute(Method::POST, addr, queries, Some(body), opts)
            .await
    }

    /// Builds and dispatches the request, retrying per the resolved options.
    async fn execute(
        &self,
        method: Method,
        addr: &str,
        queries: &[(&str, &str)],
        body: Option<Bytes>,
        opts: RequestOptions,
    ) -> Result<Response> {
        let url = query::merge_queries(addr, queries)?;
        let headers = opts.header_map()?;
        let timeout = opts.resolved_timeout();
        let retry = opts.retry_count();
        let delay = opts.resolved_delay();

        let mut attempt = 0u32;
        loop {
            // Each attempt rebuilds the request from buffered parts, so a
            // retried send always carries the full body.
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .timeout(timeout);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            match self.fetch(request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if attempt >= retry || !err.is_retryable() {
                        return Err(err);
                    }
                    self.wait_before_retry(attempt, delay, &err).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Performs one attempt and classifies the outcome.
    ///
    /// A 2xx response is returned live and unread; the caller owns it. Any
    /// other status consumes at most [`SNIPPET_LIMIT`] body bytes into an
    /// [`FetchError::Http`].
    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let snippet = body_snippet(response).await;
        Err(FetchError::Http {
            status: status.as_u16(),
            snippet,
        })
    }

    async fn wait_before_retry(&self, attempt: u32, delay: Duration, err: &FetchError) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt = attempt + 1,
            error = %err,
            "retrying request after {:?}",
            delay
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (attempt, err);

        sleep(delay).await;
    }
}

/// Reads up to [`SNIPPET_LIMIT`] bytes of a failed response's body.
/// Read errors are ignored; whatever was gathered so far stands.
async fn body_snippet(mut response: Response) -> String {
    let mut buf = Vec::with_capacity(SNIPPET_LIMIT.min(256));
    while buf.len() < SNIPPET_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(SNIPPET_LIMIT - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Ok(None) | Err(_) => break,
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn decode_json_body<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let body = response.bytes().await.map_err(FetchError::Transport)?;
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(&body).map(Some).map_err(FetchError::Decode)
}
