//! `HttpClient` — configuration-driven JSON client with an interception
//! pipeline.
//!
//! Every call goes through the same steps:
//!
//! 1. build a [`Request`] (resolve URL, merge headers, pick timeout, encode body)
//! 2. run the request interceptor
//! 3. send through the [`Transport`] exactly once
//! 4. reject non-2xx statuses, parse the body as JSON
//! 5. run the response interceptor, decode into the caller's type
//!
//! A failure in step 1 is a request error; a failure in steps 3-5 is a
//! response error. Both go through the client's single [`ErrorHandler`] and
//! whatever it returns is the error the caller sees. Nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_lock::RwLock;
use lazy_static::lazy_static;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{parse_header, ClientConfig};
use crate::error::HttpError;
use crate::interceptor::{
    identity_request, identity_response, pass_through, ErrorHandler, RequestInterceptor,
    ResponseInterceptor, Stage,
};
use crate::transport::{Request, ReqwestTransport, Response, Transport};

lazy_static! {
    static ref DEFAULT_CLIENT: HttpClient = create_client(ClientConfig::from_env())
        .expect("Failed to build default HTTP client");
}

/// Build a client from a configuration, using the reqwest transport.
pub fn create_client(config: ClientConfig) -> Result<HttpClient, HttpError> {
    HttpClientBuilder::from_config(config).build()
}

/// Process-wide default client, built on first use from `API_BASE_URL` /
/// `API_TIMEOUT_MS`.
pub fn default_client() -> &'static HttpClient {
    &DEFAULT_CLIENT
}

/// Per-call overrides, layered on top of the client's configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; win over the client's default headers on collision.
    pub headers: Vec<(String, String)>,
    /// Query parameters appended to the URL, percent-encoded.
    pub query: Vec<(String, String)>,
    /// Timeout for this call only.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// JSON HTTP client bound to one base address.
///
/// Clones share the transport, interceptors and error-handler slot.
#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    timeout: Duration,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
    on_request: RequestInterceptor,
    on_response: ResponseInterceptor,
    error_handler: Arc<RwLock<ErrorHandler>>,
}

impl HttpClient {
    pub fn builder(base_url: impl Into<String>) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Effective default timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Effective default header set.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Replace the error handler. Applies to every failure routed after this
    /// call returns, from this client and all of its clones.
    pub async fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(HttpError) -> HttpError + Send + Sync + 'static,
    {
        *self.error_handler.write().await = Arc::new(handler);
    }

    // ── Verb methods ─────────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        self.request(Method::GET, url, None::<&()>, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        self.request(Method::POST, url, body, options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        self.request(Method::PUT, url, body, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: Option<&B>,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        self.request(Method::PATCH, url, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        self.request(Method::DELETE, url, None::<&()>, options).await
    }

    /// Run one request through the full pipeline.
    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: Option<RequestOptions>,
    ) -> Result<Response<T>, HttpError> {
        let request = match self.build_request(method, url, body, options.unwrap_or_default()) {
            Ok(request) => (self.on_request)(request),
            Err(e) => return Err(self.reject(Stage::Request, e).await),
        };

        match self.execute(request).await {
            Ok(response) => Ok(response),
            Err(e) => Err(self.reject(Stage::Response, e).await),
        }
    }

    // ── Pipeline internals ───────────────────────────────────────────────

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Request, HttpError> {
        let url = self.resolve_url(url, &options.query)?;

        let mut headers = self.headers.clone();
        for (name, value) in &options.headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        let body = body.map(serde_json::to_value).transpose()?;

        Ok(Request {
            method,
            url,
            headers,
            timeout: options.timeout.unwrap_or(self.timeout),
            body,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<Response<T>, HttpError> {
        tracing::debug!(
            method = %request.method,
            timeout_ms = request.timeout.as_millis() as u64,
            "Sending request to {}",
            request.url
        );

        let raw = self.transport.send(request).await?;
        tracing::debug!(status = raw.status.as_u16(), "Received response");

        if !raw.status.is_success() {
            return Err(HttpError::Status {
                status: raw.status.as_u16(),
                body: raw.body,
            });
        }

        let data = if raw.body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&raw.body)?
        };

        let response = (self.on_response)(Response {
            status: raw.status,
            headers: raw.headers,
            data,
        });
        response.decode()
    }

    /// Route a failure through the handler installed right now.
    async fn reject(&self, stage: Stage, error: HttpError) -> HttpError {
        tracing::warn!(stage = stage.as_str(), error = %error, "Request failed");
        let handler = self.error_handler.read().await.clone();
        handler(error)
    }

    fn resolve_url(&self, url: &str, query: &[(String, String)]) -> Result<String, HttpError> {
        let mut resolved = if is_absolute(url) {
            url.to_string()
        } else if self.base_url.is_empty() {
            return Err(HttpError::InvalidUrl(format!(
                "relative URL '{}' with no base address",
                url
            )));
        } else if url.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        };

        if !query.is_empty() {
            let params: Vec<String> = query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            let sep = if resolved.contains('?') { '&' } else { '?' };
            resolved = format!("{}{}{}", resolved, sep, params.join("&"));
        }

        Ok(resolved)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// `scheme://...` with an RFC 3986 scheme.
fn is_absolute(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    on_request: Option<RequestInterceptor>,
    on_response: Option<ResponseInterceptor>,
    error_handler: Option<ErrorHandler>,
}

impl HttpClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            on_request: None,
            on_response: None,
            error_handler: None,
        }
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = Some(ms);
        self
    }

    /// Add a default header. Overrides `Content-Type: application/json` when
    /// named `Content-Type`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Use a custom transport instead of reqwest.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn on_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(Request) -> Request + Send + Sync + 'static,
    {
        self.on_request = Some(Arc::new(hook));
        self
    }

    pub fn on_response<F>(mut self, hook: F) -> Self
    where
        F: Fn(Response<serde_json::Value>) -> Response<serde_json::Value> + Send + Sync + 'static,
    {
        self.on_response = Some(Arc::new(hook));
        self
    }

    /// Initial error handler. Defaults to passing errors through unchanged.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(HttpError) -> HttpError + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpError> {
        let headers = self.config.header_map()?;
        let timeout = self.config.effective_timeout();

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(timeout)?),
        };

        Ok(HttpClient {
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            timeout,
            headers,
            transport,
            on_request: self.on_request.unwrap_or_else(identity_request),
            on_response: self.on_response.unwrap_or_else(identity_response),
            error_handler: Arc::new(RwLock::new(
                self.error_handler.unwrap_or_else(pass_through),
            )),
        })
    }
}
