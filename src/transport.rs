//! Transport seam — the part that actually puts bytes on the wire.
//!
//! `HttpClient` builds a fully resolved [`Request`] (absolute URL, merged
//! headers, timeout, JSON body) and hands it to a [`Transport`]. The transport
//! performs exactly one round-trip and reports the raw status, headers and
//! body text; status interpretation happens in the client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};

use crate::error::HttpError;

/// Outgoing request descriptor, as seen by request interceptors.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Absolute URL, query string included.
    pub url: String,
    pub headers: HeaderMap,
    pub timeout: Duration,
    pub body: Option<serde_json::Value>,
}

/// Unparsed transport response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Successful response with a parsed body.
///
/// Response interceptors see `Response<serde_json::Value>`; verb methods
/// decode `data` into the caller's type afterwards.
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: T,
}

impl Response<serde_json::Value> {
    /// Decode the JSON body into `T`, keeping status and headers.
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> Result<Response<T>, HttpError> {
        Ok(Response {
            status: self.status,
            headers: self.headers,
            data: serde_json::from_value(self.data)?,
        })
    }
}

/// Executes one HTTP round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<RawResponse, HttpError>;
}

/// Production transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose pool-level timeout is `timeout`. Headers and
    /// per-request timeouts still come from each [`Request`].
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, HttpError> {
        let mut req = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);

        if let Some(body) = &request.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
