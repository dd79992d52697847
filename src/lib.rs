//! # api-base
//!
//! A configuration-driven JSON HTTP client with a request/response
//! interception pipeline.
//!
//! ## Architecture
//!
//! 1. **Config** — `ClientConfig`: base address, timeout, default headers
//! 2. **Transport** — the `Transport` seam; `ReqwestTransport` in production
//! 3. **Interceptors** — request hook, response hook, one shared error handler
//! 4. **Client** — `HttpClient` with typed verb methods
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use api_base::prelude::*;
//!
//! let client = create_client(ClientConfig::new("https://api.example.com"))?;
//!
//! let users: Response<Vec<User>> = client.get("/users", None).await?;
//! let created: Response<User> = client.post("/users", Some(&new_user), None).await?;
//!
//! client
//!     .set_error_handler(|err| {
//!         tracing::error!(%err, "API call failed");
//!         err
//!     })
//!     .await;
//! ```

/// Client configuration and environment loading.
pub mod config;

/// Error type shared by every failure path.
pub mod error;

/// Network URL constants.
pub mod network;

/// Transport trait, request/response descriptors, reqwest transport.
pub mod transport;

/// Request/response hooks and the error handler type.
pub mod interceptor;

/// `HttpClient`, its builder, and the default instance.
pub mod client;

pub use client::{create_client, default_client, HttpClient, HttpClientBuilder, RequestOptions};
pub use config::ClientConfig;
pub use error::HttpError;

pub mod prelude {
    pub use crate::client::{
        create_client, default_client, HttpClient, HttpClientBuilder, RequestOptions,
    };
    pub use crate::config::{ClientConfig, DEFAULT_TIMEOUT_MS};
    pub use crate::error::HttpError;
    pub use crate::interceptor::{ErrorHandler, RequestInterceptor, ResponseInterceptor};
    pub use crate::network::DEFAULT_API_URL;
    pub use crate::transport::{RawResponse, Request, ReqwestTransport, Response, Transport};
}
