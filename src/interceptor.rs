//! Interception hooks.
//!
//! Every request passes through one request hook before it is sent and every
//! successful response through one response hook before it is decoded. All
//! failures, from either side, go to the single error handler.

use std::sync::Arc;

use crate::error::HttpError;
use crate::transport::{Request, Response};

/// Transforms an outgoing request descriptor.
pub type RequestInterceptor = Arc<dyn Fn(Request) -> Request + Send + Sync>;

/// Transforms a successful response before its body is decoded.
pub type ResponseInterceptor =
    Arc<dyn Fn(Response<serde_json::Value>) -> Response<serde_json::Value> + Send + Sync>;

/// Receives every request or response failure. The returned error is what
/// the caller sees as the rejected outcome.
pub type ErrorHandler = Arc<dyn Fn(HttpError) -> HttpError + Send + Sync>;

/// Where in the pipeline a failure happened. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Request,
    Response,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Request => "request",
            Stage::Response => "response",
        }
    }
}

pub fn identity_request() -> RequestInterceptor {
    Arc::new(|request| request)
}

pub fn identity_response() -> ResponseInterceptor {
    Arc::new(|response| response)
}

/// Pass-through handler: the caller gets the original error back unchanged.
pub fn pass_through() -> ErrorHandler {
    Arc::new(|error| error)
}
