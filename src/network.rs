//! Network URL constants.

/// Base address used when `API_BASE_URL` is unset.
pub const DEFAULT_API_URL: &str = "https://api.example.com";
