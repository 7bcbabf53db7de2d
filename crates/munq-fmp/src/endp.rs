//! Financial Modeling Prep endpoints.
//!
//! Each module owns the URL construction and the response schema of one
//! endpoint; the HTTP round trip itself lives in [`crate::client_ext`].
pub mod historical;
pub mod price_change;
pub mod search;
