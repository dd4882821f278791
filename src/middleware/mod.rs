//! HTTP middleware

pub mod rate_limit;

pub use rate_limit::{build_limiter, rate_limit, RateLimiterHandle};
