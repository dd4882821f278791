//! Global token-bucket rate limiting for the provider-backed routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

use crate::config::RateLimitConfig;
use crate::error::{AppError, Result};

pub type RateLimiterHandle = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build the shared limiter from configuration
pub fn build_limiter(config: &RateLimitConfig) -> Result<RateLimiterHandle> {
    let rps = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
        AppError::Internal("rate_limit.requests_per_second must be greater than 0".to_string())
    })?;
    let burst = NonZeroU32::new(config.burst_size).ok_or_else(|| {
        AppError::Internal("rate_limit.burst_size must be greater than 0".to_string())
    })?;

    Ok(Arc::new(RateLimiter::direct(
        Quota::per_second(rps).allow_burst(burst),
    )))
}

pub async fn rate_limit(
    State(limiter): State<RateLimiterHandle>,
    request: Request,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        debug!(path = %request.uri().path(), "Rate limit exceeded");
        return AppError::RateLimited.into_response();
    }
    next.run(request).await
}
