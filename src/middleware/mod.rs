//! HTTP middleware

pub mod auth;
pub mod host_routing;
pub mod rate_limit;
pub mod security_headers;

pub use auth::{
    auth_middleware, optional_auth_middleware, staff_middleware, AuthError, AuthUser, Claims,
};
pub use host_routing::host_routing_middleware;
pub use rate_limit::{
    api_rate_limit_config, rate_limit_middleware, spawn_rate_limit_cleanup,
    submission_rate_limit_config, RateLimitConfig, RateLimitState,
};
pub use security_headers::{api_cache_control_middleware, security_headers_middleware};
