pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{auth_middleware, AuthUser, USER_ID_HEADER};
pub use rate_limit::{
    rate_limit_middleware, LruRateLimitStore, RateLimitDecision, RateLimitStore, RateLimiter,
};
pub use request_id::{
    make_span_with_request_id, request_id_middleware, RequestId, REQUEST_ID_HEADER,
};
