use axum::{extract::Request, middleware::Next, response::Response};

/// Header carrying the caller identity set by the upstream gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, present in request extensions when the gateway
/// forwarded an identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Turns a non-blank `x-user-id` header into an [`AuthUser`] extension.
/// Requests without one pass through unauthenticated.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| AuthUser(id.to_string()));

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}
