//! Request extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use site_core::RequestMeta;

use crate::response::ApiError;
use crate::state::AppState;

/// Proof that the request carried valid admin credentials (or that admin
/// endpoints are open because no token is configured).
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.admin.verify(&parts.headers)?;
        Ok(AdminGuard)
    }
}

/// First address in `X-Forwarded-For`, else `X-Real-IP`.
pub fn client_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("X-Forwarded-For").and_then(|h| h.to_str().ok()) {
        if let Some(ip) = xff.split(',').next().map(str::trim).filter(|ip| !ip.is_empty()) {
            return Some(ip.to_string());
        }
    }

    headers
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// User agent, client IP and country header of the request.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub RequestMeta);

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };

        Ok(ClientMeta(RequestMeta {
            user_agent: text(header::USER_AGENT.as_str()),
            ip_address: client_ip_from_headers(headers),
            country: text("CF-IPCountry").or_else(|| text("X-Country")),
        }))
    }
}
