//! Admin token check.

use axum::http::{header, HeaderMap};
use site_core::{Error, Result};

/// Header accepted as an alternative to `Authorization: Bearer`.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Verifies admin credentials on a request.
#[derive(Clone)]
pub struct AdminAuth {
    token: Option<String>,
}

impl AdminAuth {
    /// A blank token counts as unset.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// True when no token is configured and admin endpoints are open.
    pub fn is_open(&self) -> bool {
        self.token.is_none()
    }

    pub fn verify(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = &self.token else {
            return Ok(());
        };

        let presented = bearer_token(headers).or_else(|| {
            headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
        });

        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
            Some(_) => Err(Error::unauthorized("Invalid admin token")),
            None => Err(Error::unauthorized("Admin token required")),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
