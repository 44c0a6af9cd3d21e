//! Image proxy request validation and fallback image.

use url::Url;

use crate::error::{Error, Result};
use crate::limits::MAX_URL_LEN;

/// Served when the upstream image cannot be fetched or is not an image.
pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect width="400" height="300" fill="#e5e7eb"/><path d="M150 190l35-45 25 30 20-25 40 40z" fill="#9ca3af"/><circle cx="170" cy="120" r="14" fill="#9ca3af"/></svg>"##;

pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/svg+xml";

/// Parse the `url` query parameter. Only absolute http(s) URLs with a host.
pub fn parse_proxy_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("url is required"));
    }
    if raw.len() > MAX_URL_LEN {
        return Err(Error::validation("url is too long"));
    }

    let url = Url::parse(raw).map_err(|e| Error::validation(format!("invalid url: {}", e)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::validation(format!("unsupported url scheme: {}", other)));
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::validation("url has no host"));
    }
    Ok(url)
}

/// True for `image/*` content types (parameters ignored).
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}
