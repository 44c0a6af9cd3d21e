//! Size limits and patterns shared by handlers.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so string length limits are duplicated there. Keep both in sync when modifying.

// === Upload Limits ===

/// Maximum upload size in bytes (10MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted by the upload endpoint.
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Upload category used when none (or an empty one) is given.
pub const DEFAULT_UPLOAD_CATEGORY: &str = "general";

/// Sanitized upload filename max length (before the timestamp prefix).
pub const MAX_UPLOAD_FILENAME_LEN: usize = 100;

// === Request Limits ===

/// Maximum JSON request body for action endpoints (1MB).
pub const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Maximum items in one catalog reorder request.
pub const MAX_REORDER_ITEMS: usize = 5000;

/// Maximum days covered by the analytics dashboard daily series.
pub const MAX_DASHBOARD_DAYS: u32 = 365;

/// Rows returned by the "top N" analytics aggregates.
pub const DASHBOARD_TOP_N: u32 = 10;

// === Image Proxy ===

/// Maximum proxied image size (15MB).
pub const MAX_PROXY_IMAGE_BYTES: usize = 15 * 1024 * 1024;

/// Cache-Control header for proxied images.
pub const PROXY_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Cache-Control header for the fallback placeholder.
pub const PLACEHOLDER_CACHE_CONTROL: &str = "public, max-age=300";

// === Patterns ===

/// Pattern every `deleteItem` item type must match before it is mapped to a resource kind.
pub const ITEM_TYPE_PATTERN: &str = r"^[a-zA-Z_]+$";

// === String Field Limits (chars) ===

/// Path / URL max length.
pub const MAX_URL_LEN: usize = 2048;

/// User agent string max length.
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Badge identifier max length.
pub const MAX_BADGE_LEN: usize = 64;

/// Gamification user id max length.
pub const MAX_USER_ID_LEN: usize = 128;
