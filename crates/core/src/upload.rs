//! Upload validation and naming.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, UploadErrorCode};
use crate::limits::{
    ALLOWED_IMAGE_MIME_TYPES, DEFAULT_UPLOAD_CATEGORY, MAX_UPLOAD_BYTES, MAX_UPLOAD_FILENAME_LEN,
};

/// Upload acceptance rules.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// Where an accepted file goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPlan {
    pub category: String,
    pub filename: String,
    pub content_type: String,
}

impl UploadPlan {
    /// Public URL under the `/uploads` mount.
    pub fn public_url(&self) -> String {
        format!("/uploads/{}/{}", self.category, self.filename)
    }
}

impl UploadPolicy {
    /// Validate an upload and pick its stored name.
    ///
    /// `token` keeps two uploads of the same name in the same millisecond
    /// apart; only ASCII alphanumerics of it are used.
    pub fn plan(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        size: usize,
        category: Option<&str>,
        timestamp_ms: i64,
        token: &str,
    ) -> Result<UploadPlan> {
        if size > self.max_bytes {
            return Err(Error::upload(
                UploadErrorCode::TooLarge,
                format!(
                    "File size {}KB exceeds {}MB limit",
                    size / 1024,
                    self.max_bytes / (1024 * 1024)
                ),
            ));
        }
        if size == 0 {
            return Err(Error::validation("file is empty"));
        }

        let content_type = normalize_mime(content_type.unwrap_or(""));
        if !ALLOWED_IMAGE_MIME_TYPES.contains(&content_type.as_str()) {
            return Err(Error::upload(
                UploadErrorCode::UnsupportedType,
                format!(
                    "File type {:?} not allowed; expected one of {}",
                    content_type,
                    ALLOWED_IMAGE_MIME_TYPES.join(", ")
                ),
            ));
        }

        let category = sanitize_category(category);
        let stem = sanitize_stem(original_name.unwrap_or("upload"));
        let token: String = token
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let filename = if token.is_empty() {
            format!("{}-{}.{}", timestamp_ms, stem, extension_for(&content_type))
        } else {
            format!(
                "{}-{}-{}.{}",
                timestamp_ms,
                token,
                stem,
                extension_for(&content_type)
            )
        };

        Ok(UploadPlan {
            category,
            filename,
            content_type,
        })
    }
}

fn normalize_mime(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Category directory name: `[a-z0-9_-]`, default `general`.
pub fn sanitize_category(category: Option<&str>) -> String {
    let cleaned: String = category
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(64)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_UPLOAD_CATEGORY.to_string()
    } else {
        cleaned
    }
}

/// Filename stem without extension: lowercase, `[a-z0-9_-]`, other runs become `-`.
fn sanitize_stem(name: &str) -> String {
    // Strip any directory part a client may send.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out: String = out.trim_matches('-').chars().take(MAX_UPLOAD_FILENAME_LEN).collect();
    if out.is_empty() {
        "upload".to_string()
    } else {
        out
    }
}
