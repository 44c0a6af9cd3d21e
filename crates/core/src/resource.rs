//! Deletable resource kinds for `deleteItem`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::ITEM_TYPE_PATTERN;

static ITEM_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ITEM_TYPE_PATTERN).expect("invalid item type pattern"));

/// A resource that `deleteItem` may remove.
///
/// Each kind maps to exactly one table; nothing outside this set can be deleted
/// through the action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Products,
    Testimonials,
    VoucherSubmissions,
    DealRequests,
    NewsletterSubscriptions,
    PurchaseRequests,
    BlogPosts,
    MiningTasks,
    Banners,
}

impl ResourceKind {
    /// Parse a client-supplied item type.
    ///
    /// The value must match `^[a-zA-Z_]+$` and name one of the known kinds
    /// (singular, plural, snake_case or camelCase).
    pub fn parse(item_type: &str) -> Result<Self> {
        if !ITEM_TYPE_REGEX.is_match(item_type) {
            return Err(Error::validation_code(
                ValidationErrorCode::InvalidItemType,
                format!("Invalid item type: {:?}", item_type),
            ));
        }

        let key = item_type.replace('_', "").to_ascii_lowercase();
        let kind = match key.as_str() {
            "product" | "products" | "deal" | "deals" => Self::Products,
            "testimonial" | "testimonials" => Self::Testimonials,
            "voucher" | "vouchers" | "vouchersubmission" | "vouchersubmissions" => {
                Self::VoucherSubmissions
            }
            "dealrequest" | "dealrequests" => Self::DealRequests,
            "newsletter" | "subscriber" | "subscribers" | "newslettersubscription"
            | "newslettersubscriptions" => Self::NewsletterSubscriptions,
            "request" | "requests" | "purchaserequest" | "purchaserequests" => {
                Self::PurchaseRequests
            }
            "post" | "posts" | "blogpost" | "blogposts" => Self::BlogPosts,
            "miningtask" | "miningtasks" => Self::MiningTasks,
            "banner" | "banners" => Self::Banners,
            _ => {
                return Err(Error::validation_code(
                    ValidationErrorCode::InvalidItemType,
                    format!("Item type cannot be deleted: {}", item_type),
                ))
            }
        };
        Ok(kind)
    }

    /// Backing table.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Testimonials => "testimonials",
            Self::VoucherSubmissions => "voucher_submissions",
            Self::DealRequests => "deal_requests",
            Self::NewsletterSubscriptions => "newsletter_subscriptions",
            Self::PurchaseRequests => "purchase_requests",
            Self::BlogPosts => "blog_posts",
            Self::MiningTasks => "mining_tasks",
            Self::Banners => "banners",
        }
    }
}
