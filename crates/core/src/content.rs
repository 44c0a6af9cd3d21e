//! Submissions and editorial content.
//!
//! Public forms (vouchers, deal requests, newsletter, purchase requests) and
//! admin-managed content (testimonials, blog posts, mining tasks, banners).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::coerce;
use crate::error::{Error, Result};

/// Review state of a public submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(Error::validation(format!("invalid status: {}", other))),
        }
    }
}

/// Lowercased, trimmed email used for uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// === Testimonials ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub content: String,
    pub rating: Option<i64>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// `saveTestimonial` payload. Insert without `id`, update with one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TestimonialInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "author")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, alias = "position")]
    #[validate(length(max = 255))]
    pub role: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub company: Option<String>,
    #[serde(default, alias = "text", alias = "quote")]
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i64>,
    #[serde(default, alias = "avatarUrl", alias = "image")]
    #[validate(length(max = 2048))]
    pub avatar: Option<String>,
    #[serde(default, alias = "isActive", deserialize_with = "coerce::opt_bool")]
    pub is_active: Option<bool>,
}

impl TestimonialInput {
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Build the stored row. `id` and `created_at` come from the caller.
    pub fn into_testimonial(self, id: String, created_at: DateTime<Utc>) -> Result<Testimonial> {
        self.validate()?;
        let name = trimmed(&self.name).ok_or_else(|| Error::validation("name is required"))?;
        let content =
            trimmed(&self.content).ok_or_else(|| Error::validation("content is required"))?;

        Ok(Testimonial {
            id,
            name,
            role: trimmed(&self.role),
            company: trimmed(&self.company),
            content,
            rating: self.rating,
            avatar: trimmed(&self.avatar),
            is_active: self.is_active.unwrap_or(true),
            created_at,
        })
    }
}

// === Voucher submissions ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherSubmission {
    pub id: String,
    pub provider: String,
    pub code: String,
    pub description: Option<String>,
    pub discount: Option<String>,
    pub expires_at: Option<String>,
    pub target_url: Option<String>,
    pub submitter_email: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VoucherInput {
    #[serde(alias = "providerName")]
    #[validate(length(min = 1, max = 255))]
    pub provider: String,
    #[serde(alias = "voucherCode", alias = "voucher_code")]
    #[validate(length(min = 1, max = 128))]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub discount: Option<String>,
    #[serde(default, alias = "expiresAt", alias = "expiry")]
    #[validate(length(max = 64))]
    pub expires_at: Option<String>,
    #[serde(default, alias = "targetUrl", alias = "url")]
    #[validate(length(max = 2048))]
    pub target_url: Option<String>,
    #[serde(default, alias = "email", alias = "submitterEmail")]
    #[validate(email)]
    pub submitter_email: Option<String>,
}

impl VoucherInput {
    pub fn into_submission(self, id: String, created_at: DateTime<Utc>) -> Result<VoucherSubmission> {
        self.validate()?;
        Ok(VoucherSubmission {
            id,
            provider: self.provider.trim().to_string(),
            code: self.code.trim().to_string(),
            description: trimmed(&self.description),
            discount: trimmed(&self.discount),
            expires_at: trimmed(&self.expires_at),
            target_url: trimmed(&self.target_url),
            submitter_email: self.submitter_email.as_deref().map(normalize_email),
            status: SubmissionStatus::Pending,
            created_at,
        })
    }
}

// === Deal requests ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub provider: Option<String>,
    pub product_type: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DealRequestInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub provider: Option<String>,
    #[serde(default, alias = "type", alias = "productType")]
    #[validate(length(max = 64))]
    pub product_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub budget: Option<String>,
    #[serde(default, alias = "details")]
    #[validate(length(max = 5000))]
    pub message: Option<String>,
}

impl DealRequestInput {
    pub fn into_request(self, id: String, created_at: DateTime<Utc>) -> Result<DealRequest> {
        self.validate()?;
        Ok(DealRequest {
            id,
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            provider: trimmed(&self.provider),
            product_type: trimmed(&self.product_type),
            budget: trimmed(&self.budget),
            message: trimmed(&self.message),
            status: SubmissionStatus::Pending,
            created_at,
        })
    }
}

// === Newsletter ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: String,
    pub email: String,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsletterInput {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub source: Option<String>,
}

impl NewsletterInput {
    pub fn into_subscription(
        self,
        id: String,
        created_at: DateTime<Utc>,
    ) -> Result<NewsletterSubscription> {
        let input = NewsletterInput {
            email: self.email.trim().to_string(),
            source: self.source,
        };
        input.validate()?;
        Ok(NewsletterSubscription {
            id,
            email: normalize_email(&input.email),
            source: trimmed(&input.source),
            created_at,
        })
    }
}

/// Result of a newsletter subscribe attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscribeOutcome {
    Subscribed(NewsletterSubscription),
    AlreadySubscribed,
}

// === Purchase requests ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub company: Option<String>,
    pub domain: Option<String>,
    pub billing_period: Option<String>,
    pub message: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PurchaseRequestInput {
    #[serde(default, alias = "productId")]
    #[validate(length(max = 64))]
    pub product_id: Option<String>,
    #[serde(alias = "productName")]
    #[validate(length(min = 1, max = 255))]
    pub product_name: String,
    #[serde(alias = "fullName", alias = "customerName")]
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub whatsapp: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub company: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub domain: Option<String>,
    #[serde(default, alias = "billingPeriod", alias = "billingCycle")]
    #[validate(length(max = 32))]
    pub billing_period: Option<String>,
    #[serde(default, alias = "notes")]
    #[validate(length(max = 5000))]
    pub message: Option<String>,
}

impl PurchaseRequestInput {
    pub fn into_request(self, id: String, now: DateTime<Utc>) -> Result<PurchaseRequest> {
        self.validate()?;
        Ok(PurchaseRequest {
            id,
            product_id: trimmed(&self.product_id),
            product_name: self.product_name.trim().to_string(),
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: trimmed(&self.phone),
            whatsapp: trimmed(&self.whatsapp),
            company: trimmed(&self.company),
            domain: trimmed(&self.domain),
            billing_period: trimmed(&self.billing_period),
            message: trimmed(&self.message),
            status: SubmissionStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// `request_status` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestStatusUpdate {
    pub id: String,
    pub status: SubmissionStatus,
}

// === Editorial content (read by the public data endpoint) ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub author: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningTask {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub points: i64,
    pub task_url: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub title: Option<String>,
    pub image: String,
    pub link_url: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}
