//! Storage traits.
//!
//! Handlers depend on these rather than on a concrete database so the router
//! can run against MySQL in production and [`crate::MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::{
    BadgeAward, Banner, BlogPost, ClickEvent, CountEntry, DailyCount, DealRequest,
    DeleteTarget, GamificationUser, MiningTask, NewsletterSubscription, OrderUpdate, Pageview,
    Product, ProductClicks, ProductFields, ProductInput, PurchaseRequest, RawSettings, Result,
    SectionWrite, SubmissionStatus, SubscribeOutcome, Testimonial, Visit, VisitDimension,
    VoucherSubmission, WebhookLog,
};

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, sorted `(display_order ASC, catalog_number DESC)`.
    async fn list_catalog(&self) -> Result<Vec<Product>>;

    async fn get_product(&self, id: &str) -> Result<Option<Product>>;

    /// Insert with a fresh `catalog_number` (current maximum + 1).
    async fn insert_product(&self, fields: ProductFields) -> Result<Product>;

    /// Merge `input` into the stored row. `None` when no row has this id.
    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Option<Product>>;

    /// Apply every update or none of them.
    async fn reorder_catalog(&self, updates: &[OrderUpdate]) -> Result<()>;

    /// Store the click and bump the product's counter. `false` if the product
    /// does not exist (nothing is written).
    async fn record_click(&self, event: &ClickEvent) -> Result<bool>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// The singleton row, or `None` if it was never written.
    async fn load_settings(&self) -> Result<Option<RawSettings>>;

    /// Upsert the given columns and stamp the current schema version.
    async fn save_settings(&self, writes: &[SectionWrite]) -> Result<()>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_testimonial(&self, testimonial: &Testimonial) -> Result<()>;
    /// `false` when no row has this id.
    async fn update_testimonial(&self, testimonial: &Testimonial) -> Result<bool>;
    async fn get_testimonial(&self, id: &str) -> Result<Option<Testimonial>>;
    /// Active testimonials, newest first.
    async fn list_testimonials(&self) -> Result<Vec<Testimonial>>;

    async fn insert_voucher(&self, voucher: &VoucherSubmission) -> Result<()>;
    async fn insert_deal_request(&self, request: &DealRequest) -> Result<()>;

    /// Insert unless the (normalized) email is already present.
    async fn subscribe_newsletter(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubscribeOutcome>;

    async fn insert_purchase_request(&self, request: &PurchaseRequest) -> Result<()>;
    /// Newest first, optionally filtered by status.
    async fn list_purchase_requests(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<PurchaseRequest>>;
    async fn update_purchase_request_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<Option<PurchaseRequest>>;

    /// Published posts, newest first.
    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>>;
    /// Active tasks, by display order.
    async fn list_mining_tasks(&self) -> Result<Vec<MiningTask>>;
    /// Active banners, by display order.
    async fn list_banners(&self) -> Result<Vec<Banner>>;

    /// `true` if a row was removed.
    async fn delete_item(&self, target: &DeleteTarget) -> Result<bool>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn record_visit(&self, visit: &Visit) -> Result<()>;
    async fn record_pageview(&self, pageview: &Pageview) -> Result<()>;

    /// Visits at or after `since` (all time when `None`).
    async fn count_visits_since(&self, since: Option<DateTime<Utc>>) -> Result<i64>;
    /// Distinct session ids at or after `since`.
    async fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<i64>;
    async fn count_pageviews(&self) -> Result<i64>;
    async fn count_clicks(&self) -> Result<i64>;

    /// Most frequent values of a visit column since `since`, descending.
    async fn top_values(
        &self,
        dimension: VisitDimension,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CountEntry>>;

    /// Per-day visits and pageviews since `since`; days without data are omitted.
    async fn daily_counts(&self, since: DateTime<Utc>) -> Result<Vec<DailyCount>>;

    async fn top_products_by_clicks(&self, limit: usize) -> Result<Vec<ProductClicks>>;
}

#[async_trait]
pub trait GamificationStore: Send + Sync {
    /// Atomically add `points`, creating the user if needed.
    async fn award_points(&self, user_id: &str, points: i64) -> Result<GamificationUser>;

    /// Set-add a badge, creating the user if needed.
    async fn award_badge(&self, user_id: &str, badge: &str) -> Result<BadgeAward>;

    async fn get_gamification_user(&self, user_id: &str) -> Result<Option<GamificationUser>>;
}

#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn log_webhook(&self, log: &WebhookLog) -> Result<()>;
}

/// Everything the API needs from storage.
#[async_trait]
pub trait Store:
    ProductStore + SettingsStore + ContentStore + AnalyticsStore + GamificationStore + WebhookStore
{
    /// Cheap connectivity check.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
