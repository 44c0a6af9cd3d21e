//! In-memory store.
//!
//! Mirrors the MySQL store's semantics (catalog numbering, all-or-nothing
//! reorder, unique newsletter emails, badge sets) behind one mutex. Used by the
//! `memory` backend and by the integration tests.

use crate::traits::{
    AnalyticsStore, ContentStore, GamificationStore, ProductStore, SettingsStore, Store,
    WebhookStore,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use site_core::{
    sort_catalog, BadgeAward, Banner, BlogPost, ClickEvent, CountEntry, DailyCount, DealRequest,
    DeleteTarget, Error, GamificationUser, MiningTask, NewsletterSubscription, OrderUpdate,
    Pageview, Product, ProductClicks, ProductFields, ProductInput, PurchaseRequest, RawSettings,
    ResourceKind, Result, SectionWrite, SubmissionStatus, SubscribeOutcome, Testimonial, Visit,
    VisitDimension, VoucherSubmission, WebhookLog, CURRENT_SCHEMA_VERSION,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct GamificationRow {
    points: i64,
    badges: BTreeSet<String>,
    updated_at: DateTime<Utc>,
}

impl GamificationRow {
    fn to_user(&self, user_id: &str) -> GamificationUser {
        GamificationUser {
            user_id: user_id.to_string(),
            points: self.points,
            badges: self.badges.iter().cloned().collect(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    settings: Option<RawSettings>,
    testimonials: Vec<Testimonial>,
    vouchers: Vec<VoucherSubmission>,
    deal_requests: Vec<DealRequest>,
    newsletter: Vec<NewsletterSubscription>,
    purchase_requests: Vec<PurchaseRequest>,
    blog_posts: Vec<BlogPost>,
    mining_tasks: Vec<MiningTask>,
    banners: Vec<Banner>,
    click_events: Vec<ClickEvent>,
    visits: Vec<Visit>,
    pageviews: Vec<Pageview>,
    gamification: HashMap<String, GamificationRow>,
    webhook_logs: Vec<WebhookLog>,
}

/// Store that keeps every table in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    /// Simulate storage failures if set.
    should_fail: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::database("simulated storage failure"));
        }
        Ok(())
    }

    // === Seeding (tables with no write path through the API) ===

    /// Replace the settings row as stored, bypassing validation.
    pub fn seed_raw_settings(&self, raw: RawSettings) {
        self.tables.lock().settings = Some(raw);
    }

    pub fn seed_blog_post(&self, post: BlogPost) {
        self.tables.lock().blog_posts.push(post);
    }

    pub fn seed_mining_task(&self, task: MiningTask) {
        self.tables.lock().mining_tasks.push(task);
    }

    pub fn seed_banner(&self, banner: Banner) {
        self.tables.lock().banners.push(banner);
    }

    // === Inspection ===

    pub fn raw_settings(&self) -> Option<RawSettings> {
        self.tables.lock().settings.clone()
    }

    pub fn vouchers(&self) -> Vec<VoucherSubmission> {
        self.tables.lock().vouchers.clone()
    }

    pub fn deal_requests(&self) -> Vec<DealRequest> {
        self.tables.lock().deal_requests.clone()
    }

    pub fn newsletter_subscriptions(&self) -> Vec<NewsletterSubscription> {
        self.tables.lock().newsletter.clone()
    }

    pub fn click_events(&self) -> Vec<ClickEvent> {
        self.tables.lock().click_events.clone()
    }

    pub fn visits(&self) -> Vec<Visit> {
        self.tables.lock().visits.clone()
    }

    pub fn pageviews(&self) -> Vec<Pageview> {
        self.tables.lock().pageviews.clone()
    }

    pub fn webhook_logs(&self) -> Vec<WebhookLog> {
        self.tables.lock().webhook_logs.clone()
    }
}

fn remove_by_id<T>(rows: &mut Vec<T>, id: &str, id_of: impl Fn(&T) -> &str) -> bool {
    let before = rows.len();
    rows.retain(|row| id_of(row) != id);
    rows.len() != before
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list_catalog(&self) -> Result<Vec<Product>> {
        self.check()?;
        let mut products = self.tables.lock().products.clone();
        sort_catalog(&mut products);
        Ok(products)
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        self.check()?;
        Ok(self.tables.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, fields: ProductFields) -> Result<Product> {
        self.check()?;
        let mut tables = self.tables.lock();
        let max = tables
            .products
            .iter()
            .map(|p| p.catalog_number)
            .max()
            .unwrap_or(0);

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            catalog_number: max + 1,
            fields,
            clicks: 0,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Option<Product>> {
        self.check()?;
        let mut tables = self.tables.lock();
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.fields = input.merge_into(&product.fields)?;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn reorder_catalog(&self, updates: &[OrderUpdate]) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.lock();

        let known: HashSet<&str> = tables.products.iter().map(|p| p.id.as_str()).collect();
        if let Some(missing) = updates.iter().find(|u| !known.contains(u.id.as_str())) {
            return Err(Error::not_found(format!("product {}", missing.id)));
        }

        let now = Utc::now();
        let orders: HashMap<&str, i64> = updates
            .iter()
            .map(|u| (u.id.as_str(), u.display_order))
            .collect();
        for product in tables.products.iter_mut() {
            if let Some(&order) = orders.get(product.id.as_str()) {
                product.fields.display_order = order;
                product.updated_at = now;
            }
        }
        Ok(())
    }

    async fn record_click(&self, event: &ClickEvent) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock();
        let Some(product) = tables.products.iter_mut().find(|p| p.id == event.product_id) else {
            return Ok(false);
        };
        product.clicks += 1;
        tables.click_events.push(event.clone());
        Ok(true)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_settings(&self) -> Result<Option<RawSettings>> {
        self.check()?;
        Ok(self.tables.lock().settings.clone())
    }

    async fn save_settings(&self, writes: &[SectionWrite]) -> Result<()> {
        self.check()?;
        let mut tables = self.tables.lock();
        let row = tables.settings.get_or_insert_with(|| RawSettings {
            schema_version: CURRENT_SCHEMA_VERSION,
            columns: BTreeMap::new(),
        });
        row.schema_version = CURRENT_SCHEMA_VERSION;
        for write in writes {
            row.columns.insert(write.section, write.json.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_testimonial(&self, testimonial: &Testimonial) -> Result<()> {
        self.check()?;
        self.tables.lock().testimonials.push(testimonial.clone());
        Ok(())
    }

    async fn update_testimonial(&self, testimonial: &Testimonial) -> Result<bool> {
        self.check()?;
        let mut tables = self.tables.lock();
        match tables.testimonials.iter_mut().find(|t| t.id == testimonial.id) {
            Some(existing) => {
                *existing = Testimonial {
                    created_at: existing.created_at,
                    ..testimonial.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_testimonial(&self, id: &str) -> Result<Option<Testimonial>> {
        self.check()?;
        Ok(self.tables.lock().testimonials.iter().find(|t| t.id == id).cloned())
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        self.check()?;
        let mut rows: Vec<Testimonial> = self
            .tables
            .lock()
            .testimonials
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_voucher(&self, voucher: &VoucherSubmission) -> Result<()> {
        self.check()?;
        self.tables.lock().vouchers.push(voucher.clone());
        Ok(())
    }

    async fn insert_deal_request(&self, request: &DealRequest) -> Result<()> {
        self.check()?;
        self.tables.lock().deal_requests.push(request.clone());
        Ok(())
    }

    async fn subscribe_newsletter(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubscribeOutcome> {
        self.check()?;
        let mut tables = self.tables.lock();
        if tables.newsletter.iter().any(|s| s.email == subscription.email) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        tables.newsletter.push(subscription.clone());
        Ok(SubscribeOutcome::Subscribed(subscription.clone()))
    }

    async fn insert_purchase_request(&self, request: &PurchaseRequest) -> Result<()> {
        self.check()?;
        self.tables.lock().purchase_requests.push(request.clone());
        Ok(())
    }

    async fn list_purchase_requests(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<PurchaseRequest>> {
        self.check()?;
        let mut rows: Vec<PurchaseRequest> = self
            .tables
            .lock()
            .purchase_requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_purchase_request_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<Option<PurchaseRequest>> {
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tables
            .purchase_requests
            .iter_mut()
            .find(|r| r.id == id)
            .map(|request| {
                request.status = status;
                request.updated_at = Utc::now();
                request.clone()
            }))
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>> {
        self.check()?;
        let mut posts: Vec<BlogPost> = self
            .tables
            .lock()
            .blog_posts
            .iter()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.published_at.unwrap_or(p.created_at)));
        Ok(posts)
    }

    async fn list_mining_tasks(&self) -> Result<Vec<MiningTask>> {
        self.check()?;
        let mut tasks: Vec<MiningTask> = self
            .tables
            .lock()
            .mining_tasks
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.display_order, t.created_at));
        Ok(tasks)
    }

    async fn list_banners(&self) -> Result<Vec<Banner>> {
        self.check()?;
        let mut banners: Vec<Banner> = self
            .tables
            .lock()
            .banners
            .iter()
            .filter(|b| b.is_active)
            .cloned()
            .collect();
        banners.sort_by_key(|b| (b.display_order, b.created_at));
        Ok(banners)
    }

    async fn delete_item(&self, target: &DeleteTarget) -> Result<bool> {
        self.check()?;
        let mut t = self.tables.lock();
        let id = target.id.as_str();
        Ok(match target.kind {
            ResourceKind::Products => remove_by_id(&mut t.products, id, |r| r.id.as_str()),
            ResourceKind::Testimonials => remove_by_id(&mut t.testimonials, id, |r| r.id.as_str()),
            ResourceKind::VoucherSubmissions => remove_by_id(&mut t.vouchers, id, |r| r.id.as_str()),
            ResourceKind::DealRequests => remove_by_id(&mut t.deal_requests, id, |r| r.id.as_str()),
            ResourceKind::NewsletterSubscriptions => {
                remove_by_id(&mut t.newsletter, id, |r| r.id.as_str())
            }
            ResourceKind::PurchaseRequests => {
                remove_by_id(&mut t.purchase_requests, id, |r| r.id.as_str())
            }
            ResourceKind::BlogPosts => remove_by_id(&mut t.blog_posts, id, |r| r.id.as_str()),
            ResourceKind::MiningTasks => remove_by_id(&mut t.mining_tasks, id, |r| r.id.as_str()),
            ResourceKind::Banners => remove_by_id(&mut t.banners, id, |r| r.id.as_str()),
        })
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    async fn record_visit(&self, visit: &Visit) -> Result<()> {
        self.check()?;
        self.tables.lock().visits.push(visit.clone());
        Ok(())
    }

    async fn record_pageview(&self, pageview: &Pageview) -> Result<()> {
        self.check()?;
        self.tables.lock().pageviews.push(pageview.clone());
        Ok(())
    }

    async fn count_visits_since(&self, since: Option<DateTime<Utc>>) -> Result<i64> {
        self.check()?;
        let tables = self.tables.lock();
        let count = tables
            .visits
            .iter()
            .filter(|v| since.map_or(true, |s| v.visited_at >= s))
            .count();
        Ok(count as i64)
    }

    async fn count_sessions_since(&self, since: DateTime<Utc>) -> Result<i64> {
        self.check()?;
        let tables = self.tables.lock();
        let sessions: HashSet<&str> = tables
            .visits
            .iter()
            .filter(|v| v.visited_at >= since)
            .map(|v| v.session_id.as_str())
            .collect();
        Ok(sessions.len() as i64)
    }

    async fn count_pageviews(&self) -> Result<i64> {
        self.check()?;
        Ok(self.tables.lock().pageviews.len() as i64)
    }

    async fn count_clicks(&self) -> Result<i64> {
        self.check()?;
        Ok(self.tables.lock().click_events.len() as i64)
    }

    async fn top_values(
        &self,
        dimension: VisitDimension,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CountEntry>> {
        self.check()?;
        let tables = self.tables.lock();
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for visit in tables.visits.iter().filter(|v| v.visited_at >= since) {
            *counts.entry(dimension.value_of(visit)).or_default() += 1;
        }

        let mut entries: Vec<CountEntry> = counts
            .into_iter()
            .map(|(label, count)| CountEntry {
                label: label.to_string(),
                count,
            })
            .collect();
        // Ties resolved by label, like ORDER BY count DESC, label ASC.
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn daily_counts(&self, since: DateTime<Utc>) -> Result<Vec<DailyCount>> {
        self.check()?;
        let tables = self.tables.lock();
        let mut by_day: BTreeMap<NaiveDate, DailyCount> = BTreeMap::new();

        for visit in tables.visits.iter().filter(|v| v.visited_at >= since) {
            let date = visit.visited_at.date_naive();
            by_day
                .entry(date)
                .or_insert_with(|| DailyCount {
                    date,
                    visitors: 0,
                    pageviews: 0,
                })
                .visitors += 1;
        }
        for pageview in tables.pageviews.iter().filter(|p| p.visited_at >= since) {
            let date = pageview.visited_at.date_naive();
            by_day
                .entry(date)
                .or_insert_with(|| DailyCount {
                    date,
                    visitors: 0,
                    pageviews: 0,
                })
                .pageviews += 1;
        }
        Ok(by_day.into_values().collect())
    }

    async fn top_products_by_clicks(&self, limit: usize) -> Result<Vec<ProductClicks>> {
        self.check()?;
        let tables = self.tables.lock();
        let mut products: Vec<&Product> =
            tables.products.iter().filter(|p| p.clicks > 0).collect();
        products.sort_by(|a, b| {
            b.clicks
                .cmp(&a.clicks)
                .then_with(|| b.catalog_number.cmp(&a.catalog_number))
        });
        Ok(products
            .into_iter()
            .take(limit)
            .map(|p| ProductClicks {
                id: p.id.clone(),
                name: p.fields.name.clone(),
                clicks: p.clicks,
            })
            .collect())
    }
}

#[async_trait]
impl GamificationStore for MemoryStore {
    async fn award_points(&self, user_id: &str, points: i64) -> Result<GamificationUser> {
        self.check()?;
        let mut tables = self.tables.lock();
        let now = Utc::now();
        let row = tables
            .gamification
            .entry(user_id.to_string())
            .or_insert_with(|| GamificationRow {
                points: 0,
                badges: BTreeSet::new(),
                updated_at: now,
            });
        row.points += points;
        row.updated_at = now;
        Ok(row.to_user(user_id))
    }

    async fn award_badge(&self, user_id: &str, badge: &str) -> Result<BadgeAward> {
        self.check()?;
        let mut tables = self.tables.lock();
        let now = Utc::now();
        let row = tables
            .gamification
            .entry(user_id.to_string())
            .or_insert_with(|| GamificationRow {
                points: 0,
                badges: BTreeSet::new(),
                updated_at: now,
            });
        let newly_awarded = row.badges.insert(badge.to_string());
        row.updated_at = now;
        Ok(BadgeAward {
            user: row.to_user(user_id),
            newly_awarded,
        })
    }

    async fn get_gamification_user(&self, user_id: &str) -> Result<Option<GamificationUser>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .gamification
            .get(user_id)
            .map(|row| row.to_user(user_id)))
    }
}

#[async_trait]
impl WebhookStore for MemoryStore {
    async fn log_webhook(&self, log: &WebhookLog) -> Result<()> {
        self.check()?;
        self.tables.lock().webhook_logs.push(log.clone());
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.check()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
