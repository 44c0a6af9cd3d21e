use super::{db_err, is_unique_violation, MySqlStore};
use crate::traits::ContentStore;
use async_trait::async_trait;
use chrono::Utc;
use site_core::{
    Banner, BlogPost, DealRequest, DeleteTarget, Error, MiningTask, NewsletterSubscription,
    PurchaseRequest, ResourceKind, Result, SubmissionStatus, SubscribeOutcome, Testimonial,
    VoucherSubmission,
};
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use tracing::{debug, info};

const TESTIMONIAL_COLUMNS: &str =
    "id, name, role, company, content, rating, avatar, is_active, created_at";

const PURCHASE_REQUEST_COLUMNS: &str = "id, product_id, product_name, name, email, phone, \
    whatsapp, company, domain, billing_period, message, status, created_at, updated_at";

fn testimonial_from_row(row: &MySqlRow) -> sqlx::Result<Testimonial> {
    Ok(Testimonial {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        role: row.try_get("role")?,
        company: row.try_get("company")?,
        content: row.try_get("content")?,
        rating: row.try_get("rating")?,
        avatar: row.try_get("avatar")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn purchase_request_from_row(row: &MySqlRow) -> Result<PurchaseRequest> {
    let status: String = row.try_get("status").map_err(db_err)?;
    Ok(PurchaseRequest {
        id: row.try_get("id").map_err(db_err)?,
        product_id: row.try_get("product_id").map_err(db_err)?,
        product_name: row.try_get("product_name").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        phone: row.try_get("phone").map_err(db_err)?,
        whatsapp: row.try_get("whatsapp").map_err(db_err)?,
        company: row.try_get("company").map_err(db_err)?,
        domain: row.try_get("domain").map_err(db_err)?,
        billing_period: row.try_get("billing_period").map_err(db_err)?,
        message: row.try_get("message").map_err(db_err)?,
        status: SubmissionStatus::parse(&status)
            .map_err(|_| Error::database(format!("unknown stored status: {}", status)))?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn blog_post_from_row(row: &MySqlRow) -> sqlx::Result<BlogPost> {
    Ok(BlogPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        excerpt: row.try_get("excerpt")?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        author: row.try_get("author")?,
        is_published: row.try_get("is_published")?,
        published_at: row.try_get("published_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn mining_task_from_row(row: &MySqlRow) -> sqlx::Result<MiningTask> {
    Ok(MiningTask {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        points: row.try_get("points")?,
        task_url: row.try_get("task_url")?,
        is_active: row.try_get("is_active")?,
        display_order: row.try_get("display_order")?,
        created_at: row.try_get("created_at")?,
    })
}

fn banner_from_row(row: &MySqlRow) -> sqlx::Result<Banner> {
    Ok(Banner {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        image: row.try_get("image")?,
        link_url: row.try_get("link_url")?,
        position: row.try_get("position")?,
        is_active: row.try_get("is_active")?,
        display_order: row.try_get("display_order")?,
        created_at: row.try_get("created_at")?,
    })
}

/// One fixed statement per deletable kind.
fn delete_statement(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Products => "DELETE FROM products WHERE id = ?",
        ResourceKind::Testimonials => "DELETE FROM testimonials WHERE id = ?",
        ResourceKind::VoucherSubmissions => "DELETE FROM voucher_submissions WHERE id = ?",
        ResourceKind::DealRequests => "DELETE FROM deal_requests WHERE id = ?",
        ResourceKind::NewsletterSubscriptions => {
            "DELETE FROM newsletter_subscriptions WHERE id = ?"
        }
        ResourceKind::PurchaseRequests => "DELETE FROM purchase_requests WHERE id = ?",
        ResourceKind::BlogPosts => "DELETE FROM blog_posts WHERE id = ?",
        ResourceKind::MiningTasks => "DELETE FROM mining_tasks WHERE id = ?",
        ResourceKind::Banners => "DELETE FROM banners WHERE id = ?",
    }
}

#[async_trait]
impl ContentStore for MySqlStore {
    async fn insert_testimonial(&self, t: &Testimonial) -> Result<()> {
        sqlx::query(
            "INSERT INTO testimonials (id, name, role, company, content, rating, avatar, \
             is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&t.id)
        .bind(&t.name)
        .bind(&t.role)
        .bind(&t.company)
        .bind(&t.content)
        .bind(t.rating)
        .bind(&t.avatar)
        .bind(t.is_active)
        .bind(t.created_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_testimonial(&self, t: &Testimonial) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE testimonials SET name = ?, role = ?, company = ?, content = ?, rating = ?, \
             avatar = ?, is_active = ? WHERE id = ?",
        )
        .bind(&t.name)
        .bind(&t.role)
        .bind(&t.company)
        .bind(&t.content)
        .bind(t.rating)
        .bind(&t.avatar)
        .bind(t.is_active)
        .bind(&t.id)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_testimonial(&self, id: &str) -> Result<Option<Testimonial>> {
        let sql = format!("SELECT {} FROM testimonials WHERE id = ?", TESTIMONIAL_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;
        row.as_ref()
            .map(testimonial_from_row)
            .transpose()
            .map_err(db_err)
    }

    async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        let sql = format!(
            "SELECT {} FROM testimonials WHERE is_active = TRUE ORDER BY created_at DESC",
            TESTIMONIAL_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;
        rows.iter()
            .map(testimonial_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(db_err)
    }

    async fn insert_voucher(&self, v: &VoucherSubmission) -> Result<()> {
        sqlx::query(
            "INSERT INTO voucher_submissions (id, provider, code, description, discount, \
             expires_at, target_url, submitter_email, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&v.id)
        .bind(&v.provider)
        .bind(&v.code)
        .bind(&v.description)
        .bind(&v.discount)
        .bind(&v.expires_at)
        .bind(&v.target_url)
        .bind(&v.submitter_email)
        .bind(v.status.as_str())
        .bind(v.created_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn insert_deal_request(&self, r: &DealRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO deal_requests (id, name, email, provider, product_type, budget, message, \
             status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&r.id)
        .bind(&r.name)
        .bind(&r.email)
        .bind(&r.provider)
        .bind(&r.product_type)
        .bind(&r.budget)
        .bind(&r.message)
        .bind(r.status.as_str())
        .bind(r.created_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn subscribe_newsletter(
        &self,
        subscription: &NewsletterSubscription,
    ) -> Result<SubscribeOutcome> {
        let result = sqlx::query(
            "INSERT INTO newsletter_subscriptions (id, email, source, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&subscription.id)
        .bind(&subscription.email)
        .bind(&subscription.source)
        .bind(subscription.created_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => {
                info!(email = %subscription.email, "Newsletter subscription added");
                Ok(SubscribeOutcome::Subscribed(subscription.clone()))
            }
            Err(e) if is_unique_violation(&e) => {
                debug!(email = %subscription.email, "Email already subscribed");
                Ok(SubscribeOutcome::AlreadySubscribed)
            }
            Err(e) => Err(db_err(e)),
        }
    }

    async fn insert_purchase_request(&self, r: &PurchaseRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO purchase_requests (id, product_id, product_name, name, email, phone, \
             whatsapp, company, domain, billing_period, message, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&r.id)
        .bind(&r.product_id)
        .bind(&r.product_name)
        .bind(&r.name)
        .bind(&r.email)
        .bind(&r.phone)
        .bind(&r.whatsapp)
        .bind(&r.company)
        .bind(&r.domain)
        .bind(&r.billing_period)
        .bind(&r.message)
        .bind(r.status.as_str())
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_purchase_requests(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<PurchaseRequest>> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM purchase_requests WHERE status = ? ORDER BY created_at DESC",
                    PURCHASE_REQUEST_COLUMNS
                );
                sqlx::query(&sql)
                    .bind(status.as_str())
                    .fetch_all(self.pool())
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM purchase_requests ORDER BY created_at DESC",
                    PURCHASE_REQUEST_COLUMNS
                );
                sqlx::query(&sql).fetch_all(self.pool()).await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(purchase_request_from_row).collect()
    }

    async fn update_purchase_request_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<Option<PurchaseRequest>> {
        sqlx::query("UPDATE purchase_requests SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;

        let sql = format!(
            "SELECT {} FROM purchase_requests WHERE id = ?",
            PURCHASE_REQUEST_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;
        row.as_ref().map(purchase_request_from_row).transpose()
    }

    async fn list_blog_posts(&self) -> Result<Vec<BlogPost>> {
        let rows = sqlx::query(
            "SELECT id, title, slug, excerpt, content, image, author, is_published, \
             published_at, created_at FROM blog_posts WHERE is_published = TRUE \
             ORDER BY COALESCE(published_at, created_at) DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;
        rows.iter()
            .map(blog_post_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(db_err)
    }

    async fn list_mining_tasks(&self) -> Result<Vec<MiningTask>> {
        let rows = sqlx::query(
            "SELECT id, title, description, points, task_url, is_active, display_order, \
             created_at FROM mining_tasks WHERE is_active = TRUE \
             ORDER BY display_order ASC, created_at ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;
        rows.iter()
            .map(mining_task_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(db_err)
    }

    async fn list_banners(&self) -> Result<Vec<Banner>> {
        let rows = sqlx::query(
            "SELECT id, title, image, link_url, position, is_active, display_order, created_at \
             FROM banners WHERE is_active = TRUE ORDER BY display_order ASC, created_at ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(db_err)?;
        rows.iter()
            .map(banner_from_row)
            .collect::<sqlx::Result<_>>()
            .map_err(db_err)
    }

    async fn delete_item(&self, target: &DeleteTarget) -> Result<bool> {
        let result = sqlx::query(delete_statement(target.kind))
            .bind(&target.id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;

        let deleted = result.rows_affected() > 0;
        info!(kind = ?target.kind, id = %target.id, deleted, "Delete item");
        Ok(deleted)
    }
}
