use super::{db_err, MySqlStore};
use crate::traits::ProductStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::coerce::{features_to_text, parse_features_text};
use site_core::{ClickEvent, Error, OrderUpdate, Product, ProductFields, ProductInput, Result};
use sqlx::{FromRow, MySql, Transaction};
use tracing::debug;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, catalog_number, name, provider, product_type, tier, price, \
    original_price, discount, features, target_url, image, rating, num_reviews, display_order, \
    is_featured, show_on_landing, show_on_home, clicks, created_at, updated_at";

#[derive(FromRow)]
struct ProductRow {
    id: String,
    catalog_number: i64,
    name: String,
    provider: String,
    product_type: Option<String>,
    tier: Option<String>,
    price: f64,
    original_price: Option<f64>,
    discount: Option<f64>,
    features: Option<String>,
    target_url: Option<String>,
    image: Option<String>,
    rating: Option<f64>,
    num_reviews: i64,
    display_order: i64,
    is_featured: bool,
    show_on_landing: bool,
    show_on_home: bool,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            catalog_number: row.catalog_number,
            fields: ProductFields {
                name: row.name,
                provider: row.provider,
                product_type: row.product_type,
                tier: row.tier,
                price: row.price,
                original_price: row.original_price,
                discount: row.discount,
                features: row
                    .features
                    .as_deref()
                    .map(parse_features_text)
                    .unwrap_or_default(),
                target_url: row.target_url,
                image: row.image,
                rating: row.rating,
                num_reviews: row.num_reviews,
                display_order: row.display_order,
                is_featured: row.is_featured,
                show_on_landing: row.show_on_landing,
                show_on_home: row.show_on_home,
            },
            clicks: row.clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

async fn fetch_for_update(
    tx: &mut Transaction<'_, MySql>,
    id: &str,
) -> Result<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ? FOR UPDATE", PRODUCT_COLUMNS);
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;
    Ok(row.map(Product::from))
}

#[async_trait]
impl ProductStore for MySqlStore {
    async fn list_catalog(&self) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products ORDER BY display_order ASC, catalog_number DESC",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;
        Ok(row.map(Product::from))
    }

    async fn insert_product(&self, fields: ProductFields) -> Result<Product> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        // Locks the top of the catalog_number index until commit, so a
        // concurrent insert waits instead of reading the same maximum.
        let max: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(catalog_number), 0) FROM products FOR UPDATE")
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            catalog_number: max + 1,
            fields,
            clicks: 0,
            created_at: now,
            updated_at: now,
        };
        let f = &product.fields;

        sqlx::query(
            "INSERT INTO products (id, catalog_number, name, provider, product_type, tier, price, \
             original_price, discount, features, target_url, image, rating, num_reviews, \
             display_order, is_featured, show_on_landing, show_on_home, clicks, created_at, \
             updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(product.catalog_number)
        .bind(&f.name)
        .bind(&f.provider)
        .bind(&f.product_type)
        .bind(&f.tier)
        .bind(f.price)
        .bind(f.original_price)
        .bind(f.discount)
        .bind(features_to_text(&f.features))
        .bind(&f.target_url)
        .bind(&f.image)
        .bind(f.rating)
        .bind(f.num_reviews)
        .bind(f.display_order)
        .bind(f.is_featured)
        .bind(f.show_on_landing)
        .bind(f.show_on_home)
        .bind(product.clicks)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        debug!(id = %product.id, catalog_number = product.catalog_number, "Inserted product");
        Ok(product)
    }

    async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Option<Product>> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        let Some(current) = fetch_for_update(&mut tx, id).await? else {
            return Ok(None);
        };

        let fields = input.merge_into(&current.fields)?;
        let updated_at = Utc::now();

        sqlx::query(
            "UPDATE products SET name = ?, provider = ?, product_type = ?, tier = ?, price = ?, \
             original_price = ?, discount = ?, features = ?, target_url = ?, image = ?, \
             rating = ?, num_reviews = ?, display_order = ?, is_featured = ?, \
             show_on_landing = ?, show_on_home = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.provider)
        .bind(&fields.product_type)
        .bind(&fields.tier)
        .bind(fields.price)
        .bind(fields.original_price)
        .bind(fields.discount)
        .bind(features_to_text(&fields.features))
        .bind(&fields.target_url)
        .bind(&fields.image)
        .bind(fields.rating)
        .bind(fields.num_reviews)
        .bind(fields.display_order)
        .bind(fields.is_featured)
        .bind(fields.show_on_landing)
        .bind(fields.show_on_home)
        .bind(updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(Some(Product {
            fields,
            updated_at,
            ..current
        }))
    }

    async fn reorder_catalog(&self, updates: &[OrderUpdate]) -> Result<()> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;
        let now = Utc::now();

        for update in updates {
            let result =
                sqlx::query("UPDATE products SET display_order = ?, updated_at = ? WHERE id = ?")
                    .bind(update.display_order)
                    .bind(now)
                    .bind(&update.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the earlier updates.
                return Err(Error::not_found(format!("product {}", update.id)));
            }
        }

        tx.commit().await.map_err(db_err)?;
        debug!(count = updates.len(), "Reordered catalog");
        Ok(())
    }

    async fn record_click(&self, event: &ClickEvent) -> Result<bool> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;

        let result = sqlx::query("UPDATE products SET clicks = clicks + 1 WHERE id = ?")
            .bind(&event.product_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO click_events (id, product_id, source, referrer, user_agent, ip_address, \
             country, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.id)
        .bind(&event.product_id)
        .bind(&event.source)
        .bind(&event.referrer)
        .bind(&event.user_agent)
        .bind(&event.ip_address)
        .bind(&event.country)
        .bind(event.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
