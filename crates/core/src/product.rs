//! Catalog products and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::cmp::Ordering;
use validator::Validate;

use crate::coerce;
use crate::error::{Error, Result};
use crate::limits::MAX_REORDER_ITEMS;

/// Mutable product columns.
///
/// Everything an admin can edit; `id`, `catalog_number`, `clicks` and the
/// timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub provider: String,
    pub product_type: Option<String>,
    pub tier: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: Option<f64>,
    pub features: Vec<String>,
    pub target_url: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub num_reviews: i64,
    pub display_order: i64,
    pub is_featured: bool,
    pub show_on_landing: bool,
    pub show_on_home: bool,
}

/// A catalog product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    /// Assigned once on insert as `MAX(catalog_number) + 1`, never changed.
    pub catalog_number: i64,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `saveProduct` payload.
///
/// Accepts both the snake_case column names and the camelCase names the admin
/// form sends; numbers and flags may arrive as strings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "title")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub provider: Option<String>,
    #[serde(default, alias = "type", alias = "productType")]
    #[validate(length(max = 64))]
    pub product_type: Option<String>,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub tier: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default, alias = "originalPrice", deserialize_with = "coerce::opt_f64")]
    #[validate(range(min = 0.0))]
    pub original_price: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_features")]
    pub features: Option<Vec<String>>,
    #[serde(default, alias = "targetUrl", alias = "url")]
    #[validate(length(max = 2048))]
    pub target_url: Option<String>,
    #[serde(default, alias = "imageUrl")]
    #[validate(length(max = 2048))]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[serde(default, alias = "numReviews", deserialize_with = "coerce::opt_i64")]
    #[validate(range(min = 0))]
    pub num_reviews: Option<i64>,
    #[serde(default, alias = "displayOrder", deserialize_with = "coerce::opt_i64")]
    pub display_order: Option<i64>,
    #[serde(default, alias = "isFeatured", deserialize_with = "coerce::opt_bool")]
    pub is_featured: Option<bool>,
    #[serde(default, alias = "showOnLanding", deserialize_with = "coerce::opt_bool")]
    pub show_on_landing: Option<bool>,
    #[serde(default, alias = "showOnHome", deserialize_with = "coerce::opt_bool")]
    pub show_on_home: Option<bool>,
}

impl ProductInput {
    /// The id to update, if any. Blank ids count as absent.
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Build the columns for a new product.
    pub fn to_new_fields(&self) -> Result<ProductFields> {
        self.validate()?;

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::validation("name is required"))?;

        Ok(ProductFields {
            name: name.to_string(),
            provider: self.provider.clone().unwrap_or_default(),
            product_type: non_blank(&self.product_type),
            tier: non_blank(&self.tier),
            price: self.price.unwrap_or(0.0),
            original_price: self.original_price,
            discount: self.discount,
            features: self.features.clone().unwrap_or_default(),
            target_url: non_blank(&self.target_url),
            image: non_blank(&self.image),
            rating: self.rating,
            num_reviews: self.num_reviews.unwrap_or(0),
            display_order: self.display_order.unwrap_or(0),
            is_featured: self.is_featured.unwrap_or(false),
            show_on_landing: self.show_on_landing.unwrap_or(false),
            show_on_home: self.show_on_home.unwrap_or(false),
        })
    }

    /// Apply the supplied fields over an existing row's columns.
    ///
    /// Fields absent from the payload keep their current value.
    pub fn merge_into(&self, current: &ProductFields) -> Result<ProductFields> {
        self.validate()?;

        let mut merged = current.clone();
        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::validation("name cannot be blank"));
            }
            merged.name = name.to_string();
        }
        if let Some(provider) = &self.provider {
            merged.provider = provider.clone();
        }
        if self.product_type.is_some() {
            merged.product_type = non_blank(&self.product_type);
        }
        if self.tier.is_some() {
            merged.tier = non_blank(&self.tier);
        }
        if let Some(price) = self.price {
            merged.price = price;
        }
        if self.original_price.is_some() {
            merged.original_price = self.original_price;
        }
        if self.discount.is_some() {
            merged.discount = self.discount;
        }
        if let Some(features) = &self.features {
            merged.features = features.clone();
        }
        if self.target_url.is_some() {
            merged.target_url = non_blank(&self.target_url);
        }
        if self.image.is_some() {
            merged.image = non_blank(&self.image);
        }
        if self.rating.is_some() {
            merged.rating = self.rating;
        }
        if let Some(n) = self.num_reviews {
            merged.num_reviews = n;
        }
        if let Some(order) = self.display_order {
            merged.display_order = order;
        }
        if let Some(flag) = self.is_featured {
            merged.is_featured = flag;
        }
        if let Some(flag) = self.show_on_landing {
            merged.show_on_landing = flag;
        }
        if let Some(flag) = self.show_on_home {
            merged.show_on_home = flag;
        }
        Ok(merged)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Catalog ordering: `display_order` ascending, then newest catalog number first.
pub fn catalog_cmp(a: &Product, b: &Product) -> Ordering {
    a.fields
        .display_order
        .cmp(&b.fields.display_order)
        .then_with(|| b.catalog_number.cmp(&a.catalog_number))
}

/// Sort products in catalog order.
pub fn sort_catalog(products: &mut [Product]) {
    products.sort_by(catalog_cmp);
}

/// One entry of a reorder request. Accepts `order` or `display_order`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogOrderItem {
    pub id: String,
    #[serde(
        default,
        alias = "display_order",
        alias = "displayOrder",
        deserialize_with = "coerce::opt_i64"
    )]
    pub order: Option<i64>,
}

/// `POST /api/catalog/order` body.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogOrderRequest {
    pub items: Vec<CatalogOrderItem>,
}

/// A validated `(id, display_order)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: String,
    pub display_order: i64,
}

impl CatalogOrderRequest {
    /// Validate the batch: every item needs an id and an order, ids are unique.
    pub fn into_updates(self) -> Result<Vec<OrderUpdate>> {
        if self.items.len() > MAX_REORDER_ITEMS {
            return Err(Error::validation(format!(
                "Reorder batch has {} items, exceeds {} limit",
                self.items.len(),
                MAX_REORDER_ITEMS
            )));
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        let mut updates = Vec::with_capacity(self.items.len());
        for (i, item) in self.items.into_iter().enumerate() {
            let id = item.id.trim().to_string();
            if id.is_empty() {
                return Err(Error::validation(format!("items[{}]: id is required", i)));
            }
            let display_order = item
                .order
                .ok_or_else(|| Error::validation(format!("items[{}]: order is required", i)))?;
            if !seen.insert(id.clone()) {
                return Err(Error::validation(format!("items[{}]: duplicate id {}", i, id)));
            }
            updates.push(OrderUpdate { id, display_order });
        }
        Ok(updates)
    }
}

/// Filters for the public deals listing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DealFilter {
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub landing: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub home: Option<bool>,
}

impl DealFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let f = &product.fields;
        self.featured.map_or(true, |v| f.is_featured == v)
            && self.landing.map_or(true, |v| f.show_on_landing == v)
            && self.home.map_or(true, |v| f.show_on_home == v)
    }
}
