//! `GET /api/data?type=`: public reads.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use site_core::{coerce, sort_catalog, DataKind, DealFilter, Error};

use crate::response::{ApiError, DataResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub landing: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub home: Option<bool>,
}

impl DataQuery {
    fn deal_filter(&self) -> DealFilter {
        DealFilter {
            featured: self.featured,
            landing: self.landing,
            home: self.home,
        }
    }
}

/// GET /api/data?type=deals|blog_posts|testimonials|mining_tasks|siteSettings|banners
pub async fn data_handler(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse<Value>>, ApiError> {
    let raw = query
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::unknown_type("Missing type parameter"))?;

    let data = match DataKind::parse(raw)? {
        DataKind::Deals => {
            let filter = query.deal_filter();
            let mut products = state.store.list_catalog().await?;
            products.retain(|p| filter.matches(p));
            sort_catalog(&mut products);
            serde_json::to_value(products)
        }
        DataKind::BlogPosts => serde_json::to_value(state.store.list_blog_posts().await?),
        DataKind::Testimonials => serde_json::to_value(state.store.list_testimonials().await?),
        DataKind::MiningTasks => serde_json::to_value(state.store.list_mining_tasks().await?),
        DataKind::SiteSettings => serde_json::to_value(&*state.settings.snapshot()),
        DataKind::Banners => serde_json::to_value(state.store.list_banners().await?),
    }
    .map_err(Error::from)?;

    Ok(DataResponse::new(data))
}
