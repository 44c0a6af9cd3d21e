//! Read types served by `GET /api/data`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    Deals,
    BlogPosts,
    Testimonials,
    MiningTasks,
    SiteSettings,
    Banners,
}

impl DataKind {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "deals" | "products" => Ok(Self::Deals),
            "blog_posts" | "blogPosts" => Ok(Self::BlogPosts),
            "testimonials" => Ok(Self::Testimonials),
            "mining_tasks" | "miningTasks" => Ok(Self::MiningTasks),
            "siteSettings" | "site_settings" | "settings" => Ok(Self::SiteSettings),
            "banners" => Ok(Self::Banners),
            other => Err(Error::unknown_type(format!("Unknown data type: {}", other))),
        }
    }
}
