//! Test fixtures and payload builders.

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use site_core::{Banner, BlogPost, MiningTask};
use uuid::Uuid;

/// `POST /api/action` body.
pub fn action(action_type: &str, payload: Value) -> Value {
    json!({ "type": action_type, "payload": payload })
}

/// A minimal product as the admin form sends it.
pub fn product(name: &str) -> Value {
    json!({
        "name": name,
        "provider": "Acme Hosting",
        "type": "vps",
        "price": "4.99",
        "originalPrice": 9.99,
        "features": ["2 vCPU", "4 GB RAM"],
        "isFeatured": "false",
        "showOnLanding": 0
    })
}

pub fn voucher() -> Value {
    json!({
        "provider": "Acme Hosting",
        "code": "SAVE20",
        "discount": "20%",
        "email": "Submitter@Example.com"
    })
}

pub fn purchase_request(product_id: Option<&str>) -> Value {
    json!({
        "productId": product_id,
        "productName": "Acme VPS 2GB",
        "name": "Dana",
        "email": "dana@example.com",
        "billingPeriod": "annual"
    })
}

pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

pub fn blog_post(title: &str, published: bool) -> BlogPost {
    let now = Utc::now();
    BlogPost {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        slug: title.to_ascii_lowercase().replace(' ', "-"),
        excerpt: None,
        content: format!("{} body", title),
        image: None,
        author: Some("Editor".to_string()),
        is_published: published,
        published_at: published.then_some(now),
        created_at: now,
    }
}

pub fn mining_task(title: &str, active: bool, display_order: i64) -> MiningTask {
    MiningTask {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: None,
        points: 10,
        task_url: None,
        is_active: active,
        display_order,
        created_at: Utc::now(),
    }
}

pub fn banner(image: &str, active: bool, display_order: i64) -> Banner {
    Banner {
        id: Uuid::new_v4().to_string(),
        title: None,
        image: image.to_string(),
        link_url: None,
        position: Some("home".to_string()),
        is_active: active,
        display_order,
        created_at: Utc::now() - Duration::minutes(display_order),
    }
}

/// A small valid PNG header followed by filler bytes.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}
