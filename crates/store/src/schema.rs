//! MySQL table schemas.
//!
//! - UUID text primary keys
//! - DATETIME(3) timestamps, always written from the application in UTC
//! - JSON documents stored as TEXT and decoded in `site_core`

pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    catalog_number BIGINT NOT NULL,
    name VARCHAR(255) NOT NULL,
    provider VARCHAR(255) NOT NULL DEFAULT '',
    product_type VARCHAR(64) NULL,
    tier VARCHAR(64) NULL,
    price DOUBLE NOT NULL DEFAULT 0,
    original_price DOUBLE NULL,
    discount DOUBLE NULL,
    features TEXT NULL,
    target_url VARCHAR(2048) NULL,
    image VARCHAR(2048) NULL,
    rating DOUBLE NULL,
    num_reviews BIGINT NOT NULL DEFAULT 0,
    display_order BIGINT NOT NULL DEFAULT 0,
    is_featured BOOLEAN NOT NULL DEFAULT FALSE,
    show_on_landing BOOLEAN NOT NULL DEFAULT FALSE,
    show_on_home BOOLEAN NOT NULL DEFAULT FALSE,
    clicks BIGINT NOT NULL DEFAULT 0,
    created_at DATETIME(3) NOT NULL,
    updated_at DATETIME(3) NOT NULL,
    UNIQUE KEY uq_products_catalog_number (catalog_number),
    KEY idx_products_order (display_order, catalog_number)
)
"#;

/// Singleton row keyed by `main_settings`.
pub const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id VARCHAR(64) NOT NULL PRIMARY KEY,
    schema_version INT NOT NULL DEFAULT 0,
    site_appearance TEXT NULL,
    page_banners TEXT NULL,
    popup_modal TEXT NULL,
    currency_rates TEXT NULL,
    gamification_points TEXT NULL,
    updated_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_TESTIMONIALS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS testimonials (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    role VARCHAR(255) NULL,
    company VARCHAR(255) NULL,
    content TEXT NOT NULL,
    rating BIGINT NULL,
    avatar VARCHAR(2048) NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_VOUCHER_SUBMISSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS voucher_submissions (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    provider VARCHAR(255) NOT NULL,
    code VARCHAR(255) NOT NULL,
    description TEXT NULL,
    discount VARCHAR(255) NULL,
    expires_at VARCHAR(64) NULL,
    target_url VARCHAR(2048) NULL,
    submitter_email VARCHAR(320) NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_DEAL_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS deal_requests (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(320) NOT NULL,
    provider VARCHAR(255) NULL,
    product_type VARCHAR(64) NULL,
    budget VARCHAR(255) NULL,
    message TEXT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_NEWSLETTER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS newsletter_subscriptions (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    email VARCHAR(320) NOT NULL,
    source VARCHAR(255) NULL,
    created_at DATETIME(3) NOT NULL,
    UNIQUE KEY uq_newsletter_email (email)
)
"#;

pub const CREATE_PURCHASE_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS purchase_requests (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    product_id VARCHAR(36) NULL,
    product_name VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(320) NOT NULL,
    phone VARCHAR(64) NULL,
    whatsapp VARCHAR(64) NULL,
    company VARCHAR(255) NULL,
    domain VARCHAR(255) NULL,
    billing_period VARCHAR(64) NULL,
    message TEXT NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_at DATETIME(3) NOT NULL,
    updated_at DATETIME(3) NOT NULL,
    KEY idx_purchase_requests_status (status, created_at)
)
"#;

pub const CREATE_BLOG_POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS blog_posts (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    slug VARCHAR(255) NOT NULL,
    excerpt TEXT NULL,
    content MEDIUMTEXT NOT NULL,
    image VARCHAR(2048) NULL,
    author VARCHAR(255) NULL,
    is_published BOOLEAN NOT NULL DEFAULT FALSE,
    published_at DATETIME(3) NULL,
    created_at DATETIME(3) NOT NULL,
    UNIQUE KEY uq_blog_posts_slug (slug)
)
"#;

pub const CREATE_MINING_TASKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS mining_tasks (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NULL,
    points BIGINT NOT NULL DEFAULT 0,
    task_url VARCHAR(2048) NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    display_order BIGINT NOT NULL DEFAULT 0,
    created_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_BANNERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS banners (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    title VARCHAR(255) NULL,
    image VARCHAR(2048) NOT NULL,
    link_url VARCHAR(2048) NULL,
    position VARCHAR(64) NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    display_order BIGINT NOT NULL DEFAULT 0,
    created_at DATETIME(3) NOT NULL
)
"#;

pub const CREATE_CLICK_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS click_events (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    product_id VARCHAR(36) NOT NULL,
    source VARCHAR(255) NULL,
    referrer VARCHAR(2048) NULL,
    user_agent VARCHAR(512) NULL,
    ip_address VARCHAR(64) NULL,
    country VARCHAR(8) NULL,
    created_at DATETIME(3) NOT NULL,
    KEY idx_click_events_product (product_id)
)
"#;

pub const CREATE_VISITORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS visitors (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    session_id VARCHAR(128) NOT NULL,
    path VARCHAR(2048) NOT NULL,
    referrer VARCHAR(2048) NULL,
    language VARCHAR(32) NULL,
    user_agent VARCHAR(512) NULL,
    browser VARCHAR(64) NOT NULL,
    os VARCHAR(64) NOT NULL,
    device_type VARCHAR(16) NOT NULL,
    country VARCHAR(8) NULL,
    ip_address VARCHAR(64) NULL,
    visited_at DATETIME(3) NOT NULL,
    KEY idx_visitors_visited_at (visited_at),
    KEY idx_visitors_session (session_id)
)
"#;

pub const CREATE_PAGEVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pageviews (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    session_id VARCHAR(128) NOT NULL,
    path VARCHAR(2048) NOT NULL,
    title VARCHAR(512) NULL,
    duration_seconds BIGINT NULL,
    visited_at DATETIME(3) NOT NULL,
    KEY idx_pageviews_visited_at (visited_at)
)
"#;

pub const CREATE_GAMIFICATION_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS gamification_users (
    user_id VARCHAR(128) NOT NULL PRIMARY KEY,
    points BIGINT NOT NULL DEFAULT 0,
    updated_at DATETIME(3) NOT NULL
)
"#;

/// Badges are a set per user: the unique key turns a repeated award into a no-op.
pub const CREATE_USER_BADGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS user_badges (
    user_id VARCHAR(128) NOT NULL,
    badge VARCHAR(64) NOT NULL,
    awarded_at DATETIME(3) NOT NULL,
    PRIMARY KEY (user_id, badge)
)
"#;

pub const CREATE_WEBHOOK_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS webhook_logs (
    id VARCHAR(36) NOT NULL PRIMARY KEY,
    provider VARCHAR(64) NOT NULL,
    method VARCHAR(16) NOT NULL,
    headers TEXT NOT NULL,
    query TEXT NULL,
    payload MEDIUMTEXT NOT NULL,
    received_at DATETIME(3) NOT NULL,
    KEY idx_webhook_logs_provider (provider, received_at)
)
"#;

/// Returns all DDL statements in creation order.
pub fn all_tables() -> Vec<&'static str> {
    vec![
        CREATE_PRODUCTS_TABLE,
        CREATE_SETTINGS_TABLE,
        CREATE_TESTIMONIALS_TABLE,
        CREATE_VOUCHER_SUBMISSIONS_TABLE,
        CREATE_DEAL_REQUESTS_TABLE,
        CREATE_NEWSLETTER_TABLE,
        CREATE_PURCHASE_REQUESTS_TABLE,
        CREATE_BLOG_POSTS_TABLE,
        CREATE_MINING_TASKS_TABLE,
        CREATE_BANNERS_TABLE,
        CREATE_CLICK_EVENTS_TABLE,
        CREATE_VISITORS_TABLE,
        CREATE_PAGEVIEWS_TABLE,
        CREATE_GAMIFICATION_USERS_TABLE,
        CREATE_USER_BADGES_TABLE,
        CREATE_WEBHOOK_LOGS_TABLE,
    ]
}
