//! HTTP API layer for the HostVoucher backend.

pub mod config;
pub mod extractors;
pub mod image_proxy;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod settings;
pub mod state;

pub use config::{ApiConfig, ImageProxyConfig};
pub use routes::router;
pub use settings::SettingsService;
pub use state::AppState;
