//! Core types, schemas, and validation for the HostVoucher backend.

pub mod action;
pub mod analytics;
pub mod coerce;
pub mod content;
pub mod data;
pub mod error;
pub mod gamification;
pub mod limits;
pub mod product;
pub mod proxy;
pub mod resource;
pub mod settings;
pub mod upload;
pub mod webhook;

pub use action::*;
pub use analytics::*;
pub use content::*;
pub use data::*;
pub use error::{Error, Result, UploadErrorCode, ValidationErrorCode};
pub use gamification::*;
pub use product::*;
pub use proxy::*;
pub use resource::*;
pub use settings::*;
pub use upload::*;
pub use webhook::*;
