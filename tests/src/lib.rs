//! Shared helpers for the end-to-end tests.

pub mod containers;
pub mod fixtures;
pub mod setup;
