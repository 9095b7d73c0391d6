//! Washday command-line client: configuration, order API access and terminal rendering.

pub mod api;
pub mod auth;
pub mod config;
pub mod geocoding;
pub mod observability;
pub mod render;
