// server/src/lib.rs

//! Pizza shop HTTP API: storefront accounts, catalog, orders and reviews, plus
//! the `/admin` moderation surface.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod web;
