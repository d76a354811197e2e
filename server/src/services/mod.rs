// server/src/services/mod.rs

pub mod admin_service;
pub mod auth_service;
pub mod order_service;
pub mod pricing;
pub mod rate_limiter;
pub mod review_service;
pub mod token_service;
