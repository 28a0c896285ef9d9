//! HTTP route handlers, one module per route group.

pub mod analytics_service;
pub mod etl_service;
pub mod health_service;
pub mod order_service;
pub mod seed_service;
