//! Business-logic services over the database pool

pub mod admin_service;
pub mod auth_service;
pub mod oauth_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
