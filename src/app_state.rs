//! Application state shared across handlers

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::admin_service::AdminService;
use crate::services::auth_service::AuthService;
use crate::services::oauth_service::OAuthService;
use crate::services::order_service::OrderService;
use crate::services::payment_service::PaymentService;
use crate::services::product_service::ProductService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub product_service: Arc<ProductService>,
    pub order_service: Arc<OrderService>,
    pub admin_service: Arc<AdminService>,
    pub payment_service: Arc<PaymentService>,
    pub oauth_service: Arc<OAuthService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let http = reqwest::Client::new();

        Self {
            auth_service: Arc::new(AuthService::new(
                pool.clone(),
                config.jwt_secret.clone(),
                config.jwt_expires_in_days,
            )),
            product_service: Arc::new(ProductService::new(pool.clone())),
            order_service: Arc::new(OrderService::new(pool.clone())),
            admin_service: Arc::new(AdminService::new(pool.clone())),
            payment_service: Arc::new(PaymentService::new(
                http.clone(),
                config.stripe_secret_key.clone(),
            )),
            oauth_service: Arc::new(OAuthService::new(http, config.google_client_id.clone())),
            pool,
            config,
        }
    }
}
