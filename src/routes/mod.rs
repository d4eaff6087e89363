//! Route definitions for the MapleStore API

use axum::routing::{get, post, put};
use axum::Router;

use crate::app_state::AppState;
use crate::handlers::{admin, auth, orders, products};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", get(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/updateprofile", put(auth::update_profile))
        .route("/api/auth/updatepassword", put(auth::update_password))
        .route("/api/auth/google", post(auth::google_login))
        .route("/api/auth/facebook", post(auth::facebook_login))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/products/featured", get(products::featured_products))
        .route("/api/products/categories", get(products::categories))
        .route("/api/products/admin/all", get(products::list_products_admin))
        .route(
            "/api/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/products/:id/reviews", post(products::add_review))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/myorders", get(orders::my_orders))
        .route(
            "/api/orders/create-payment-intent",
            post(orders::create_payment_intent),
        )
        .route("/api/orders/admin/all", get(orders::all_orders))
        .route("/api/orders/admin/stats", get(orders::order_stats))
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/pay", put(orders::pay_order))
        .route("/api/orders/:id/status", put(orders::update_order_status))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/users", get(admin::list_users))
        .route(
            "/api/admin/users/:id",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
}
