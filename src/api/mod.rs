//! API routes — split into sub-modules by domain

pub mod addresses;
pub mod auth;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;
pub mod users;

use axum::routing::{get, patch, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{CurrentUser, require_auth};
use crate::error::{AppError, ErrorCode};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Map an unexpected database error to an opaque 500, logging the detail.
pub fn db_error(e: sqlx::Error) -> AppError {
    tracing::error!("Database error: {e}");
    AppError::new(ErrorCode::InternalError)
}

/// Reject non-seller accounts.
pub fn require_seller(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_seller() {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::SellerRequired))
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Storefront and account creation (no auth)
    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/users", post(users::register))
        .route("/api/products", get(products::list_products))
        .route("/api/products/{id}", get(products::get_product))
        .route("/api/sellers", get(users::list_sellers))
        .route("/api/sellers/{id}", get(users::get_seller))
        .route("/api/payment/notifications", post(payment::notifications));

    // JWT authenticated
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me).put(auth::update_me))
        .route(
            "/api/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/api/addresses/{id}",
            put(addresses::update_address).delete(addresses::delete_address),
        )
        .route(
            "/api/seller/products",
            get(products::list_my_products).post(products::create_product),
        )
        .route(
            "/api/seller/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/api/orders", post(orders::checkout))
        .route("/api/orders/my", get(orders::my_orders))
        .route("/api/orders/sales", get(orders::my_sales))
        .route("/api/orders/{id}", patch(orders::update_status))
        .route("/api/payment", post(payment::create_payment))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
