//! Checkout and order endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::checkout::{self, CartLine};
use crate::db;
use crate::db::orders::{Order, OrderWithItems};
use crate::error::ServiceError;
use crate::fulfillment::{self, OrderStatus};
use crate::state::AppState;

use super::{ApiResult, db_error, require_seller};

const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

/// Client cart line. Any price the client sends is ignored; pricing always
/// comes from the catalog.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantidade: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub orders: Vec<OrderWithItems>,
}

/// POST /api/orders
pub async fn checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ServiceError> {
    let idempotency_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty());

    let cart: Vec<CartLine> = req
        .items
        .iter()
        .map(|i| CartLine {
            product_id: i.product_id,
            quantidade: i.quantidade,
        })
        .collect();

    let outcome = checkout::create_orders(&state.pool, current.id, &cart, idempotency_key).await?;

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(CheckoutResponse {
            success: true,
            orders: outcome.orders,
        }),
    ))
}

/// GET /api/orders/my
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<OrderWithItems>> {
    let orders = db::orders::list_for_consumer(&state.pool, current.id)
        .await
        .map_err(db_error)?;
    Ok(Json(orders))
}

/// GET /api/orders/sales
pub async fn my_sales(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<OrderWithItems>> {
    require_seller(&current)?;
    let orders = db::orders::list_sales_for_seller(&state.pool, current.id)
        .await
        .map_err(db_error)?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// PATCH /api/orders/{id}
///
/// Sellers advance orders that contain their products. The status string is
/// parsed here so unknown values map to the order error code rather than a
/// deserialization rejection.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ServiceError> {
    require_seller(&current)?;

    let next: OrderStatus = req.status.parse::<OrderStatus>()?;
    let order = fulfillment::set_status(&state.pool, id, current.id, next).await?;
    Ok(Json(order))
}
