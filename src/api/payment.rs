//! Payment endpoints: gateway order creation and the notification webhook

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::{ApiResponse, AppError, ErrorCode};
use crate::fulfillment::{self, OrderStatus};
use crate::pagseguro::{
    self, Amount, CreateOrderRequest, Customer, Item, PaymentArtifact, QrCodeRequest,
};
use crate::state::AppState;

use super::{ApiResult, db_error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: i64,
}

/// POST /api/payment
///
/// Builds the gateway order from the stored order lines, never from client
/// data. The gateway reference_id is our order id, so retries are idempotent
/// on the PagSeguro side.
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<PaymentArtifact> {
    let order = db::orders::find_by_id(&state.pool, req.order_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if order.consumer_id != current.id {
        return Err(AppError::permission_denied("Order belongs to another user"));
    }

    let user = db::users::find_by_id(&state.pool, current.id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("User"))?;

    let items = db::orders::items_for_order(&state.pool, order.id)
        .await
        .map_err(db_error)?;
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let gateway_request = CreateOrderRequest {
        reference_id: order.id.to_string(),
        customer: Customer {
            name: user.nome_completo,
            email: user.email,
            tax_id: user.cpf_cnpj,
        },
        items: items
            .iter()
            .map(|i| Item {
                name: i.nome.clone(),
                quantity: i.quantidade,
                unit_amount: i.preco_unitario_centavos,
            })
            .collect(),
        qr_codes: vec![QrCodeRequest {
            amount: Amount {
                value: order.valor_total_centavos,
            },
        }],
        notification_urls: state.pagseguro.notification_urls(),
    };

    let response = state
        .pagseguro
        .create_order(&gateway_request)
        .await
        .map_err(|e| {
            tracing::error!(order_id = order.id, "PagSeguro order creation failed: {e}");
            AppError::new(ErrorCode::PaymentFailed)
        })?;

    if let Some(gateway_id) = &response.id {
        db::orders::set_gateway_reference(&state.pool, order.id, gateway_id)
            .await
            .map_err(db_error)?;
    }

    let artifact = pagseguro::extract_artifact(&response).ok_or_else(|| {
        tracing::error!(order_id = order.id, "PagSeguro response had no payment artifact");
        AppError::new(ErrorCode::PaymentFailed)
    })?;

    Ok(Json(artifact))
}

/// Gateway notification payload. PagSeguro posts more fields than these; the
/// rest are irrelevant here and ignored.
#[derive(Debug, Deserialize)]
pub struct NotificationPayload {
    pub reference_id: Option<String>,
    #[serde(default)]
    pub charges: Vec<Charge>,
}

#[derive(Debug, Deserialize)]
pub struct Charge {
    pub status: Option<String>,
}

/// POST /api/payment/notifications
///
/// Always acknowledges with 200 so the gateway does not retry forever;
/// malformed or irrelevant notifications are logged and dropped.
pub async fn notifications(
    State(state): State<AppState>,
    Json(payload): Json<NotificationPayload>,
) -> Json<ApiResponse<()>> {
    let Some(order_id) = payload
        .reference_id
        .as_deref()
        .and_then(|r| r.parse::<i64>().ok())
    else {
        tracing::warn!("Gateway notification without usable reference_id");
        return Json(ApiResponse::ok());
    };

    let charge_status = payload
        .charges
        .first()
        .and_then(|c| c.status.as_deref())
        .unwrap_or("");

    let next = match charge_status {
        "PAID" => OrderStatus::Confirmado,
        "DECLINED" | "CANCELED" => OrderStatus::Cancelado,
        other => {
            tracing::debug!(order_id, status = other, "Gateway notification ignored");
            return Json(ApiResponse::ok());
        }
    };

    if let Err(e) = fulfillment::apply_gateway_status(&state.pool, order_id, next).await {
        let app_error: AppError = e.into();
        tracing::error!(order_id, "Failed to apply gateway status: {}", app_error);
    }

    Json(ApiResponse::ok())
}
