//! Checkout orchestration
//!
//! Validates the cart, resolves the delivery address, and runs the whole
//! reservation as one transaction: every stock decrement and every order of
//! every seller group commits together or not at all.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::db;
use crate::db::orders::OrderWithItems;
use crate::error::{AppError, ErrorCode, ServiceError};
use crate::util::now_millis;

use super::splitter::{self, CartLine};

/// Result of a checkout call.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub orders: Vec<OrderWithItems>,
    /// True when the idempotency key matched a previous request and the
    /// original orders were returned without touching stock.
    pub replayed: bool,
}

/// Create one order per seller represented in the cart.
///
/// When `idempotency_key` is given, a repeated key for the same consumer
/// returns the originally created orders. The key is recorded inside the
/// reservation transaction, so a failed checkout does not burn it.
pub async fn create_orders(
    pool: &SqlitePool,
    consumer_id: i64,
    cart: &[CartLine],
    idempotency_key: Option<&str>,
) -> Result<CheckoutOutcome, ServiceError> {
    if cart.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    for line in cart {
        if line.quantidade <= 0 {
            return Err(AppError::validation("Item quantity must be positive")
                .with_detail("productId", line.product_id)
                .into());
        }
    }

    let address = db::addresses::first_for_user(pool, consumer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoDeliveryAddress))?;

    // Authoritative catalog lookup; the splitter fails the cart on any miss
    let mut ids: Vec<i64> = cart.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    let products: HashMap<i64, db::products::Product> =
        db::products::find_active_by_ids(pool, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

    let groups = splitter::split_by_seller(cart, &products)?;

    let now = now_millis();
    let mut tx = pool.begin().await?;

    let checkout_request_id = match idempotency_key {
        Some(key) => {
            match db::orders::insert_checkout_request(&mut *tx, consumer_id, key, now).await? {
                Some(id) => Some(id),
                None => {
                    // Replay: the original transaction already committed
                    drop(tx);
                    let request_id = db::orders::find_checkout_request(pool, consumer_id, key)
                        .await?
                        .ok_or_else(|| {
                            AppError::internal("Checkout request vanished during replay")
                        })?;
                    let orders = db::orders::list_by_checkout_request(pool, request_id).await?;
                    tracing::info!(consumer_id, key, "Checkout replayed from idempotency key");
                    return Ok(CheckoutOutcome {
                        orders,
                        replayed: true,
                    });
                }
            }
        }
        None => None,
    };

    let mut order_ids = Vec::with_capacity(groups.len());
    for group in &groups {
        for line in &group.lines {
            let updated =
                db::orders::decrement_stock(&mut *tx, line.product_id, line.quantidade).await?;
            if updated == 0 {
                // Rolls back everything, including other sellers' orders
                return Err(AppError::new(ErrorCode::ProductOutOfStock)
                    .with_detail("productId", line.product_id)
                    .with_detail("requested", line.quantidade)
                    .into());
            }
        }

        let subtotal = group.subtotal_centavos().ok_or_else(|| {
            AppError::validation("Order total exceeds the representable amount")
                .with_detail("sellerId", group.seller_id)
        })?;
        let order_id = db::orders::insert_order(
            &mut *tx,
            consumer_id,
            address.id,
            subtotal,
            subtotal,
            checkout_request_id,
            now,
        )
        .await?;

        for line in &group.lines {
            db::orders::insert_item(
                &mut *tx,
                order_id,
                line.product_id,
                line.quantidade,
                line.preco_unitario_centavos,
            )
            .await?;
        }
        order_ids.push(order_id);
    }

    tx.commit().await?;

    tracing::info!(
        consumer_id,
        orders = order_ids.len(),
        "Checkout committed"
    );

    let mut orders = Vec::with_capacity(order_ids.len());
    for id in order_ids {
        let order = db::orders::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::internal("Order vanished after commit"))?;
        orders.push(db::orders::with_items(pool, order).await?);
    }

    Ok(CheckoutOutcome {
        orders,
        replayed: false,
    })
}
