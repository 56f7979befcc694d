//! Orders, order lines, and the checkout idempotency ledger
//!
//! Write helpers take a `SqliteConnection` so the checkout orchestrator can run
//! them inside a single transaction. Reads go through the pool.

use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::fulfillment::OrderStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub consumer_id: i64,
    pub delivery_address_id: i64,
    #[serde(
        rename = "valorProdutos",
        serialize_with = "crate::util::serialize_centavos"
    )]
    pub valor_produtos_centavos: i64,
    #[serde(
        rename = "valorTotal",
        serialize_with = "crate::util::serialize_centavos"
    )]
    pub valor_total_centavos: i64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_reference: Option<String>,
    #[serde(skip)]
    pub checkout_request_id: Option<i64>,
    pub criado_em: i64,
}

/// Order line joined with product name and owning seller.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub nome: String,
    pub seller_id: i64,
    pub quantidade: i64,
    #[serde(
        rename = "precoUnitario",
        serialize_with = "crate::util::serialize_centavos"
    )]
    pub preco_unitario_centavos: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

// ==================== Transactional writes ====================

/// Record a checkout request for idempotency. Returns the new request id, or
/// None when the (consumer, key) pair was already recorded, i.e. a replay.
pub async fn insert_checkout_request(
    conn: &mut SqliteConnection,
    consumer_id: i64,
    idempotency_key: &str,
    now: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO checkout_requests (consumer_id, idempotency_key, criado_em)
         VALUES (?1, ?2, ?3)",
    )
    .bind(consumer_id)
    .bind(idempotency_key)
    .bind(now)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(result.last_insert_rowid()))
}

pub async fn find_checkout_request(
    pool: &SqlitePool,
    consumer_id: i64,
    idempotency_key: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM checkout_requests WHERE consumer_id = ?1 AND idempotency_key = ?2",
    )
    .bind(consumer_id)
    .bind(idempotency_key)
    .fetch_optional(pool)
    .await
}

/// Conditionally reserve stock. Zero rows affected means insufficient stock.
/// NULL stock (sold on demand) always matches and stays NULL.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantidade: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET estoque = estoque - ?1
         WHERE id = ?2 AND (estoque IS NULL OR estoque >= ?1)",
    )
    .bind(quantidade)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_order(
    conn: &mut SqliteConnection,
    consumer_id: i64,
    delivery_address_id: i64,
    valor_produtos_centavos: i64,
    valor_total_centavos: i64,
    checkout_request_id: Option<i64>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO orders (consumer_id, delivery_address_id, valor_produtos_centavos,
                             valor_total_centavos, status, checkout_request_id, criado_em)
         VALUES (?1, ?2, ?3, ?4, 'processando', ?5, ?6)",
    )
    .bind(consumer_id)
    .bind(delivery_address_id)
    .bind(valor_produtos_centavos)
    .bind(valor_total_centavos)
    .bind(checkout_request_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_item(
    conn: &mut SqliteConnection,
    order_id: i64,
    product_id: i64,
    quantidade: i64,
    preco_unitario_centavos: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, quantidade, preco_unitario_centavos)
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantidade)
    .bind(preco_unitario_centavos)
    .execute(conn)
    .await?;
    Ok(())
}

// ==================== Reads ====================

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn items_for_order(
    pool: &SqlitePool,
    order_id: i64,
) -> Result<Vec<OrderItemDetail>, sqlx::Error> {
    sqlx::query_as(
        "SELECT oi.id, oi.order_id, oi.product_id, p.nome, p.seller_id,
                oi.quantidade, oi.preco_unitario_centavos
         FROM order_items oi
         JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = ?1
         ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

pub async fn with_items(pool: &SqlitePool, order: Order) -> Result<OrderWithItems, sqlx::Error> {
    let items = items_for_order(pool, order.id).await?;
    Ok(OrderWithItems { order, items })
}

pub async fn list_for_consumer(
    pool: &SqlitePool,
    consumer_id: i64,
) -> Result<Vec<OrderWithItems>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE consumer_id = ?1 ORDER BY criado_em DESC")
            .bind(consumer_id)
            .fetch_all(pool)
            .await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        result.push(with_items(pool, order).await?);
    }
    Ok(result)
}

/// Orders containing at least one of the seller's products, with only the
/// seller's own lines attached.
pub async fn list_sales_for_seller(
    pool: &SqlitePool,
    seller_id: i64,
) -> Result<Vec<OrderWithItems>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT DISTINCT o.* FROM orders o
         JOIN order_items oi ON oi.order_id = o.id
         JOIN products p ON p.id = oi.product_id
         WHERE p.seller_id = ?1
         ORDER BY o.criado_em DESC",
    )
    .bind(seller_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        let items = sqlx::query_as(
            "SELECT oi.id, oi.order_id, oi.product_id, p.nome, p.seller_id,
                    oi.quantidade, oi.preco_unitario_centavos
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = ?1 AND p.seller_id = ?2
             ORDER BY oi.id",
        )
        .bind(order.id)
        .bind(seller_id)
        .fetch_all(pool)
        .await?;
        result.push(OrderWithItems { order, items });
    }
    Ok(result)
}

pub async fn list_by_checkout_request(
    pool: &SqlitePool,
    checkout_request_id: i64,
) -> Result<Vec<OrderWithItems>, sqlx::Error> {
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT * FROM orders WHERE checkout_request_id = ?1 ORDER BY id",
    )
    .bind(checkout_request_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        result.push(with_items(pool, order).await?);
    }
    Ok(result)
}

/// True when the seller owns at least one line of the order.
pub async fn seller_owns_line(
    pool: &SqlitePool,
    order_id: i64,
    seller_id: i64,
) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM order_items oi
         JOIN products p ON p.id = oi.product_id
         WHERE oi.order_id = ?1 AND p.seller_id = ?2",
    )
    .bind(order_id)
    .bind(seller_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Compare-and-set the order status. Zero rows affected means the order moved
/// under our feet; callers re-read and re-validate.
pub async fn set_status_guarded(
    pool: &SqlitePool,
    order_id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(to)
        .bind(order_id)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_gateway_reference(
    pool: &SqlitePool,
    order_id: i64,
    gateway_reference: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET gateway_reference = ?1 WHERE id = ?2")
        .bind(gateway_reference)
        .bind(order_id)
        .execute(pool)
        .await?;
    Ok(())
}
