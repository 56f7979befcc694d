//! Product catalog

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub seller_id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    #[serde(rename = "preco", serialize_with = "crate::util::serialize_centavos")]
    pub preco_centavos: i64,
    pub unidade_medida: String,
    /// None means sold on demand (no stock tracking)
    pub estoque: Option<i64>,
    pub imagem_url: Option<String>,
    pub categoria: Option<String>,
    pub ativo: bool,
    pub criado_em: i64,
}

/// Fields shared by create and update operations.
pub struct ProductFields<'a> {
    pub nome: &'a str,
    pub descricao: Option<&'a str>,
    pub preco_centavos: i64,
    pub unidade_medida: &'a str,
    pub estoque: Option<i64>,
    pub imagem_url: Option<&'a str>,
    pub categoria: Option<&'a str>,
}

pub async fn create(
    pool: &SqlitePool,
    seller_id: i64,
    fields: &ProductFields<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO products (seller_id, nome, descricao, preco_centavos, unidade_medida,
                               estoque, imagem_url, categoria, ativo, criado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
    )
    .bind(seller_id)
    .bind(fields.nome)
    .bind(fields.descricao)
    .bind(fields.preco_centavos)
    .bind(fields.unidade_medida)
    .bind(fields.estoque)
    .bind(fields.imagem_url)
    .bind(fields.categoria)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    seller_id: i64,
    fields: &ProductFields<'_>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products
         SET nome = ?1, descricao = ?2, preco_centavos = ?3, unidade_medida = ?4,
             estoque = ?5, imagem_url = ?6, categoria = ?7
         WHERE id = ?8 AND seller_id = ?9",
    )
    .bind(fields.nome)
    .bind(fields.descricao)
    .bind(fields.preco_centavos)
    .bind(fields.unidade_medida)
    .bind(fields.estoque)
    .bind(fields.imagem_url)
    .bind(fields.categoria)
    .bind(id)
    .bind(seller_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64, seller_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND seller_id = ?2")
        .bind(id)
        .bind(seller_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Number of order lines referencing this product. Non-zero blocks deletion.
pub async fn count_order_items(pool: &SqlitePool, product_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?1")
        .bind(product_id)
        .fetch_one(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetch the active products for a set of ids (checkout price/seller lookup).
pub async fn find_active_by_ids(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<Product>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM products WHERE ativo = 1 AND id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
    builder.build_query_as().fetch_all(pool).await
}

pub async fn list_active(
    pool: &SqlitePool,
    categoria: Option<&str>,
) -> Result<Vec<Product>, sqlx::Error> {
    match categoria {
        Some(c) => {
            sqlx::query_as(
                "SELECT * FROM products WHERE ativo = 1 AND categoria = ?1 ORDER BY nome",
            )
            .bind(c)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as("SELECT * FROM products WHERE ativo = 1 ORDER BY nome")
                .fetch_all(pool)
                .await
        }
    }
}

pub async fn list_by_seller(
    pool: &SqlitePool,
    seller_id: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE seller_id = ?1 ORDER BY criado_em DESC")
        .bind(seller_id)
        .fetch_all(pool)
        .await
}

pub async fn list_active_by_seller(
    pool: &SqlitePool,
    seller_id: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE seller_id = ?1 AND ativo = 1 ORDER BY nome")
        .bind(seller_id)
        .fetch_all(pool)
        .await
}
