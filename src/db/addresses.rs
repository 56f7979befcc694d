//! Delivery addresses

use serde::Serialize;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub logradouro: String,
    pub numero: Option<String>,
    pub bairro: String,
    pub cep: String,
    pub cidade: String,
    pub estado: String,
    pub complemento: Option<String>,
    pub referencia: Option<String>,
    pub criado_em: i64,
}

/// Fields shared by create and update operations.
pub struct AddressFields<'a> {
    pub logradouro: &'a str,
    pub numero: Option<&'a str>,
    pub bairro: &'a str,
    pub cep: &'a str,
    pub cidade: &'a str,
    pub estado: &'a str,
    pub complemento: Option<&'a str>,
    pub referencia: Option<&'a str>,
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    fields: &AddressFields<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO addresses (user_id, logradouro, numero, bairro, cep, cidade,
                                estado, complemento, referencia, criado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(user_id)
    .bind(fields.logradouro)
    .bind(fields.numero)
    .bind(fields.bairro)
    .bind(fields.cep)
    .bind(fields.cidade)
    .bind(fields.estado)
    .bind(fields.complemento)
    .bind(fields.referencia)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Address>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE user_id = ?1 ORDER BY criado_em")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

/// The consumer's default delivery address (oldest registered).
pub async fn first_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE user_id = ?1 ORDER BY criado_em, id LIMIT 1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_for_user(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
) -> Result<Option<Address>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM addresses WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    user_id: i64,
    fields: &AddressFields<'_>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE addresses
         SET logradouro = ?1, numero = ?2, bairro = ?3, cep = ?4, cidade = ?5,
             estado = ?6, complemento = ?7, referencia = ?8
         WHERE id = ?9 AND user_id = ?10",
    )
    .bind(fields.logradouro)
    .bind(fields.numero)
    .bind(fields.bairro)
    .bind(fields.cep)
    .bind(fields.cidade)
    .bind(fields.estado)
    .bind(fields.complemento)
    .bind(fields.referencia)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &SqlitePool, id: i64, user_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM addresses WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
