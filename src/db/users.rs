//! User accounts (consumers and sellers)

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Account kind, stored as TEXT and serialized in lowercase Portuguese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    Consumidor,
    Vendedor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consumidor => "consumidor",
            Self::Vendedor => "vendedor",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub nome_completo: String,
    pub email: String,
    pub senha_hash: String,
    pub cpf_cnpj: String,
    pub telefone: Option<String>,
    pub tipo_usuario: UserRole,
    pub nome_negocio: Option<String>,
    pub descricao_negocio: Option<String>,
    pub logo_url: Option<String>,
    pub criado_em: i64,
}

/// Public view of a user, safe to return from the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub nome_completo: String,
    pub email: String,
    pub telefone: Option<String>,
    pub tipo_usuario: UserRole,
    pub nome_negocio: Option<String>,
    pub descricao_negocio: Option<String>,
    pub logo_url: Option<String>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            nome_completo: u.nome_completo,
            email: u.email,
            telefone: u.telefone,
            tipo_usuario: u.tipo_usuario,
            nome_negocio: u.nome_negocio,
            descricao_negocio: u.descricao_negocio,
            logo_url: u.logo_url,
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &SqlitePool,
    nome_completo: &str,
    email: &str,
    senha_hash: &str,
    cpf_cnpj: &str,
    telefone: Option<&str>,
    tipo_usuario: UserRole,
    nome_negocio: Option<&str>,
    descricao_negocio: Option<&str>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (nome_completo, email, senha_hash, cpf_cnpj, telefone,
                            tipo_usuario, nome_negocio, descricao_negocio, criado_em)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(nome_completo)
    .bind(email)
    .bind(senha_hash)
    .bind(cpf_cnpj)
    .bind(telefone)
    .bind(tipo_usuario)
    .bind(nome_negocio)
    .bind(descricao_negocio)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Replace the user's business profile fields.
pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    nome_negocio: Option<&str>,
    descricao_negocio: Option<&str>,
    logo_url: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET nome_negocio = ?1, descricao_negocio = ?2, logo_url = ?3 WHERE id = ?4",
    )
    .bind(nome_negocio)
    .bind(descricao_negocio)
    .bind(logo_url)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_sellers(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE tipo_usuario = 'vendedor' ORDER BY nome_negocio")
        .fetch_all(pool)
        .await
}

pub async fn find_seller(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?1 AND tipo_usuario = 'vendedor'")
        .bind(id)
        .fetch_optional(pool)
        .await
}
