//! Registration and public seller listings

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth;
use crate::db;
use crate::db::users::{UserProfile, UserRole};
use crate::error::{AppError, ErrorCode};
use crate::state::AppState;
use crate::util::{hash_password, now_millis};

use super::{ApiResult, db_error};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2))]
    pub nome_completo: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub senha: String,
    #[validate(length(min = 11, max = 14))]
    pub cpf_cnpj: String,
    pub telefone: Option<String>,
    pub tipo_usuario: UserRole,
    pub nome_negocio: Option<String>,
    pub descricao_negocio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if req.tipo_usuario == UserRole::Vendedor
        && req.nome_negocio.as_deref().unwrap_or("").trim().is_empty()
    {
        return Err(AppError::validation("Sellers must provide a business name")
            .with_detail("field", "nomeNegocio"));
    }

    let senha_hash = hash_password(&req.senha).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let user_id = match db::users::create(
        &state.pool,
        &req.nome_completo,
        &req.email,
        &senha_hash,
        &req.cpf_cnpj,
        req.telefone.as_deref(),
        req.tipo_usuario,
        req.nome_negocio.as_deref(),
        req.descricao_negocio.as_deref(),
        now_millis(),
    )
    .await
    {
        Ok(id) => id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::already_exists("Account"));
        }
        Err(e) => return Err(db_error(e)),
    };

    let user = db::users::find_by_id(&state.pool, user_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::internal("User vanished after insert"))?;

    let token = auth::create_token(&user, &state.jwt_secret).map_err(|e| {
        tracing::error!("Token creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id, tipo = user.tipo_usuario.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Public seller storefront view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub id: i64,
    pub nome_negocio: Option<String>,
    pub descricao_negocio: Option<String>,
    pub logo_url: Option<String>,
}

/// GET /api/sellers
pub async fn list_sellers(State(state): State<AppState>) -> ApiResult<Vec<SellerProfile>> {
    let sellers = db::users::list_sellers(&state.pool)
        .await
        .map_err(db_error)?;

    Ok(Json(
        sellers
            .into_iter()
            .map(|u| SellerProfile {
                id: u.id,
                nome_negocio: u.nome_negocio,
                descricao_negocio: u.descricao_negocio,
                logo_url: u.logo_url,
            })
            .collect(),
    ))
}

/// GET /api/sellers/{id} — storefront with the seller's active products
#[derive(Debug, Serialize)]
pub struct SellerDetail {
    #[serde(flatten)]
    pub seller: SellerProfile,
    pub products: Vec<db::products::Product>,
}

pub async fn get_seller(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<SellerDetail> {
    let seller = db::users::find_seller(&state.pool, id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("Seller"))?;

    let products = db::products::list_active_by_seller(&state.pool, id)
        .await
        .map_err(db_error)?;

    Ok(Json(SellerDetail {
        seller: SellerProfile {
            id: seller.id,
            nome_negocio: seller.nome_negocio,
            descricao_negocio: seller.descricao_negocio,
            logo_url: seller.logo_url,
        },
        products,
    }))
}
