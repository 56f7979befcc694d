//! Login and current-user endpoints

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{self, CurrentUser};
use crate::db;
use crate::db::users::UserProfile;
use crate::error::{AppError, ErrorCode};
use crate::state::AppState;
use crate::util::verify_password;

use super::{ApiResult, db_error};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub senha: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = db::users::find_by_email(&state.pool, &req.email)
        .await
        .map_err(|e| {
            tracing::error!("Login query error: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.senha, &user.senha_hash) {
        return Err(AppError::invalid_credentials());
    }

    let token = auth::create_token(&user, &state.jwt_secret).map_err(|e| {
        tracing::error!("Token creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub nome_negocio: Option<String>,
    pub descricao_negocio: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}

/// PUT /api/auth/me
///
/// Replaces the business profile fields. Sellers cannot clear their business
/// name.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<UserProfile> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if current.is_seller() && req.nome_negocio.as_deref().unwrap_or("").trim().is_empty() {
        return Err(AppError::validation("Sellers must provide a business name")
            .with_detail("field", "nomeNegocio"));
    }

    let updated = db::users::update_profile(
        &state.pool,
        current.id,
        req.nome_negocio.as_deref(),
        req.descricao_negocio.as_deref(),
        req.logo_url.as_deref(),
    )
    .await
    .map_err(db_error)?;
    if updated == 0 {
        return Err(AppError::not_found("User"));
    }

    let user = db::users::find_by_id(&state.pool, current.id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(user.into()))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<UserProfile> {
    let user = db::users::find_by_id(&state.pool, current.id)
        .await
        .map_err(|e| {
            tracing::error!("User query error: {e}");
            AppError::new(ErrorCode::InternalError)
        })?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(Json(user.into()))
}
