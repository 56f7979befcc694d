//! Delivery address endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::db;
use crate::db::addresses::{Address, AddressFields};
use crate::error::{ApiResponse, AppError, ErrorCode};
use crate::state::AppState;
use crate::util::now_millis;

use super::{ApiResult, db_error};

#[derive(Debug, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(min = 1))]
    pub logradouro: String,
    pub numero: Option<String>,
    #[validate(length(min = 1))]
    pub bairro: String,
    #[validate(length(min = 8, max = 9))]
    pub cep: String,
    #[validate(length(min = 1))]
    pub cidade: String,
    #[validate(length(min = 2, max = 2))]
    pub estado: String,
    pub complemento: Option<String>,
    pub referencia: Option<String>,
}

impl AddressRequest {
    fn fields(&self) -> AddressFields<'_> {
        AddressFields {
            logradouro: &self.logradouro,
            numero: self.numero.as_deref(),
            bairro: &self.bairro,
            cep: &self.cep,
            cidade: &self.cidade,
            estado: &self.estado,
            complemento: self.complemento.as_deref(),
            referencia: self.referencia.as_deref(),
        }
    }
}

/// GET /api/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Address>> {
    let addresses = db::addresses::list_for_user(&state.pool, current.id)
        .await
        .map_err(db_error)?;
    Ok(Json(addresses))
}

/// POST /api/addresses
pub async fn create_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddressRequest>,
) -> Result<(StatusCode, Json<Address>), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let id = db::addresses::create(&state.pool, current.id, &req.fields(), now_millis())
        .await
        .map_err(db_error)?;

    let address = db::addresses::find_for_user(&state.pool, id, current.id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::internal("Address vanished after insert"))?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// PUT /api/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<AddressRequest>,
) -> ApiResult<Address> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let updated = db::addresses::update(&state.pool, id, current.id, &req.fields())
        .await
        .map_err(db_error)?;
    if updated == 0 {
        return Err(AppError::not_found("Address"));
    }

    let address = db::addresses::find_for_user(&state.pool, id, current.id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::not_found("Address"))?;
    Ok(Json(address))
}

/// DELETE /api/addresses/{id}
///
/// Addresses referenced by orders cannot be removed; the order keeps pointing
/// at the delivery address it was placed with.
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    let deleted = match db::addresses::delete(&state.pool, id, current.id).await {
        Ok(n) => n,
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(AppError::new(ErrorCode::AddressHasOrders));
        }
        Err(e) => return Err(db_error(e)),
    };
    if deleted == 0 {
        return Err(AppError::not_found("Address"));
    }
    Ok(Json(ApiResponse::ok()))
}
