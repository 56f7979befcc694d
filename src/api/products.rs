//! Product catalog and seller product management endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::db;
use crate::db::products::{Product, ProductFields};
use crate::error::{ApiResponse, AppError, ErrorCode};
use crate::state::AppState;
use crate::util::{now_millis, to_centavos};

use super::{ApiResult, db_error, require_seller};

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub categoria: Option<String>,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<Product>> {
    let products = db::products::list_active(&state.pool, query.categoria.as_deref())
        .await
        .map_err(db_error)?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    let product = db::products::find_by_id(&state.pool, id)
        .await
        .map_err(db_error)?
        .filter(|p| p.ativo)
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1))]
    pub nome: String,
    pub descricao: Option<String>,
    /// Decimal BRL amount, converted once to centavos
    pub preco: Decimal,
    #[validate(length(min = 1))]
    pub unidade_medida: String,
    /// Omitted means sold on demand (no stock tracking)
    pub estoque: Option<i64>,
    pub imagem_url: Option<String>,
    pub categoria: Option<String>,
}

impl ProductRequest {
    fn fields(&self) -> Result<ProductFields<'_>, AppError> {
        if self.preco.is_sign_negative() {
            return Err(AppError::new(ErrorCode::ProductInvalidPrice));
        }
        let preco_centavos = to_centavos(self.preco)
            .ok_or_else(|| AppError::new(ErrorCode::ProductInvalidPrice))?;
        if let Some(estoque) = self.estoque
            && estoque < 0
        {
            return Err(AppError::validation("Stock cannot be negative"));
        }
        Ok(ProductFields {
            nome: &self.nome,
            descricao: self.descricao.as_deref(),
            preco_centavos,
            unidade_medida: &self.unidade_medida,
            estoque: self.estoque,
            imagem_url: self.imagem_url.as_deref(),
            categoria: self.categoria.as_deref(),
        })
    }
}

/// POST /api/seller/products
pub async fn create_product(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    require_seller(&current)?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let id = db::products::create(&state.pool, current.id, &req.fields()?, now_millis())
        .await
        .map_err(db_error)?;

    let product = db::products::find_by_id(&state.pool, id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::internal("Product vanished after insert"))?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/seller/products
pub async fn list_my_products(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<Product>> {
    require_seller(&current)?;
    let products = db::products::list_by_seller(&state.pool, current.id)
        .await
        .map_err(db_error)?;
    Ok(Json(products))
}

/// PUT /api/seller/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Product> {
    require_seller(&current)?;
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let updated = db::products::update(&state.pool, id, current.id, &req.fields()?)
        .await
        .map_err(db_error)?;
    if updated == 0 {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }

    let product = db::products::find_by_id(&state.pool, id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
    Ok(Json(product))
}

/// DELETE /api/seller/products/{id}
///
/// Products referenced by order lines cannot be removed; their lines carry
/// frozen prices but still point at the product row.
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<()>> {
    require_seller(&current)?;

    let referenced = db::products::count_order_items(&state.pool, id)
        .await
        .map_err(db_error)?;
    if referenced > 0 {
        return Err(AppError::new(ErrorCode::ProductHasOrders));
    }

    // The FK on order_items backstops a line inserted between the check
    // and the delete
    let deleted = match db::products::delete(&state.pool, id, current.id).await {
        Ok(n) => n,
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(AppError::new(ErrorCode::ProductHasOrders));
        }
        Err(e) => return Err(db_error(e)),
    };
    if deleted == 0 {
        return Err(AppError::new(ErrorCode::ProductNotFound));
    }
    Ok(Json(ApiResponse::ok()))
}
