//! Product handlers: stock movements outside purchase orders and catalog reads.

use axum::{
    extract::{Path, State},
    Json,
};
use stockroom_core::{ManualImportRequest, WithdrawRequest};

use crate::dto::{
    Ack, ApiJson, Imported, ManualImportBody, ProductDto, TransactionDto, WithdrawBody, Withdrawn,
};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `POST /products/withdraw`
pub async fn withdraw(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<WithdrawBody>,
) -> ApiResult<Json<Withdrawn>> {
    let current_stock = state
        .db
        .stock()
        .withdraw(&WithdrawRequest::from(body))
        .await?;

    Ok(Json(Withdrawn {
        success: true,
        current_stock,
    }))
}

/// `POST /products/manual-import`
pub async fn manual_import(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ManualImportBody>,
) -> ApiResult<Json<Imported>> {
    let product_id = state
        .db
        .stock()
        .manual_import(&ManualImportRequest::from(body))
        .await?;

    Ok(Json(Imported {
        success: true,
        product_id,
    }))
}

/// `GET /products`
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().list_active().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /products/low-stock`
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.db.products().low_stock().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// `GET /products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDto>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(product.into()))
}

/// `GET /products/{id}/transactions`
pub async fn transactions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TransactionDto>>> {
    if state.db.products().get_by_id(&id).await?.is_none() {
        return Err(ApiError::not_found("Product", &id));
    }

    let rows = state.db.ledger().for_product(&id).await?;
    Ok(Json(rows.into_iter().map(TransactionDto::from).collect()))
}

/// `DELETE /products/{id}`
///
/// Soft delete; history stays.
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state.db.products().deactivate(&id).await?;
    Ok(Json(Ack::ok()))
}

/// `GET /categories`
pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.categories().list().await?))
}
