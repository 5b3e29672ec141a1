//! Purchase order handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use stockroom_core::PoStatus;
use tracing::debug;

use crate::dto::{Ack, ApiJson, ApiQuery, InvoiceDto, ListQuery, PoSaved, PurchaseOrderBody, PurchaseOrderDto};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// `POST /purchase-orders`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PurchaseOrderBody>,
) -> ApiResult<Json<PoSaved>> {
    let (header, items) = body.into_parts();
    let created = state.db.purchase_orders().create(&header, &items).await?;

    Ok(Json(PoSaved {
        success: true,
        po_id: created.header.po_id,
    }))
}

/// `PUT /purchase-orders/{id}`
///
/// The id in the path wins over any `PO_ID` in the body.
pub async fn update(
    State(state): State<AppState>,
    Path(po_id): Path<String>,
    ApiJson(body): ApiJson<PurchaseOrderBody>,
) -> ApiResult<Json<PoSaved>> {
    let (header, items) = body.into_parts();
    let updated = state
        .db
        .purchase_orders()
        .update(&po_id, &header, &items)
        .await?;

    Ok(Json(PoSaved {
        success: true,
        po_id: updated.header.po_id,
    }))
}

/// `DELETE /purchase-orders/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(po_id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state.db.purchase_orders().delete(&po_id).await?;
    Ok(Json(Ack::ok()))
}

/// `POST /purchase-orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    Path(po_id): Path<String>,
) -> ApiResult<Json<Ack>> {
    state.db.purchase_orders().cancel(&po_id).await?;
    Ok(Json(Ack::ok()))
}

/// `GET /purchase-orders/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(po_id): Path<String>,
) -> ApiResult<Json<PurchaseOrderDto>> {
    let view = state
        .db
        .purchase_orders()
        .get(&po_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Purchase order", &po_id))?;

    Ok(Json(view.into()))
}

/// `GET /purchase-orders?status=partial`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<PurchaseOrderDto>>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<PoStatus>)
        .transpose()?;
    debug!(?status, "Listing purchase orders");

    let orders = state.db.purchase_orders().list(status).await?;
    Ok(Json(orders.into_iter().map(PurchaseOrderDto::from).collect()))
}

/// `GET /purchase-orders/{id}/invoices`
pub async fn invoices(
    State(state): State<AppState>,
    Path(po_id): Path<String>,
) -> ApiResult<Json<Vec<InvoiceDto>>> {
    if state.db.purchase_orders().get(&po_id).await?.is_none() {
        return Err(ApiError::not_found("Purchase order", &po_id));
    }

    let invoices = state.db.invoices().list_for_po(&po_id).await?;
    Ok(Json(invoices.into_iter().map(InvoiceDto::from).collect()))
}
