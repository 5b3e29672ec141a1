//! Invoice handlers.

use axum::{extract::State, Json};
use stockroom_core::CancelInvoiceRequest;

use crate::dto::{ApiJson, CancelInvoiceBody, InvoiceCancelled};
use crate::error::ApiResult;
use crate::AppState;

/// `POST /invoice/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CancelInvoiceBody>,
) -> ApiResult<Json<InvoiceCancelled>> {
    let request = CancelInvoiceRequest::from(body);
    let reversal = state.db.reversal().cancel_invoice(&request).await?;

    Ok(Json(InvoiceCancelled {
        success: true,
        status: reversal.status,
    }))
}
