//! Receiving handler.

use axum::{extract::State, Json};
use stockroom_core::ReceiptRequest;

use crate::dto::{ApiJson, ReceiveBody, Received};
use crate::error::ApiResult;
use crate::AppState;

/// `POST /receive`
///
/// Books one vendor invoice against a purchase order. Either every item is
/// received or none is.
pub async fn receive(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReceiveBody>,
) -> ApiResult<Json<Received>> {
    let request = ReceiptRequest::from(body);
    let receipt = state.db.receiving().receive(&request).await?;

    Ok(Json(Received {
        success: true,
        invoice_id: receipt.invoice.invoice_id,
        status: receipt.status,
    }))
}
