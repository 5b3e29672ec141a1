//! End-to-end tests driving the router with in-memory databases.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use stockroom_db::{Database, DbConfig};
use stockroom_server::{create_app, AppState};
use tower::ServiceExt;

async fn setup_app() -> Router {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database");
    create_app(AppState::new(db))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn laptop_po(po_id: &str) -> Value {
    json!({
        "PO_ID": po_id,
        "VendorName": "Acme IT Supply",
        "RequestDate": "2024-05-02",
        "DueDate": "2024-05-20",
        "RequestedBy": "alice",
        "Section": "IT Ops",
        "Items": [
            {"ItemName": "Laptop 14", "QtyOrdered": 10, "UnitCost": 120000}
        ]
    })
}

async fn create_po_and_line(app: &Router, po_id: &str) -> String {
    let (status, _) = send(app, "POST", "/purchase-orders", Some(laptop_po(po_id))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, po) = send(app, "GET", &format!("/purchase-orders/{}", po_id), None).await;
    po["Items"][0]["DetailID"].as_str().unwrap().to_string()
}

fn receive_body(po_id: &str, invoice_no: &str, detail_id: &str, qty: i64) -> Value {
    json!({
        "PO_ID": po_id,
        "InvoiceNo": invoice_no,
        "UserID": "bob",
        "ItemsReceived": [{"DetailID": detail_id, "Qty": qty}]
    })
}

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_create_and_fetch_purchase_order() {
    let app = setup_app().await;

    let (status, body) = send(&app, "POST", "/purchase-orders", Some(laptop_po("PO-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "PO_ID": "PO-1"}));

    let (status, po) = send(&app, "GET", "/purchase-orders/PO-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(po["Status"], "Open");
    assert_eq!(po["VendorName"], "Acme IT Supply");
    assert_eq!(po["Items"][0]["QtyOrdered"], 10);
    assert_eq!(po["OrderedTotal"], 1_200_000);

    let (status, dup) = send(&app, "POST", "/purchase-orders", Some(laptop_po("PO-1"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(dup["code"], "DUPLICATE_PURCHASE_ORDER");
}

#[tokio::test]
async fn test_invalid_purchase_order_is_400() {
    let app = setup_app().await;

    let mut body = laptop_po("PO-1");
    body["Items"] = json!([]);
    let (status, err) = send(&app, "POST", "/purchase-orders", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let (status, err) = send(&app, "POST", "/purchase-orders", Some(json!({"PO_ID": 7}))).await;
    assert!(status.is_client_error());
    assert_eq!(err["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_receive_cancel_round_trip() {
    let app = setup_app().await;
    let line = create_po_and_line(&app, "PO-1").await;

    let (status, first) = send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-1", &line, 4))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["Status"], "Partial");
    assert!(first["InvoiceID"].is_string());

    let (status, second) = send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-2", &line, 6))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["Status"], "Completed");

    let (_, po) = send(&app, "GET", "/purchase-orders/PO-1", None).await;
    let product_id = po["Items"][0]["ProductID"].as_str().unwrap().to_string();

    let (status, cancelled) = send(
        &app,
        "POST",
        "/invoice/cancel",
        Some(json!({"InvoiceNo": "INV-1", "UserID": "carol"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled, json!({"success": true, "Status": "Partial"}));

    let (_, product) = send(&app, "GET", &format!("/products/{}", product_id), None).await;
    assert_eq!(product["CurrentStock"], 6);
    assert_eq!(product["Category"], "Consumable");

    let (_, rows) = send(&app, "GET", &format!("/products/{}/transactions", product_id), None).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2]["TransType"], "OUT");
    assert_eq!(rows[2]["RefInfo"], "Cancel Invoice: INV-1 (PO: PO-1)");

    let (status, again) = send(
        &app,
        "POST",
        "/invoice/cancel",
        Some(json!({"InvoiceNo": "INV-1", "UserID": "carol"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "ALREADY_CANCELLED");

    let (_, invoices) = send(&app, "GET", "/purchase-orders/PO-1/invoices", None).await;
    assert_eq!(invoices.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_over_receipt_is_400_and_changes_nothing() {
    let app = setup_app().await;
    let line = create_po_and_line(&app, "PO-1").await;
    send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-1", &line, 8))).await;

    let (status, err) = send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-2", &line, 5))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "OVER_RECEIPT");

    let (_, po) = send(&app, "GET", "/purchase-orders/PO-1", None).await;
    assert_eq!(po["Items"][0]["QtyReceived"], 8);
    let (_, invoices) = send(&app, "GET", "/purchase-orders/PO-1/invoices", None).await;
    assert_eq!(invoices.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_huge_quantity_is_400_not_a_crash() {
    let app = setup_app().await;
    let line = create_po_and_line(&app, "PO-1").await;
    send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-1", &line, 1))).await;

    let (status, err) =
        send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-2", &line, i64::MAX))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let (_, po) = send(&app, "GET", "/purchase-orders/PO-1", None).await;
    assert_eq!(po["Items"][0]["QtyReceived"], 1);
}

#[tokio::test]
async fn test_duplicate_invoice_is_409() {
    let app = setup_app().await;
    let line = create_po_and_line(&app, "PO-1").await;
    send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-1", &line, 1))).await;

    let (status, err) = send(&app, "POST", "/receive", Some(receive_body("PO-1", "INV-1", &line, 1))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "DUPLICATE_INVOICE");
}

#[tokio::test]
async fn test_receive_unknown_po_is_404() {
    let app = setup_app().await;
    let (status, err) = send(&app, "POST", "/receive", Some(receive_body("PO-404", "INV-1", "x", 1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_update_and_cancel_rules() {
    let app = setup_app().await;

    create_po_and_line(&app, "PO-FREE").await;
    let mut changed = laptop_po("ignored");
    changed["VendorName"] = json!("Globex");
    let (status, saved) = send(&app, "PUT", "/purchase-orders/PO-FREE", Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["PO_ID"], "PO-FREE");
    let (status, _) = send(&app, "DELETE", "/purchase-orders/PO-FREE", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/purchase-orders/PO-FREE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let line = create_po_and_line(&app, "PO-USED").await;
    send(&app, "POST", "/receive", Some(receive_body("PO-USED", "INV-1", &line, 2))).await;

    let (status, err) = send(&app, "DELETE", "/purchase-orders/PO-USED", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "CONFLICT");

    let (status, err) = send(&app, "PUT", "/purchase-orders/PO-USED", Some(laptop_po("PO-USED"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_STATE");

    let (status, err) = send(&app, "POST", "/purchase-orders/PO-USED/cancel", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_STATE");

    let (status, err) = send(&app, "DELETE", "/purchase-orders/PO-NONE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = setup_app().await;
    let line = create_po_and_line(&app, "PO-A").await;
    create_po_and_line(&app, "PO-B").await;
    send(&app, "POST", "/receive", Some(receive_body("PO-A", "INV-1", &line, 1))).await;

    let (_, all) = send(&app, "GET", "/purchase-orders", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, partial) = send(&app, "GET", "/purchase-orders?status=partial", None).await;
    let partial = partial.as_array().unwrap();
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0]["PO_ID"], "PO-A");
    assert!(partial[0].get("Items").is_none());

    let (status, err) = send(&app, "GET", "/purchase-orders?status=lost", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_manual_import_withdraw_and_low_stock() {
    let app = setup_app().await;

    let (status, imported) = send(
        &app,
        "POST",
        "/products/manual-import",
        Some(json!({
            "ProductName": "Toner Cartridge",
            "Category": "Consumable",
            "Qty": 5,
            "UnitCost": 7900,
            "MinStock": 3,
            "MaxStock": 12,
            "UserID": "erin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let product_id = imported["ProductID"].as_str().unwrap().to_string();

    let withdraw = |qty: i64| {
        json!({"ProductID": product_id, "Qty": qty, "UserID": "frank", "RefInfo": "Printer 2F"})
    };

    let (status, left) = send(&app, "POST", "/products/withdraw", Some(withdraw(3))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left, json!({"success": true, "CurrentStock": 2}));

    let (status, err) = send(&app, "POST", "/products/withdraw", Some(withdraw(3))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");

    let (status, categories) = send(&app, "GET", "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(categories.as_array().unwrap().iter().any(|c| c == "Consumable"));

    let (_, low) = send(&app, "GET", "/products/low-stock", None).await;
    let low = low.as_array().unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0]["ProductName"], "Toner Cartridge");
    assert_eq!(low[0]["LowStock"], true);

    let (status, _) = send(&app, "DELETE", &format!("/products/{}", product_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&app, "GET", "/products", None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, err) = send(&app, "POST", "/products/withdraw", Some(json!({
        "ProductID": "missing", "Qty": 1, "UserID": "frank", "RefInfo": ""
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_manual_import_validation() {
    let app = setup_app().await;
    let (status, err) = send(
        &app,
        "POST",
        "/products/manual-import",
        Some(json!({"ProductName": "", "Qty": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        "POST",
        "/products/manual-import",
        Some(json!({"ProductName": "Cable", "Qty": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
