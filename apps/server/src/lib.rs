//! # Stockroom Server Library
//!
//! HTTP surface for purchase order receiving and inventory reconciliation.
//! The binary in `main.rs` only wires configuration, logging and the
//! listener; everything routable lives here so tests can drive the router
//! without a socket.
//!
//! ## Module Organization
//! ```text
//! stockroom_server/
//! ├── lib.rs          ◄─── You are here (state + router)
//! ├── config.rs       ◄─── Environment configuration
//! ├── dto.rs          ◄─── Request/response bodies and extractors
//! ├── error.rs        ◄─── ApiError → status code + JSON
//! └── handlers/       ◄─── One module per resource
//! ```
//!
//! ## Routes
//! ```text
//! POST   /purchase-orders                   create PO
//! GET    /purchase-orders?status=           list POs
//! GET    /purchase-orders/{id}              PO with lines
//! PUT    /purchase-orders/{id}              replace PO (Open/Pending, no invoices)
//! DELETE /purchase-orders/{id}              delete PO (no invoices)
//! POST   /purchase-orders/{id}/cancel       cancel PO
//! GET    /purchase-orders/{id}/invoices     invoices of a PO
//! POST   /receive                           book an invoice
//! POST   /invoice/cancel                    reverse an invoice
//! POST   /products/withdraw                 take stock out
//! POST   /products/manual-import            put stock in
//! GET    /products                          active catalog
//! GET    /products/low-stock                reorder list
//! GET    /products/{id}                     one product
//! GET    /products/{id}/transactions        ledger of a product
//! DELETE /products/{id}                     soft delete
//! GET    /categories                        category taxonomy
//! GET    /health                            liveness + database check
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use stockroom_db::Database;
use tower_http::trace::TraceLayer;

use handlers::{health, invoices, products, purchase_orders, receiving};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/purchase-orders",
            post(purchase_orders::create).get(purchase_orders::list),
        )
        .route(
            "/purchase-orders/{id}",
            get(purchase_orders::get)
                .put(purchase_orders::update)
                .delete(purchase_orders::delete),
        )
        .route("/purchase-orders/{id}/cancel", post(purchase_orders::cancel))
        .route("/purchase-orders/{id}/invoices", get(purchase_orders::invoices))
        .route("/receive", post(receiving::receive))
        .route("/invoice/cancel", post(invoices::cancel))
        .route("/products", get(products::list))
        .route("/products/withdraw", post(products::withdraw))
        .route("/products/manual-import", post(products::manual_import))
        .route("/products/low-stock", get(products::low_stock))
        .route(
            "/products/{id}",
            get(products::get).delete(products::deactivate),
        )
        .route("/products/{id}/transactions", get(products::transactions))
        .route("/categories", get(products::categories))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
