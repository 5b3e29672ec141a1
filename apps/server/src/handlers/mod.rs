//! # Handlers
//!
//! One module per resource. Each handler decodes its body, calls exactly one
//! repository or engine method on the shared [`Database`](stockroom_db::Database),
//! and maps the result to a DTO.
//!
//! ```text
//! handlers/
//! ├── purchase_orders.rs  ◄─── PO store: create, update, delete, cancel, reads
//! ├── receiving.rs        ◄─── POST /receive
//! ├── invoices.rs         ◄─── POST /invoice/cancel
//! ├── products.rs         ◄─── withdraw, manual import, catalog reads
//! └── health.rs           ◄─── GET /health
//! ```

pub mod health;
pub mod invoices;
pub mod products;
pub mod purchase_orders;
pub mod receiving;
