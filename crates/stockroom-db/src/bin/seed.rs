//! # Seed Data Generator
//!
//! Populates a database with a small IT stockroom for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom_dev.db (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! ## Generated Data
//! - Products across a few categories, imported through the stock engine so
//!   every unit on hand has a ledger row
//! - One open purchase order mixing catalog items and a brand-new item
//!
//! Does nothing if the database already has products.

use std::env;

use anyhow::Context;
use chrono::{Days, Utc};
use stockroom_core::{ManualImportRequest, NewPoItem, PoStatus, PurchaseOrderHeader};
use stockroom_db::{Database, DbConfig};

/// (name, category, qty, unit cost in cents, min stock, max stock)
const PRODUCTS: &[(&str, &str, i64, i64, i64, i64)] = &[
    ("Laptop 14\" i5", "Computer", 6, 89_000, 2, 15),
    ("Laptop 16\" i7", "Computer", 2, 145_000, 1, 6),
    ("Desktop Mini PC", "Computer", 4, 62_000, 1, 10),
    ("27\" Monitor", "Display", 8, 24_900, 3, 20),
    ("USB-C Dock", "Peripheral", 3, 15_500, 4, 20),
    ("Wireless Mouse", "Peripheral", 25, 1_900, 10, 60),
    ("Wireless Keyboard", "Peripheral", 18, 3_400, 8, 40),
    ("Headset with Mic", "Peripheral", 5, 4_800, 5, 25),
    ("Cat6 Patch Cable 2m", "Network", 120, 350, 40, 300),
    ("24-port Switch", "Network", 1, 38_000, 1, 3),
    ("A4 Paper Ream", "Consumable", 40, 450, 20, 100),
    ("Toner Cartridge", "Consumable", 2, 7_900, 4, 12),
];

const SEED_USER: &str = "seed";
const SEED_PO: &str = "PO-SEED-001";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./stockroom_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockroom Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Importing products...");

    let mut ids = Vec::with_capacity(PRODUCTS.len());
    for (name, category, qty, cost, min, max) in PRODUCTS {
        let id = db
            .stock()
            .manual_import(&ManualImportRequest {
                product_name: name.to_string(),
                category: Some(category.to_string()),
                qty: *qty,
                unit_cost_cents: *cost,
                min_stock: *min,
                max_stock: *max,
                user_id: Some(SEED_USER.to_string()),
            })
            .await
            .with_context(|| format!("importing {}", name))?;
        ids.push(id);
    }
    println!("✓ Imported {} products", ids.len());

    let today = Utc::now().date_naive();
    let header = PurchaseOrderHeader {
        po_id: SEED_PO.to_string(),
        vendor_name: "Acme IT Supply".to_string(),
        request_date: Some(today),
        due_date: today.checked_add_days(Days::new(14)),
        requested_by: Some("it-ops".to_string()),
        section: Some("IT Operations".to_string()),
        budget_no: Some("BUD-2024-IT".to_string()),
        pr_no: Some("PR-0001".to_string()),
        remark: Some("Seed order for manual testing".to_string()),
        status: Some(PoStatus::Open),
    };
    let items = [
        NewPoItem {
            item_name: "USB-C Dock".to_string(),
            product_id: ids.get(4).cloned(),
            qty_ordered: 10,
            unit_cost_cents: 15_000,
        },
        NewPoItem {
            item_name: "Toner Cartridge".to_string(),
            product_id: ids.get(11).cloned(),
            qty_ordered: 6,
            unit_cost_cents: 7_500,
        },
        NewPoItem {
            item_name: "Webcam 1080p".to_string(),
            product_id: None,
            qty_ordered: 5,
            unit_cost_cents: 5_900,
        },
    ];

    let po = db.purchase_orders().create(&header, &items).await?;
    println!(
        "✓ Created {} with {} lines ({})",
        po.header.po_id,
        po.lines.len(),
        po.ordered_total
    );

    let low = db.products().low_stock().await?;
    println!("  Low stock: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
