//! # Seed Data Generator
//!
//! Populates the database with a few shops, a stocked catalog, and a
//! day of trade for development.
//!
//! ## Usage
//! ```bash
//! # Seed into the default dev database
//! cargo run -p shopstock-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopstock-db --bin seed -- --db ./data/shopstock.db
//! ```
//!
//! Everything goes through the public repositories, so the seeded data
//! carries a full audit trail and realistic stock levels.

use std::env;

use shopstock_core::{Actor, CartLine, PurchaseLine};
use shopstock_db::{Database, DbConfig};

const SHOPS: &[&str] = &["Downtown", "Riverside", "Airport Kiosk"];

/// (name, restock quantity, unit cost cents, sale price cents)
const PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("Coca-Cola 330ml", 120, 95, 180),
    ("Pepsi 330ml", 100, 90, 175),
    ("Still Water 500ml", 200, 40, 110),
    ("Orange Juice 1L", 60, 210, 350),
    ("Lays Classic", 80, 110, 220),
    ("Doritos Nacho", 80, 115, 230),
    ("Snickers", 150, 70, 150),
    ("Kit Kat", 150, 65, 145),
    ("Oreos", 90, 140, 260),
    ("Chewing Gum", 300, 30, 90),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./shopstock_dev.db");

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
                println!("Shopstock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopstock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Shopstock Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.catalog().list_shops().await?.is_empty() {
        println!("⚠ Database already has shops");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = Actor::new(1, "admin");
    let cashier = Actor::new(2, "cashier");

    // Shops first, then restock each one.
    let mut shop_ids = Vec::new();
    for name in SHOPS {
        let shop_id = db.catalog().create_shop(name, &admin).await?;
        shop_ids.push(shop_id);
    }
    println!("✓ Created {} shops", shop_ids.len());

    for (idx, &shop_id) in shop_ids.iter().enumerate() {
        let lines: Vec<PurchaseLine> = PRODUCTS
            .iter()
            .map(|(name, qty, cost, _)| {
                // Stagger quantities a little per shop.
                PurchaseLine::new(*name, qty / (idx as i64 + 1), *cost)
            })
            .collect();
        db.purchases().record_purchase(shop_id, &lines, &admin).await?;
    }
    println!(
        "✓ Restocked {} products at each shop",
        PRODUCTS.len()
    );

    // A spread of small invoices at the first shop.
    let shop_id = shop_ids[0];
    let mut sales = 0;
    for (n, (name, _, _, price)) in PRODUCTS.iter().enumerate() {
        let product_id = db.catalog().find_or_create_product(name).await?;
        let cart = vec![CartLine {
            product_id,
            name: name.to_string(),
            price_cents: *price,
            quantity: (n as i64 % 3) + 1,
        }];
        db.sales().record_sale(shop_id, &cart, &cashier).await?;
        sales += 1;
    }
    println!("✓ Recorded {} sales at {}", sales, SHOPS[0]);

    let today = chrono::Utc::now().date_naive();
    let report = db.reports().profit_report(shop_id, today, today).await?;
    println!();
    println!("Today's profit at {}:", SHOPS[0]);
    for row in &report {
        println!(
            "  {:<20} sold {:>3}  profit {}",
            row.product_name,
            row.qty_sold,
            shopstock_core::Money::from_cents(row.total_profit_cents()),
        );
    }

    println!();
    println!("✓ Seed complete!");
    Ok(())
}
