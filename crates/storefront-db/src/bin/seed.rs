//! # Seed Data Loader
//!
//! Populates the database with the demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p storefront-db --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! Seeding is skipped when products already exist, so it is safe to run on
//! every dev-environment start.

use std::env;

use storefront_core::NewProduct;
use storefront_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// The demo catalog.
fn demo_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            title: "Wireless Mouse".to_string(),
            description: Some("Ergonomic wireless mouse with long battery life".to_string()),
            price_cents: 2599,
            inventory: 50,
            image: Some("https://img.example.com/products/wireless-mouse.jpg".to_string()),
        },
        NewProduct {
            title: "Mechanical Keyboard".to_string(),
            description: Some("RGB backlit mechanical keyboard, blue switches".to_string()),
            price_cents: 7999,
            inventory: 30,
            image: Some("https://img.example.com/products/mechanical-keyboard.jpg".to_string()),
        },
        NewProduct {
            title: "Noise Cancelling Headphones".to_string(),
            description: Some("Over-ear headphones with active noise cancellation".to_string()),
            price_cents: 19999,
            inventory: 20,
            image: Some("https://img.example.com/products/headphones.jpg".to_string()),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront_dev.db");

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
                println!("Storefront Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Storefront Seed Data Loader");
    println!("===========================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding products...");

    for new in demo_products() {
        let product = db.products().insert(&new).await?;
        println!("  #{} {} ({} in stock)", product.id, product.title, product.inventory);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
