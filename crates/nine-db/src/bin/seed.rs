//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p nine-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p nine-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p nine-db --bin seed -- --db ./data/ninepos.db
//! ```
//!
//! ## Generated Products
//! Creates realistic product data across categories (Beverages, Snacks,
//! Dairy, Frozen, Grocery). Each product has:
//! - Unique SKU: `{CATEGORY}-{NAME}-{INDEX}`
//! - Realistic name with a size variant
//! - Price $1.99 - $9.99 plus size addon, cost at 60-80% of price
//! - Stock 0 - 100; stocked products get their opening ledger entry
//!
//! Products are created through the repository, so every nonzero opening
//! stock lands in the stock ledger the same way it would in production.

use std::env;

use nine_core::NewProduct;
use nine_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "BEV",
        "Beverages",
        &[
            "Cola", "Lemon Soda", "Ginger Ale", "Root Beer", "Energy Drink",
            "Sparkling Water", "Still Water", "Orange Juice", "Apple Juice",
            "Grape Juice", "Lemonade", "Iced Tea", "Cold Brew", "Oat Latte",
        ],
    ),
    (
        "SNK",
        "Snacks",
        &[
            "Classic Chips", "Nacho Chips", "Cheese Puffs", "Stacked Crisps",
            "Ridged Chips", "Tortilla Chips", "Corn Chips", "Chocolate Bar",
            "Candy Shells", "Peanut Cups", "Wafer Bar", "Caramel Bar",
            "Fruit Chews", "Gummy Bears", "Sandwich Cookies", "Mini Pretzels",
        ],
    ),
    (
        "DRY",
        "Dairy",
        &[
            "Whole Milk", "Semi-Skimmed Milk", "Skim Milk", "Almond Milk",
            "Oat Milk", "Cheddar Cheese", "Mozzarella", "Cream Cheese",
            "Butter", "Greek Yogurt", "Sour Cream", "Heavy Cream",
            "Eggs Dozen", "Cottage Cheese",
        ],
    ),
    (
        "FRZ",
        "Frozen",
        &[
            "Vanilla Ice Cream", "Chocolate Ice Cream", "Strawberry Ice Cream",
            "Mint Chip Ice Cream", "Frozen Pizza", "Frozen Burrito",
            "Ice Cream Bars", "Popsicles", "Frozen Vegetables", "Frozen Fruit",
            "Frozen Waffles", "Fish Sticks", "Chicken Nuggets", "Frozen Fries",
        ],
    ),
    (
        "GRO",
        "Grocery",
        &[
            "White Bread", "Wheat Bread", "Spaghetti", "Penne", "White Rice",
            "Brown Rice", "Canned Beans", "Canned Corn", "Canned Tomatoes",
            "Canned Soup", "Oat Cereal", "Oatmeal", "Peanut Butter", "Jelly",
            "Honey", "Flour", "Sugar", "Salt",
        ],
    ),
];

/// Size variants for products
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("12oz", 0),
    ("16oz", 50),
    ("2L", 150),
    ("6-Pack", 300),
    ("12-Pack", 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./ninepos_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("NinePOS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: ./ninepos_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 NinePOS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
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

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (code, category, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 1000 + name_idx * 20 + size_idx;
                let new = generate_product(code, category, name, size, *price_addon, seed);
                let sku = new.sku.clone();

                if let Err(e) = db.products().create(new).await {
                    eprintln!("Failed to insert {}: {}", sku, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Verify the opening ledger entries landed
    println!();
    println!("Verifying stock ledger...");
    let entries = db.ledger().count().await?;
    println!("  {} opening ledger entries", entries);

    let valuation = db.valuation().live_valuation().await?;
    println!(
        "  Inventory value: {} across {} categories",
        nine_core::Money::from_cents(valuation.grand_total_cents),
        valuation.categories.len()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(
    code: &str,
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    // Unique SKU from category code, squashed name prefix, and index
    let squashed: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let prefix: String = squashed.chars().take(3).collect();
    let sku = format!("{}-{}-{:03}", code, prefix.to_uppercase(), seed);

    // Price: base $1.99-$9.99 + size addon
    let price_cents = 199 + ((seed * 17) % 800) as i64 + price_addon;

    // Cost at 60-80% of price
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    NewProduct {
        sku,
        name: format!("{} {}", name, size),
        price_cents,
        cost_cents,
        category: category.to_string(),
        stock_quantity: (seed % 101) as i64,
        image_url: None,
    }
}
