//! # Seed Data Generator
//!
//! Populates the database with demo inventory, a few days of sales and
//! some expenses for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./stockroom.db with 40 items (default)
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p stockroom-db --bin seed -- --count 100 --db ./data/stockroom.db
//! ```
//!
//! Items get an opening stock between 0 and 60, so some of them show up
//! as low stock straight away. Sales go through the same atomic path as
//! the server, so the ledger reconciles with the counters.

use anyhow::{Context, Result};
use std::env;
use stockroom_core::validation::{NewExpense, NewItem};
use stockroom_core::{Money, SaleRecord};
use stockroom_db::{Database, DbConfig, DbError};

/// (category, unit, names)
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "Beverages",
        "bottle",
        &["Cola", "Lemonade", "Orange Juice", "Iced Tea", "Mineral Water", "Ginger Ale"],
    ),
    (
        "Snacks",
        "pack",
        &["Potato Chips", "Pretzels", "Chocolate Bar", "Gummy Bears", "Popcorn", "Crackers"],
    ),
    (
        "Dairy",
        "pcs",
        &["Whole Milk", "Greek Yogurt", "Cheddar", "Butter", "Cream Cheese", "Eggs Dozen"],
    ),
    (
        "Frozen",
        "box",
        &["Vanilla Ice Cream", "Frozen Pizza", "Fish Sticks", "Frozen Peas", "Waffles"],
    ),
    (
        "Grocery",
        "kg",
        &["White Rice", "Spaghetti", "Flour", "Sugar", "Lentils", "Oats", "Coffee Beans"],
    ),
];

const EXPENSES: &[(&str, &str, i64)] = &[
    ("Shop rent", "Rent", 120_000),
    ("Electricity", "Utilities", 18_550),
    ("Delivery van fuel", "Transport", 6_420),
    ("Shelf labels", "Supplies", 1_999),
];

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 40;
    let mut db_path = String::from("./stockroom.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
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
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockroom.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.inventory().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut items = Vec::with_capacity(count);

    'outer: for round in 0.. {
        for (category_idx, (category, unit, names)) in CATEGORIES.iter().enumerate() {
            for (name_idx, name) in names.iter().enumerate() {
                if items.len() >= count {
                    break 'outer;
                }
                let seed = round * 100 + category_idx * 10 + name_idx;
                let new = generate_item(category, unit, name, round, seed);
                let item = db.inventory().create(&new).await?;
                items.push(item);
            }
        }
    }

    println!("✓ Generated {} items", items.len());

    let mut sold = 0;
    for (idx, item) in items.iter().enumerate() {
        let quantity = (idx % 3) as i64 + 1;
        let Some(price) = item.effective_price() else {
            continue;
        };
        let sale = SaleRecord::new(&item.id, quantity, price);
        match db.sales().record_atomic(&sale).await {
            Ok(_) => sold += 1,
            Err(DbError::InsufficientStock { .. }) => {}
            Err(e) => eprintln!("Failed to record sale for {}: {}", item.name, e),
        }
    }

    println!("✓ Recorded {} sales", sold);

    for (description, category, cents) in EXPENSES {
        db.expenses()
            .create(&NewExpense {
                description: description.to_string(),
                category: category.to_string(),
                amount: Money::from_cents(*cents),
                spent_at: None,
            })
            .await?;
    }

    println!("✓ Added {} expenses", EXPENSES.len());
    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    db.close().await;
    Ok(())
}

/// Generates one item with deterministic price and stock.
fn generate_item(category: &str, unit: &str, name: &str, round: usize, seed: usize) -> NewItem {
    // 0.99 - 9.98 purchase price, sold at a 25-45% markup
    let cost = 99 + ((seed * 37) % 900) as i64;
    let markup = 125 + (seed % 21) as i64;
    let price = cost * markup / 100;

    let name = if round == 0 {
        name.to_string()
    } else {
        format!("{} #{}", name, round + 1)
    };

    NewItem {
        name,
        category: category.to_string(),
        unit: unit.to_string(),
        opening_stock: ((seed * 7) % 61) as i64,
        selling_price: Some(Money::from_cents(price)),
        unit_price: Some(Money::from_cents(cost)),
    }
}
