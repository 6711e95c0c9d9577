//! # Seed Data Generator
//!
//! Populates a database with a demo merchant for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p fitbell-db --bin seed
//!
//! # Specify database path
//! cargo run -p fitbell-db --bin seed -- --db ./data/fitbell.db
//! ```
//!
//! ## Generated Data
//! - Merchant "My Awesome Store" (`my-awesome-store`), default widget config
//! - The sample size chart (two entries per category)
//! - A handful of widget requests so the analytics charts have data

use std::sync::Arc;

use clap::Parser;
use fitbell_core::widget::WidgetEvent;
use fitbell_core::{SizeChart, SizeEntry};
use fitbell_db::{Dashboard, Database, DbConfig, EventSink, MerchantDirectory};

const DEMO_EMAIL: &str = "demo@fitbell.app";
const DEMO_BUSINESS: &str = "My Awesome Store";

/// (current size, needed size) pairs for sample size exchanges.
const SIZE_REQUESTS: &[(&str, &str)] = &[
    ("M", "L"),
    ("M", "L"),
    ("S", "M"),
    ("32", "34"),
    ("L", "XL"),
];

/// (current product, needed product) pairs for sample product exchanges.
const PRODUCT_REQUESTS: &[(&str, &str)] = &[
    ("Slim Jeans", "Relaxed Jeans"),
    ("", "Linen Shirt"),
    ("Slim Jeans", "Relaxed Jeans"),
];

const ASSISTANCE_REQUESTS: usize = 4;

/// Populate a fitbell database with a demo merchant.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "fitbell Seed Data Generator")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./fitbell_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Args { db: db_path } = Args::parse();

    println!("🌱 fitbell Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Arc::new(Database::new(DbConfig::new(&db_path)).await?);

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.find_merchant_by_email(DEMO_EMAIL).await?.is_some() {
        println!("⚠ Demo merchant {} already exists", DEMO_EMAIL);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut dashboard = Dashboard::new(db.clone());
    let merchant = dashboard.register_merchant(DEMO_EMAIL, DEMO_BUSINESS).await?;
    println!(
        "✓ Registered {} (slug: {})",
        merchant.business_name, merchant.business_slug
    );

    let chart = SizeChart::sample();
    let entries = chart
        .footwear
        .into_iter()
        .map(SizeEntry::Footwear)
        .chain(chart.tops.into_iter().map(SizeEntry::Tops))
        .chain(chart.bottoms.into_iter().map(SizeEntry::Bottoms));

    let sizes = db.sizes();
    let mut written = 0;
    for entry in entries {
        sizes.insert(&merchant.uid, &entry).await?;
        written += 1;
    }
    println!("✓ Wrote {} size chart entries", written);

    let mut recorded = 0;
    for (current, needed) in SIZE_REQUESTS {
        let event = WidgetEvent::SizeExchangeRequested {
            option_id: "2".to_string(),
            current_size: current.to_string(),
            needed_size: needed.to_string(),
        };
        db.record(&merchant.uid, &event).await?;
        recorded += 1;
    }
    for (current, needed) in PRODUCT_REQUESTS {
        let event = WidgetEvent::ProductExchangeRequested {
            option_id: "3".to_string(),
            current_product: current.to_string(),
            needed_product: needed.to_string(),
        };
        db.record(&merchant.uid, &event).await?;
        recorded += 1;
    }
    for _ in 0..ASSISTANCE_REQUESTS {
        let event = WidgetEvent::AssistanceRequested {
            option_id: "1".to_string(),
            label: "Call for assistance".to_string(),
        };
        db.record(&merchant.uid, &event).await?;
        recorded += 1;
    }
    println!("✓ Recorded {} sample requests", recorded);

    println!();
    println!("Widget: {}", merchant.widget_url("http://localhost:5173"));
    println!("✓ Seed complete!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args() {
        Args::command().debug_assert();

        assert_eq!(Args::parse_from(["seed"]).db, "./fitbell_dev.db");
        assert_eq!(Args::parse_from(["seed", "-d", "/tmp/x.db"]).db, "/tmp/x.db");
    }
}
