//! # Seed Data Loader
//!
//! Populates the ERP store with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Master data only (3 products, 2 clients)
//! cargo run -p erp-db --bin seed
//!
//! # Master data plus 90 days of validated history
//! cargo run -p erp-db --bin seed -- --massive
//!
//! # Specify database path and a reproducible history
//! cargo run -p erp-db --bin seed -- --db ./data/erp.db --massive --rng-seed 42
//! ```

use std::env;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use erp_db::seed::{seed_massive_data, seed_master_data};
use erp_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./erp_dev.db");
    let mut massive = false;
    let mut rng_seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--massive" | "-m" => massive = true,
            "--rng-seed" => {
                if i + 1 < args.len() {
                    rng_seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Distribution ERP Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./erp_dev.db)");
                println!("  -m, --massive        Also load 50 validated historical orders");
                println!("      --rng-seed <N>   Seed for the generated history");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Distribution ERP Seed Data Loader");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let master = seed_master_data(&db).await?;
    if master.created {
        println!(
            "✓ Master data: {} products, {} clients",
            master.products, master.clients
        );
    } else {
        println!("⚠ Master data already present, skipped");
    }

    if massive {
        let mut rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let history = seed_massive_data(&db, Utc::now(), &mut rng).await?;
        if history.created {
            println!(
                "✓ History: {} products, {} clients, {} validated orders",
                history.products, history.clients, history.orders
            );
        } else {
            println!("⚠ History already present, skipped");
        }
    }

    db.close().await;
    println!();
    println!("✓ Seed complete! Run the ETL to refresh the warehouse.");

    Ok(())
}
