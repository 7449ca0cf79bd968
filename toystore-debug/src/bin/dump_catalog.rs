//! Pretty-print (or validate) a catalog CSV file without starting any
//! service, replacing the ad hoc prints `catalog.py` scattered through its
//! startup path in the original implementation.

use std::path::PathBuf;

use clap::Parser;
use toystore_core::csv_store::catalog_csv;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dump or validate a catalog CSV file")]
struct Args {
    /// Path to the catalog CSV file
    path: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let rows = match catalog_csv::read_catalog(&args.path) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("{}: invalid catalog file: {err}", args.path.display());
            std::process::exit(1);
        }
    };

    if args.json {
        let payload: Vec<_> = rows
            .iter()
            .map(|row| serde_json::json!({"product_name": row.product_name, "price": row.price, "quantity": row.quantity}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{:<24} {:>10} {:>10}", "product_name", "price", "quantity");
    for row in &rows {
        println!("{:<24} {:>10} {:>10}", row.product_name, row.price, row.quantity);
    }
    println!("\n{} products", rows.len());
    Ok(())
}
