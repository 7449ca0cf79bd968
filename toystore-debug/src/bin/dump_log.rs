//! Pretty-print (or validate) an order replica's log CSV file without
//! starting a replica and, unlike the runtime's own loader, without
//! resetting the file on corruption — the whole point of this tool is to
//! look at a bad file before it gets reset.

use std::path::PathBuf;

use clap::Parser;

const HEADER: &[&str] = &["Order number", "Product name", "Quantity"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Dump or validate an order log CSV file")]
struct Args {
    /// Path to the order log CSV file
    path: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

struct Row {
    order_number: String,
    product_name: String,
    quantity: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&args.path)?;
    let headers = reader.headers()?.iter().collect::<Vec<_>>();
    if headers != HEADER {
        eprintln!("{}: unexpected header {headers:?}, this file would be reset on replica startup", args.path.display());
        std::process::exit(1);
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != 3 {
            eprintln!(
                "{}: row {} has {} fields, this file would be reset on replica startup",
                args.path.display(),
                line + 1,
                record.len()
            );
            std::process::exit(1);
        }
        rows.push(Row {
            order_number: record[0].to_string(),
            product_name: record[1].to_string(),
            quantity: record[2].to_string(),
        });
    }

    if args.json {
        let payload: Vec<_> = rows
            .iter()
            .map(|row| serde_json::json!({"order_number": row.order_number, "product_name": row.product_name, "quantity": row.quantity}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{:<12} {:<24} {:>10}", "order_number", "product_name", "quantity");
    for row in &rows {
        println!("{:<12} {:<24} {:>10}", row.order_number, row.product_name, row.quantity);
    }
    println!("\n{} orders", rows.len());
    Ok(())
}
