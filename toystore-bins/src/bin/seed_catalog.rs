//! Writes a fresh catalog CSV: header plus one row per built-in toy name,
//! each with a random price in `[10.00, 30.00)` and starting quantity 100.
//!
//! A dev-time convenience, not part of the runtime core (`spec.md` §1
//! treats seed generation as out of scope for the catalog engine itself) —
//! mirrors `original_source/src/catalog/make_initial_csv.py`.

use std::path::PathBuf;

use clap::Parser;
use rand::Rng;

use toystore_core::csv_store::catalog_csv::{self, CatalogRow};

const TOY_NAMES: &[&str] = &[
    "Tux",
    "RubiksCube",
    "ToySoldier",
    "JackInTheBox",
    "YoYo",
    "SpinningTop",
    "TeddyBear",
    "ToyTrain",
    "BuildingBlocks",
    "KiteRunner",
    "PlayDough",
    "ToySailboat",
    "WoodenHorse",
    "PaperAirplane",
    "Marbles",
    "ToyDrum",
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Write a fresh seed catalog.csv")]
struct Args {
    /// Output path for the generated catalog file
    #[arg(short, long, default_value = "data/catalog.csv")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut rng = rand::thread_rng();

    let rows: Vec<CatalogRow> = TOY_NAMES
        .iter()
        .map(|name| CatalogRow {
            product_name: name.to_string(),
            price: format!("{:.2}", rng.gen_range(10.0..30.0)),
            quantity: 100,
        })
        .collect();

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    catalog_csv::write_catalog(&args.out, &rows)?;
    println!("wrote {} products to {}", rows.len(), args.out.display());
    Ok(())
}
