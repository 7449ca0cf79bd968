//! Reader/writer for the catalog CSV file (`spec.md` §6, "Catalog CSV").
//!
//! Format: UTF-8, header `product_name, price, quantity`, one row per
//! product. `price` is kept as the two-fractional-digit decimal string the
//! file carries on disk; callers that need arithmetic convert it to
//! [`rust_decimal::Decimal`] themselves (see `toystore-catalog::table`).

use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub product_name: String,
    pub price: String,
    pub quantity: i64,
}

const HEADER: &[&str] = &["product_name", "price", "quantity"];

/// Read the full catalog file. Returns an error if the file is missing, the
/// header doesn't match, or any row fails to parse — unlike the order log,
/// the catalog file is expected to be a valid seed produced ahead of time
/// (`toystore-bins::seed-catalog`), so a malformed file is a deployment
/// error worth failing loudly on rather than silently discarding.
pub fn read_catalog(path: &Path) -> anyhow::Result<Vec<CatalogRow>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    {
        let headers = reader.headers()?;
        if headers.iter().collect::<Vec<_>>() != HEADER {
            anyhow::bail!("catalog file {path:?} has unexpected header {headers:?}");
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 3 {
            anyhow::bail!("catalog file {path:?} has a row with {} fields", record.len());
        }
        let quantity: i64 = record[2]
            .parse()
            .map_err(|_| anyhow::anyhow!("catalog file {path:?} has a non-integer quantity"))?;
        rows.push(CatalogRow {
            product_name: record[0].to_string(),
            price: record[1].to_string(),
            quantity,
        });
    }
    Ok(rows)
}

/// Atomically replace the catalog file with `header + rows` in the given
/// order, per `spec.md` §6 ("On write, the entire file is replaced"). Writes
/// to a sibling temp file and renames over the target so a crash mid-write
/// never leaves a truncated catalog file behind.
pub fn write_catalog(path: &Path, rows: &[CatalogRow]) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new().from_path(&tmp_path)?;
        writer.write_record(HEADER)?;
        for row in rows {
            writer.write_record([
                row.product_name.as_str(),
                row.price.as_str(),
                row.quantity.to_string().as_str(),
            ])?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Write a brand-new, empty catalog file (header only). Used by
/// `seed-catalog` and by tests.
pub fn write_header_only(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", HEADER.join(","))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let rows = vec![
            CatalogRow { product_name: "Tux".into(), price: "19.99".into(), quantity: 100 },
            CatalogRow { product_name: "Gnu".into(), price: "25.00".into(), quantity: 0 },
        ];
        write_catalog(&path, &rows).unwrap();
        let read_back = read_catalog(&path).unwrap();
        assert_eq!(read_back, rows);
    }

    #[test]
    fn rejects_malformed_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(&path, "name,price\nTux,19.99\n").unwrap();
        assert!(read_catalog(&path).is_err());
    }

    #[test]
    fn rejects_non_integer_quantity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(&path, "product_name,price,quantity\nTux,19.99,lots\n").unwrap();
        assert!(read_catalog(&path).is_err());
    }
}
