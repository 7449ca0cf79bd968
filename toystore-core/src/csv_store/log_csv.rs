//! Reader/writer for a single order replica's durable log file
//! (`spec.md` §6, "Order log CSV").
//!
//! Format: UTF-8, header `Order number, Product name, Quantity`, rows
//! appended in ascending order-number order. On read, any malformed row
//! (not exactly 3 fields, or absent/garbled header) resets the file to a
//! header-only state rather than failing startup — gaps and gap-filling via
//! recovery are the normal operating mode for this file (`spec.md` §9).

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const HEADER: &[&str] = &["Order number", "Product name", "Quantity"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub order_number: i64,
    pub product_name: String,
    pub quantity: i64,
}

/// Result of reading a replica's log file at startup.
pub struct LoadedLog {
    /// Every order number this file recorded, keyed for fast lookup.
    pub entries: BTreeMap<i64, (String, i64)>,
    /// `max(order_number) + 1`, or `0` if the file was empty/absent/invalid.
    pub next_order_number: i64,
}

/// Create a fresh, empty log file (header only).
pub fn write_header_only(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    writeln!(file, "{}", HEADER.join(","))?;
    Ok(())
}

/// Read the log file, resetting it to header-only on any corruption. If the
/// file does not exist, it is created.
pub fn read_or_reset(path: &Path) -> anyhow::Result<LoadedLog> {
    if !path.exists() {
        write_header_only(path)?;
        return Ok(LoadedLog { entries: BTreeMap::new(), next_order_number: 0 });
    }

    match try_read(path) {
        Ok(loaded) => Ok(loaded),
        Err(_) => {
            write_header_only(path)?;
            Ok(LoadedLog { entries: BTreeMap::new(), next_order_number: 0 })
        }
    }
}

fn try_read(path: &Path) -> anyhow::Result<LoadedLog> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    {
        let headers = reader.headers()?;
        if headers.iter().collect::<Vec<_>>() != HEADER {
            anyhow::bail!("log file {path:?} has unexpected header {headers:?}");
        }
    }

    let mut entries = BTreeMap::new();
    let mut max_order_number: i64 = -1;
    for record in reader.records() {
        let record = record?;
        if record.len() != 3 {
            anyhow::bail!("log file {path:?} has a row with {} fields", record.len());
        }
        let order_number: i64 = record[0].parse()?;
        let quantity: i64 = record[2].parse()?;
        entries.insert(order_number, (record[1].to_string(), quantity));
        max_order_number = max_order_number.max(order_number);
    }

    Ok(LoadedLog { entries, next_order_number: max_order_number + 1 })
}

/// Append `rows` (already known to be in ascending order-number order) to
/// the log file without touching existing content.
pub fn append(path: &Path, rows: &[LogRow]) -> anyhow::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    for row in rows {
        writer.write_record([
            row.order_number.to_string().as_str(),
            row.product_name.as_str(),
            row.quantity.to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log1.csv");
        let loaded = read_or_reset(&path).unwrap();
        assert!(loaded.entries.is_empty());
        assert_eq!(loaded.next_order_number, 0);
        assert!(path.exists());
    }

    #[test]
    fn appended_rows_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log1.csv");
        write_header_only(&path).unwrap();
        append(&path, &[
            LogRow { order_number: 0, product_name: "Tux".into(), quantity: 1 },
            LogRow { order_number: 1, product_name: "Gnu".into(), quantity: 2 },
        ]).unwrap();

        let loaded = read_or_reset(&path).unwrap();
        assert_eq!(loaded.next_order_number, 2);
        assert_eq!(loaded.entries.get(&0), Some(&("Tux".to_string(), 1)));
        assert_eq!(loaded.entries.get(&1), Some(&("Gnu".to_string(), 2)));
    }

    #[test]
    fn malformed_row_resets_to_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log1.csv");
        fs::write(&path, "Order number,Product name,Quantity\n0,Tux\n").unwrap();

        let loaded = read_or_reset(&path).unwrap();
        assert!(loaded.entries.is_empty());
        assert_eq!(loaded.next_order_number, 0);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "Order number,Product name,Quantity");
    }

    #[test]
    fn gap_in_order_numbers_is_preserved_not_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log1.csv");
        write_header_only(&path).unwrap();
        append(&path, &[LogRow { order_number: 5, product_name: "Tux".into(), quantity: 1 }]).unwrap();

        let loaded = read_or_reset(&path).unwrap();
        assert_eq!(loaded.next_order_number, 6);
        assert!(loaded.entries.get(&0).is_none());
        assert_eq!(loaded.entries.get(&5), Some(&("Tux".to_string(), 1)));
    }
}
