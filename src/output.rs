//! Tabular exports of pipeline results.
//!
//! Supports pretty-printing, JSON serialization, and CSV files for the
//! station catalog and the stock table.

use csv::WriterBuilder;
use std::io::Write;
use tracing::{debug, info};

use crate::catalog::StationCatalog;
use crate::error::Result;
use crate::inventory::StockTable;
use crate::profile::StationProfile;

/// Logs a station profile using Rust's debug pretty-print format.
pub fn print_pretty(profile: &StationProfile) {
    debug!("{:#?}", profile);
}

/// Logs a station profile as pretty-printed JSON.
pub fn print_json(profile: &StationProfile) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}

/// Writes one row per catalogued station.
pub fn write_catalog<W: Write>(writer: W, catalog: &StationCatalog) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for station in catalog.stations() {
        writer.serialize(station)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the stock table with a `time` column followed by one column per
/// station id. Empty cells stay empty.
pub fn write_stock_table<W: Write>(writer: W, table: &StockTable) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut header = vec!["time".to_string()];
    header.extend(table.station_ids().iter().map(|id| id.to_string()));
    writer.write_record(&header)?;

    for (time, row) in table.times().iter().zip(table.rows()) {
        let mut record = vec![time.format("%H:%M:%S").to_string()];
        record.extend(row.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes `table` into it.
pub fn save_stock_table(path: &str, table: &StockTable) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_stock_table(file, table)?;
    info!(path, buckets = table.len(), "Stock table written");
    Ok(())
}

/// Creates (or truncates) `path` and writes `catalog` into it.
pub fn save_catalog(path: &str, catalog: &StationCatalog) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_catalog(file, catalog)?;
    info!(path, stations = catalog.len(), "Station catalog written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::trip;
    use chrono::NaiveTime;
    use std::collections::BTreeMap;

    fn sample_table() -> StockTable {
        let t0 = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let t1 = NaiveTime::from_hms_opt(8, 15, 0).unwrap();
        StockTable::from_columns(vec![
            (72, BTreeMap::from([(t0, 11.0), (t1, 10.5)])),
            (79, BTreeMap::from([(t1, 13.0)])),
        ])
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        let profile = StationProfile {
            station_id: 1,
            station_name: "A".to_string(),
            returns: BTreeMap::new(),
            borrows: BTreeMap::new(),
            stock: BTreeMap::new(),
        };
        print_pretty(&profile);
        print_json(&profile).unwrap();
    }

    #[test]
    fn test_write_stock_table() {
        let mut buf = Vec::new();
        write_stock_table(&mut buf, &sample_table()).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["time,72,79", "08:00:00,11,", "08:15:00,10.5,13"]);
    }

    #[test]
    fn test_write_catalog_header_once() {
        let trips = vec![trip(1, "2017-06-01 08:00:00", 2, "2017-06-01 08:10:00")];
        let catalog = StationCatalog::from_trips(&trips, "LPI Facility");

        let mut buf = Vec::new();
        write_catalog(&mut buf, &catalog).unwrap();

        let content = String::from_utf8(buf).unwrap();
        let header_count = content.lines().filter(|l| l.contains("station id")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_save_stock_table_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.csv");
        let path = path.to_str().unwrap();

        save_stock_table(path, &sample_table()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("time,72,79"));
    }
}
