//! Marks stations whose expected stock leaves the healthy band.

use crate::inventory::StockTable;

/// 1.0 where a station is short of or overflowing with bikes, else 0.0.
///
/// Same shape as the [`StockTable`] it was derived from. Consumed as a
/// marker opacity channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMask {
    rows: Vec<Vec<f64>>,
}

impl ThresholdMask {
    pub fn from_table(table: &StockTable, low: f64, high: f64) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| flag(*cell, low, high)).collect())
            .collect();
        Self { rows }
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of flagged (station, time) cells.
    pub fn flagged(&self) -> usize {
        self.rows.iter().flatten().filter(|v| **v > 0.0).count()
    }
}

/// Empty cells are never flagged.
pub fn flag(stock: Option<f64>, low: f64, high: f64) -> f64 {
    match stock {
        Some(s) if s < low || s > high => 1.0,
        _ => 0.0,
    }
}
