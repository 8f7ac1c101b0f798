//! Data types used by the inventory simulation.

use chrono::{NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::StationId;

/// A single bike leaving (-1) or arriving (+1) at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub at: NaiveDateTime,
    pub change: i64,
}

/// Expected stock per time-of-day bucket (rows) and station (columns).
///
/// Cells are `None` where a station has not yet been observed on the
/// canonical day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockTable {
    times: Vec<NaiveTime>,
    station_ids: Vec<StationId>,
    rows: Vec<Vec<Option<f64>>>,
}

impl StockTable {
    /// Assembles per-station curves into one table indexed by the union of
    /// their time-of-day buckets. Gaps are left empty.
    pub fn from_columns(columns: Vec<(StationId, BTreeMap<NaiveTime, f64>)>) -> Self {
        let times: Vec<NaiveTime> = columns
            .iter()
            .flat_map(|(_, curve)| curve.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = times
            .iter()
            .map(|t| columns.iter().map(|(_, curve)| curve.get(t).copied()).collect())
            .collect();

        Self {
            times,
            station_ids: columns.iter().map(|(id, _)| *id).collect(),
            rows,
        }
    }

    /// Carries each station's last known stock forward into later empty cells.
    pub fn forward_fill(&mut self) {
        let mut last: Vec<Option<f64>> = vec![None; self.station_ids.len()];
        for row in &mut self.rows {
            for (cell, prev) in row.iter_mut().zip(last.iter_mut()) {
                match cell {
                    Some(v) => *prev = Some(*v),
                    None => *cell = *prev,
                }
            }
        }
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    pub fn station_ids(&self) -> &[StationId] {
        &self.station_ids
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn station_index(&self, id: StationId) -> Option<usize> {
        self.station_ids.iter().position(|s| *s == id)
    }

    pub fn value(&self, time: NaiveTime, id: StationId) -> Option<f64> {
        let row = self.times.binary_search(&time).ok()?;
        let col = self.station_index(id)?;
        self.rows[row][col]
    }

    /// Number of time-of-day buckets.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
