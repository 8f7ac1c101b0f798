//! Hourly borrow/return/stock profile for a single station.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::catalog::{Station, StationId};
use crate::config::Settings;
use crate::inventory::simulate::{average_by, cumulative_stock, net_change, station_changes};
use crate::inventory::StockChange;
use crate::loader::Trip;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationProfile {
    pub station_id: StationId,
    pub station_name: String,
    /// Average bikes returned per bucket, by hour of day.
    pub returns: BTreeMap<u32, f64>,
    /// Average bikes borrowed per bucket, by hour of day, as positive counts.
    pub borrows: BTreeMap<u32, f64>,
    /// Expected stock at the end of each hour of an average day.
    pub stock: BTreeMap<u32, f64>,
}

fn hour_of(at: NaiveDateTime) -> u32 {
    at.hour()
}

fn hourly_average(changes: &[StockChange], bucket_secs: u32) -> BTreeMap<u32, f64> {
    average_by(&net_change(changes, bucket_secs), hour_of)
}

impl StationProfile {
    /// Buckets the station's changes as the city-wide view does, then folds
    /// the buckets by hour of day.
    #[tracing::instrument(skip_all, fields(station = %station.name))]
    pub fn compute(trips: &[Trip], station: &Station, settings: &Settings) -> Self {
        let bucket_secs = settings.bucket_seconds();
        let changes = station_changes(trips, station.id);

        let (arrivals, departures): (Vec<StockChange>, Vec<StockChange>) =
            changes.iter().copied().partition(|c| c.change > 0);

        let returns = hourly_average(&arrivals, bucket_secs);
        let borrows = hourly_average(&departures, bucket_secs)
            .into_iter()
            .map(|(h, v)| (h, -v))
            .collect();
        let stock = cumulative_stock(&hourly_average(&changes, bucket_secs), settings.baseline);

        info!(
            changes = changes.len(),
            hours = stock.len(),
            "Station profile computed"
        );

        Self {
            station_id: station.id,
            station_name: station.name.clone(),
            returns,
            borrows,
            stock,
        }
    }

    /// Default chart file name: the station name with spaces replaced.
    pub fn default_file_name(&self) -> String {
        format!("{}.png", self.station_name.replace(' ', "_"))
    }
}
