use chrono::{NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use crate::catalog::{StationCatalog, StationId};
use crate::config::Settings;
use crate::inventory::types::{StockChange, StockTable};
use crate::inventory::utility::{floor_to_bucket, mean};
use crate::loader::Trip;

/// The stock change `trip` causes at station `id`, if any.
///
/// Departures take precedence, so a round trip counts once as a bike
/// leaving at its start time.
pub fn change_at(trip: &Trip, id: StationId) -> Option<StockChange> {
    if trip.start_station_id == id {
        Some(StockChange {
            at: trip.start_time,
            change: -1,
        })
    } else if trip.end_station_id == id {
        Some(StockChange {
            at: trip.stop_time,
            change: 1,
        })
    } else {
        None
    }
}

/// Every stock change at a single station.
pub fn station_changes(trips: &[Trip], id: StationId) -> Vec<StockChange> {
    trips.iter().filter_map(|t| change_at(t, id)).collect()
}

/// Routes every trip to the stations it touches in a single pass.
///
/// Yields the same per-station changes as [`station_changes`].
pub fn changes_by_station(trips: &[Trip]) -> HashMap<StationId, Vec<StockChange>> {
    let mut routed: HashMap<StationId, Vec<StockChange>> = HashMap::new();

    for trip in trips {
        routed
            .entry(trip.start_station_id)
            .or_default()
            .push(StockChange {
                at: trip.start_time,
                change: -1,
            });

        if trip.end_station_id != trip.start_station_id {
            routed
                .entry(trip.end_station_id)
                .or_default()
                .push(StockChange {
                    at: trip.stop_time,
                    change: 1,
                });
        }
    }

    routed
}

/// Net stock change per dated bucket.
pub fn net_change(changes: &[StockChange], bucket_secs: u32) -> BTreeMap<NaiveDateTime, i64> {
    let mut net = BTreeMap::new();
    for c in changes {
        *net.entry(floor_to_bucket(c.at, bucket_secs)).or_insert(0) += c.change;
    }
    net
}

/// Folds dated buckets onto a canonical day by averaging all buckets that
/// share the same `key`. Only observed buckets contribute to an average.
pub fn average_by<K, F>(net: &BTreeMap<NaiveDateTime, i64>, key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(NaiveDateTime) -> K,
{
    let mut grouped: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (at, change) in net {
        grouped.entry(key(*at)).or_default().push(*change as f64);
    }

    grouped
        .into_iter()
        .map(|(k, values)| (k, mean(&values)))
        .collect()
}

/// Running sum of average net change in key order, offset by `baseline`.
pub fn cumulative_stock<K: Ord + Clone>(average: &BTreeMap<K, f64>, baseline: f64) -> BTreeMap<K, f64> {
    let mut running = 0.0;
    average
        .iter()
        .map(|(k, change)| {
            running += change;
            (k.clone(), running + baseline)
        })
        .collect()
}

/// Expected stock curve over an average day for one station.
pub fn average_day_stock(changes: &[StockChange], settings: &Settings) -> BTreeMap<NaiveTime, f64> {
    let net = net_change(changes, settings.bucket_seconds());
    let average = average_by(&net, |at| at.time());
    cumulative_stock(&average, settings.baseline)
}

/// Builds the forward-filled stock table for every catalogued station.
#[tracing::instrument(skip_all, fields(trips = trips.len(), stations = catalog.len()))]
pub fn simulate(trips: &[Trip], catalog: &StationCatalog, settings: &Settings) -> StockTable {
    let routed = changes_by_station(trips);

    let columns: Vec<(StationId, BTreeMap<NaiveTime, f64>)> = catalog
        .ids()
        .map(|id| {
            let changes = routed.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            (id, average_day_stock(changes, settings))
        })
        .collect();

    let mut table = StockTable::from_columns(columns);
    debug!(buckets = table.len(), "Stock curves assembled");
    table.forward_fill();

    info!(
        buckets = table.len(),
        stations = table.station_ids().len(),
        "Stock table ready"
    );
    table
}
