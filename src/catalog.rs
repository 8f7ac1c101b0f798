//! Station catalog derived from trip endpoints.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::loader::Trip;

pub type StationId = u32;

/// A physical dock location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    #[serde(rename = "station id")]
    pub id: StationId,
    #[serde(rename = "station name")]
    pub name: String,
    #[serde(rename = "station latitude")]
    pub latitude: f64,
    #[serde(rename = "station longitude")]
    pub longitude: f64,
}

impl Station {
    fn key(&self) -> (StationId, String, u64, u64) {
        (
            self.id,
            self.name.clone(),
            self.latitude.to_bits(),
            self.longitude.to_bits(),
        )
    }
}

/// Canonical station list, sorted by id with one row per id.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    /// Builds the catalog from both endpoints of every trip.
    ///
    /// Exact duplicate rows collapse, rows named `excluded_name` are dropped,
    /// and when one id still carries several rows only the first in sorted
    /// order survives.
    #[tracing::instrument(skip(trips), fields(trips = trips.len()))]
    pub fn from_trips(trips: &[Trip], excluded_name: &str) -> Self {
        let mut rows: Vec<Station> = trips
            .iter()
            .flat_map(|t| {
                [
                    Station {
                        id: t.start_station_id,
                        name: t.start_station_name.clone(),
                        latitude: t.start_station_latitude,
                        longitude: t.start_station_longitude,
                    },
                    Station {
                        id: t.end_station_id,
                        name: t.end_station_name.clone(),
                        latitude: t.end_station_latitude,
                        longitude: t.end_station_longitude,
                    },
                ]
            })
            .collect();

        let mut seen = HashSet::new();
        rows.retain(|s| seen.insert(s.key()));
        let distinct = rows.len();

        rows.retain(|s| s.name != excluded_name);
        let excluded = distinct - rows.len();

        rows.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.latitude.total_cmp(&b.latitude))
                .then_with(|| a.longitude.total_cmp(&b.longitude))
        });

        let before = rows.len();
        rows.dedup_by_key(|s| s.id);
        let collapsed = before - rows.len();
        if collapsed > 0 {
            warn!(collapsed, "Station ids with conflicting attributes collapsed");
        }

        debug!(distinct, excluded, "Endpoint rows de-duplicated");
        info!(stations = rows.len(), "Station catalog built");

        Self { stations: rows }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StationId> + '_ {
        self.stations.iter().map(|s| s.id)
    }

    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.stations[i])
    }

    /// Returns the single station called `name`.
    pub fn find_by_name(&self, name: &str) -> Result<&Station> {
        let matches: Vec<&Station> = self.stations.iter().filter(|s| s.name == name).collect();
        match matches.as_slice() {
            [] => Err(PipelineError::UnknownStation(name.to_string())),
            [station] => Ok(station),
            many => Err(PipelineError::AmbiguousStation {
                name: name.to_string(),
                ids: many.iter().map(|s| s.id).collect(),
            }),
        }
    }
}
