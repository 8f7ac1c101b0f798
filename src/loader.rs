//! Trip-record loading.
//!
//! Reads a Citi Bike monthly trip CSV into [`Trip`] rows. Only the station
//! and timestamp columns are kept; bike id, user type, birth year, gender and
//! trip duration are dropped by the deserializer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use tracing::{debug, info};

use crate::catalog::StationId;
use crate::error::{PipelineError, Result};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// One rental, origin and destination.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trip {
    #[serde(rename = "starttime", deserialize_with = "de_timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "stoptime", deserialize_with = "de_timestamp")]
    pub stop_time: NaiveDateTime,

    #[serde(rename = "start station id")]
    pub start_station_id: StationId,
    #[serde(rename = "start station name")]
    pub start_station_name: String,
    #[serde(rename = "start station latitude")]
    pub start_station_latitude: f64,
    #[serde(rename = "start station longitude")]
    pub start_station_longitude: f64,

    #[serde(rename = "end station id")]
    pub end_station_id: StationId,
    #[serde(rename = "end station name")]
    pub end_station_name: String,
    #[serde(rename = "end station latitude")]
    pub end_station_latitude: f64,
    #[serde(rename = "end station longitude")]
    pub end_station_longitude: f64,
}

/// Parses a trip timestamp in any of the formats Citi Bike has published.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| PipelineError::Timestamp(raw.to_string()))
}

fn de_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Reads every trip from a CSV source.
pub fn read_trips<R: Read>(reader: R) -> Result<Vec<Trip>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let mut trips = Vec::new();
    for result in rdr.deserialize() {
        let trip: Trip = result?;
        trips.push(trip);
    }

    Ok(trips)
}

/// Loads the trip file at `path`.
///
/// # Errors
///
/// Fails on a missing file, a malformed row, or a file with no trips.
#[tracing::instrument]
pub fn load_trips(path: &str) -> Result<Vec<Trip>> {
    let file = File::open(path)?;
    let trips = read_trips(file)?;

    if trips.is_empty() {
        return Err(PipelineError::NoTrips(path.to_string()));
    }

    debug!(first = ?trips.first().map(|t| t.start_time), "First trip start");
    info!(rows = trips.len(), "Trips loaded");
    Ok(trips)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) const HEADER: &str = "tripduration,starttime,stoptime,start station id,start station name,start station latitude,start station longitude,end station id,end station name,end station latitude,end station longitude,bikeid,usertype,birth year,gender";

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 3)
            .unwrap();

        assert_eq!(parse_timestamp("2017-06-01 00:00:03").unwrap(), expected);
        assert_eq!(parse_timestamp("6/1/2017 00:00:03").unwrap(), expected);

        let with_fraction = parse_timestamp("2017-06-01 00:00:03.4560").unwrap();
        assert_eq!(with_fraction.date(), expected.date());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(PipelineError::Timestamp(_))
        ));
    }

    #[test]
    fn test_read_trips_drops_extra_columns() {
        let csv = format!(
            "{HEADER}\n\
             1004,2017-06-01 00:00:00,2017-06-01 00:16:45,3328,W 100 St & Manhattan Ave,40.795,-73.964,3328,W 100 St & Manhattan Ave,40.795,-73.964,25415,Subscriber,1973,1\n"
        );

        let trips = read_trips(csv.as_bytes()).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].start_station_id, 3328);
        assert_eq!(trips[0].end_station_name, "W 100 St & Manhattan Ave");
        assert_eq!(trips[0].stop_time.time().to_string(), "00:16:45");
    }

    #[test]
    fn test_read_trips_bad_timestamp_is_error() {
        let csv = format!(
            "{HEADER}\n\
             60,not a time,2017-06-01 00:01:00,1,A,40.7,-74.0,2,B,40.7,-74.0,1,Subscriber,1980,1\n"
        );
        assert!(read_trips(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_trips_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(file, "{HEADER}").unwrap();

        let result = load_trips(file.path().to_str().unwrap());
        assert!(matches!(result, Err(PipelineError::NoTrips(_))));
    }

    #[test]
    fn test_load_trips_missing_file() {
        assert!(matches!(
            load_trips("/nonexistent/trips.csv"),
            Err(PipelineError::Io(_))
        ));
    }
}
