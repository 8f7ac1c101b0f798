//! Pipeline settings.
//!
//! Every knob of the model and the renderers lives in [`Settings`]. The
//! defaults reproduce the Citi Bike June 2017 run; any subset can be
//! overridden from a JSON file:
//! ```json
//! {
//!   "baseline": 15.0,
//!   "threshold_low": 3.0,
//!   "frame_interval_ms": 100
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

pub const DEFAULT_TRIPS_PATH: &str = "201706-citibike-tripdata.csv";
pub const DEFAULT_BASEMAP_PATH: &str = "new-york_new-york_osm_roads.shp";
pub const DEFAULT_FLOW_OUTPUT: &str = "flow.gif";
pub const DEFAULT_PROFILE_STATION: &str = "E 47 St & Park Ave";

/// Geographic rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn validate(&self) -> Result<()> {
        let ok = self.min_lat < self.max_lat
            && self.min_lon < self.max_lon
            && self.min_lat > -85.0
            && self.max_lat < 85.0
            && self.min_lon >= -180.0
            && self.max_lon <= 180.0;
        if ok {
            Ok(())
        } else {
            Err(PipelineError::InvalidBounds(format!("{self:?}")))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Width of a city-wide time-of-day bucket.
    pub bucket_minutes: u32,
    /// Stock every station is assumed to hold at midnight.
    pub baseline: f64,
    pub threshold_low: f64,
    pub threshold_high: f64,
    /// Catalog rows with this name are depots, not docks.
    pub excluded_station_name: String,

    pub map_bounds: GeoBounds,
    /// Latitude of true scale for the Mercator projection.
    pub map_lat_ts: f64,
    pub map_width_px: u32,
    pub marker_radius_px: f32,
    pub color_vmin: f64,
    pub color_vmax: f64,
    pub frame_interval_ms: u32,

    pub chart_width_px: u32,
    pub chart_height_px: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket_minutes: 15,
            baseline: 12.0,
            threshold_low: 5.0,
            threshold_high: 20.0,
            excluded_station_name: "LPI Facility".to_string(),
            map_bounds: GeoBounds {
                min_lat: 40.65,
                max_lat: 40.84,
                min_lon: -74.08,
                max_lon: -73.90,
            },
            map_lat_ts: 40.65,
            map_width_px: 1000,
            marker_radius_px: 4.0,
            color_vmin: -50.0,
            color_vmax: 70.0,
            frame_interval_ms: 200,
            chart_width_px: 1200,
            chart_height_px: 600,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`. Missing fields keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, or the file at `path` when one is given.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bucket_minutes == 0 || 1440 % self.bucket_minutes != 0 {
            return Err(PipelineError::InvalidSettings(format!(
                "bucket_minutes must divide a day, got {}",
                self.bucket_minutes
            )));
        }
        for (name, px) in [
            ("map_width_px", self.map_width_px),
            ("chart_width_px", self.chart_width_px),
            ("chart_height_px", self.chart_height_px),
        ] {
            if px == 0 {
                return Err(PipelineError::InvalidSettings(format!("{name} must be positive")));
            }
        }
        if self.threshold_low > self.threshold_high {
            return Err(PipelineError::InvalidSettings(format!(
                "threshold_low {} exceeds threshold_high {}",
                self.threshold_low, self.threshold_high
            )));
        }
        if self.color_vmin >= self.color_vmax {
            return Err(PipelineError::InvalidSettings(format!(
                "color_vmin {} must be below color_vmax {}",
                self.color_vmin, self.color_vmax
            )));
        }
        self.map_bounds.validate()
    }

    pub fn bucket_seconds(&self) -> u32 {
        self.bucket_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.bucket_seconds(), 900);
        assert_eq!(s.baseline, 12.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"baseline": 15.0, "frame_interval_ms": 100}}"#).unwrap();

        let s = Settings::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(s.baseline, 15.0);
        assert_eq!(s.frame_interval_ms, 100);
        assert_eq!(s.bucket_minutes, 15);
        assert_eq!(s.excluded_station_name, "LPI Facility");
    }

    #[test]
    fn test_bucket_must_divide_day() {
        let s = Settings {
            bucket_minutes: 7,
            ..Default::default()
        };
        assert!(matches!(
            s.validate(),
            Err(PipelineError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_zero_image_sizes_rejected() {
        let map = Settings {
            map_width_px: 0,
            ..Default::default()
        };
        let chart = Settings {
            chart_height_px: 0,
            ..Default::default()
        };
        assert!(matches!(map.validate(), Err(PipelineError::InvalidSettings(_))));
        assert!(matches!(chart.validate(), Err(PipelineError::InvalidSettings(_))));
    }

    #[test]
    fn test_zero_width_in_json_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"chart_width_px": 0}}"#).unwrap();

        let result = Settings::load(file.path().to_str().unwrap());
        assert!(matches!(result, Err(PipelineError::InvalidSettings(_))));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let bounds = GeoBounds {
            min_lat: 40.84,
            max_lat: 40.65,
            min_lon: -74.08,
            max_lon: -73.90,
        };
        assert!(matches!(
            bounds.validate(),
            Err(PipelineError::InvalidBounds(_))
        ));
    }
}
