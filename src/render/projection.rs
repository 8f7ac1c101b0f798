//! Mercator projection of a bounding box onto a pixel grid.

use std::f64::consts::FRAC_PI_4;

use crate::config::GeoBounds;
use crate::error::Result;

/// Maps lon/lat degrees to pixel coordinates, north up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorViewport {
    bounds: GeoBounds,
    /// cos of the latitude of true scale.
    k: f64,
    scale: f64,
    x_min: f64,
    y_max: f64,
    width: u32,
    height: u32,
}

impl MercatorViewport {
    /// Fits `bounds` into `width` pixels. The height follows the projected
    /// aspect ratio.
    pub fn new(bounds: GeoBounds, lat_ts: f64, width: u32) -> Result<Self> {
        bounds.validate()?;
        let k = lat_ts.to_radians().cos();

        let (x_min, y_min) = mercator(bounds.min_lon, bounds.min_lat, k);
        let (x_max, y_max) = mercator(bounds.max_lon, bounds.max_lat, k);

        let scale = width as f64 / (x_max - x_min);
        let height = ((y_max - y_min) * scale).round().max(1.0) as u32;

        Ok(Self {
            bounds,
            k,
            scale,
            x_min,
            y_max,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel position of (`lon`, `lat`), possibly outside the image.
    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let (x, y) = mercator(lon, lat, self.k);
        let px = (x - self.x_min) * self.scale;
        let py = (self.y_max - y) * self.scale;
        (px as f32, py as f32)
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.bounds.min_lon
            && lon <= self.bounds.max_lon
            && lat >= self.bounds.min_lat
            && lat <= self.bounds.max_lat
    }
}

fn mercator(lon: f64, lat: f64, k: f64) -> (f64, f64) {
    let x = k * lon.to_radians();
    let y = k * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::PipelineError;

    fn viewport() -> MercatorViewport {
        let s = Settings::default();
        MercatorViewport::new(s.map_bounds, s.map_lat_ts, 1000).unwrap()
    }

    #[test]
    fn test_corners_map_to_image_corners() {
        let v = viewport();
        let (x, y) = v.project(-74.08, 40.84);
        assert!(x.abs() < 1e-3 && y.abs() < 1e-3);

        let (x, y) = v.project(-73.90, 40.65);
        assert!((x - 1000.0).abs() < 1e-2);
        assert!((y - v.height() as f32).abs() < 1.0);
    }

    #[test]
    fn test_manhattan_is_taller_than_wide() {
        // 0.19 degrees of latitude against 0.18 of longitude at 40.7N.
        let v = viewport();
        assert!(v.height() > v.width());
    }

    #[test]
    fn test_north_is_up() {
        let v = viewport();
        let (_, south) = v.project(-74.0, 40.70);
        let (_, north) = v.project(-74.0, 40.80);
        assert!(north < south);
    }

    #[test]
    fn test_contains() {
        let v = viewport();
        assert!(v.contains(-73.98, 40.75));
        assert!(!v.contains(-73.50, 40.75));
    }

    #[test]
    fn test_invalid_bounds() {
        let mut bounds = Settings::default().map_bounds;
        bounds.max_lon = bounds.min_lon;
        assert!(matches!(
            MercatorViewport::new(bounds, 40.65, 100),
            Err(PipelineError::InvalidBounds(_))
        ));
    }
}
