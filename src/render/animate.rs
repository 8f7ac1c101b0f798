//! Animated city map of station stock over an average day.

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

use crate::catalog::StationCatalog;
use crate::config::Settings;
use crate::error::{PipelineError, Result};
use crate::inventory::StockTable;
use crate::render::colormap::{Normalize, stock_color};
use crate::render::painting::{paint_circle, paint_ring, paint_text};
use crate::render::projection::MercatorViewport;
use crate::threshold::ThresholdMask;

const LABEL_COLOR: [u8; 4] = [0, 0, 0, 255];
const EDGE_COLOR: [u8; 4] = [0, 0, 0, 140];
const LABEL_SCALE: u32 = 4;
const LABEL_MARGIN: i64 = 20;
const GIF_SPEED: i32 = 10;

/// Renders one frame per time-of-day bucket over a fixed basemap.
pub struct FlowAnimator<'a> {
    basemap: &'a RgbaImage,
    viewport: &'a MercatorViewport,
    /// Pixel position of each stock-table column, `None` when the station
    /// lies outside the map window.
    positions: Vec<Option<(f32, f32)>>,
    norm: Normalize,
    radius: f32,
}

impl<'a> FlowAnimator<'a> {
    pub fn new(
        basemap: &'a RgbaImage,
        viewport: &'a MercatorViewport,
        catalog: &StationCatalog,
        table: &StockTable,
        settings: &Settings,
    ) -> Self {
        let positions: Vec<Option<(f32, f32)>> = table
            .station_ids()
            .iter()
            .map(|id| {
                catalog
                    .get(*id)
                    .filter(|s| viewport.contains(s.longitude, s.latitude))
                    .map(|s| viewport.project(s.longitude, s.latitude))
            })
            .collect();

        let hidden = positions.iter().filter(|p| p.is_none()).count();
        if hidden > 0 {
            debug!(hidden, "Stations outside the map window");
        }

        Self {
            basemap,
            viewport,
            positions,
            norm: Normalize::new(settings.color_vmin, settings.color_vmax),
            radius: settings.marker_radius_px,
        }
    }

    /// Frame `index` of the animation, or `None` past the last bucket.
    pub fn frame(&self, table: &StockTable, mask: &ThresholdMask, index: usize) -> Option<RgbaImage> {
        let stocks = table.row(index)?;
        let alphas = mask.row(index)?;
        let label = table.times().get(index)?.format("%H:%M:%S").to_string();

        let mut img = self.basemap.clone();
        for ((pos, stock), alpha) in self.positions.iter().zip(stocks).zip(alphas) {
            let Some((x, y)) = pos else {
                continue;
            };
            let color = stock_color(*stock, &self.norm, *alpha);
            paint_circle(&mut img, *x, *y, self.radius, color);
            // Every marker keeps its outline, healthy or not.
            paint_ring(&mut img, *x, *y, self.radius, EDGE_COLOR);
        }

        let label_height = 7 * LABEL_SCALE as i64;
        paint_text(
            &mut img,
            LABEL_MARGIN,
            self.viewport.height() as i64 - LABEL_MARGIN - label_height,
            LABEL_SCALE,
            &label,
            LABEL_COLOR,
        );

        Some(img)
    }

    /// Encodes every frame as a looping GIF into `writer`.
    pub fn encode<W: Write>(
        &self,
        table: &StockTable,
        mask: &ThresholdMask,
        frame_interval_ms: u32,
        writer: W,
    ) -> Result<usize> {
        if table.is_empty() {
            return Err(PipelineError::EmptyStockTable);
        }

        let mut encoder = GifEncoder::new_with_speed(writer, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(frame_interval_ms, 1);
        let mut written = 0;
        while let Some(img) = self.frame(table, mask, written) {
            encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
            written += 1;
        }

        Ok(written)
    }

    /// Writes the animation to `path`.
    #[tracing::instrument(skip(self, table, mask))]
    pub fn save(
        &self,
        table: &StockTable,
        mask: &ThresholdMask,
        frame_interval_ms: u32,
        path: &str,
    ) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        let frames = self.encode(table, mask, frame_interval_ms, file)?;
        info!(path, frames, "Flow animation written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::trip;
    use crate::inventory::simulate;
    use crate::render::basemap::Basemap;

    struct Fixture {
        catalog: StationCatalog,
        table: StockTable,
        mask: ThresholdMask,
        viewport: MercatorViewport,
        basemap: RgbaImage,
        settings: Settings,
    }

    fn fixture() -> Fixture {
        let mut settings = Settings::default();
        settings.map_width_px = 120;
        // Everything counts as out of band so every marker is opaque.
        settings.threshold_low = 100.0;
        settings.threshold_high = 100.0;
        // Stock near the baseline renders clearly red.
        settings.color_vmin = 0.0;
        settings.color_vmax = 100.0;

        let trips = vec![
            trip(10, "2017-06-01 08:01:00", 20, "2017-06-01 08:20:00"),
            trip(20, "2017-06-01 10:00:00", 10, "2017-06-01 10:05:00"),
        ];
        let catalog = StationCatalog::from_trips(&trips, &settings.excluded_station_name);
        let table = simulate(&trips, &catalog, &settings);
        let mask = ThresholdMask::from_table(&table, settings.threshold_low, settings.threshold_high);
        let viewport =
            MercatorViewport::new(settings.map_bounds, settings.map_lat_ts, settings.map_width_px)
                .unwrap();
        let basemap = Basemap::default().render(&viewport);

        Fixture {
            catalog,
            table,
            mask,
            viewport,
            basemap,
            settings,
        }
    }

    #[test]
    fn test_frame_paints_visible_station() {
        let f = fixture();
        let animator = FlowAnimator::new(&f.basemap, &f.viewport, &f.catalog, &f.table, &f.settings);

        let station = f.catalog.get(10).unwrap();
        let (x, y) = f.viewport.project(station.longitude, station.latitude);
        let img = animator.frame(&f.table, &f.mask, 0).unwrap();

        assert_ne!(img.get_pixel(x.round() as u32, y.round() as u32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_healthy_station_keeps_outline() {
        let mut f = fixture();
        f.mask = ThresholdMask::from_table(&f.table, 5.0, 20.0);
        assert_eq!(f.mask.flagged(), 0);
        let animator = FlowAnimator::new(&f.basemap, &f.viewport, &f.catalog, &f.table, &f.settings);

        let station = f.catalog.get(10).unwrap();
        let (x, y) = f.viewport.project(station.longitude, station.latitude);
        let img = animator.frame(&f.table, &f.mask, 0).unwrap();

        let edge_x = (x + f.settings.marker_radius_px).round() as u32;
        assert_ne!(img.get_pixel(edge_x, y.round() as u32).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(x.round() as u32, y.round() as u32).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_frame_past_end_is_none() {
        let f = fixture();
        let animator = FlowAnimator::new(&f.basemap, &f.viewport, &f.catalog, &f.table, &f.settings);
        assert!(animator.frame(&f.table, &f.mask, f.table.len()).is_none());
    }

    #[test]
    fn test_encode_writes_one_frame_per_bucket() {
        let f = fixture();
        let animator = FlowAnimator::new(&f.basemap, &f.viewport, &f.catalog, &f.table, &f.settings);

        let mut buf = Vec::new();
        let frames = animator.encode(&f.table, &f.mask, 200, &mut buf).unwrap();

        assert_eq!(frames, f.table.len());
        assert!(buf.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_encode_empty_table_is_error() {
        let f = fixture();
        let empty = StockTable::default();
        let mask = ThresholdMask::from_table(&empty, 5.0, 20.0);
        let animator = FlowAnimator::new(&f.basemap, &f.viewport, &f.catalog, &empty, &f.settings);

        let result = animator.encode(&empty, &mask, 200, Vec::new());
        assert!(matches!(result, Err(PipelineError::EmptyStockTable)));
    }
}
