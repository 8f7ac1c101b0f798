//! Road-network basemap read from an ESRI shapefile.

use image::{Rgba, RgbaImage};
use shapefile::Shape;
use tracing::{debug, info};

use crate::error::Result;
use crate::render::painting::paint_line;
use crate::render::projection::MercatorViewport;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const ROAD: [u8; 4] = [40, 40, 40, 110];

/// Road polylines in lon/lat degrees.
#[derive(Debug, Clone, Default)]
pub struct Basemap {
    lines: Vec<Vec<(f64, f64)>>,
}

impl Basemap {
    pub fn from_lines(lines: Vec<Vec<(f64, f64)>>) -> Self {
        Self { lines }
    }

    /// Reads every line and polygon outline from the `.shp` at `path`.
    #[tracing::instrument]
    pub fn load(path: &str) -> Result<Self> {
        let shapes = shapefile::read_shapes(path)?;
        let total = shapes.len();

        let mut lines: Vec<Vec<(f64, f64)>> = Vec::new();
        for shape in shapes {
            match shape {
                Shape::Polyline(p) => lines.extend(
                    p.parts()
                        .iter()
                        .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect()),
                ),
                Shape::PolylineM(p) => lines.extend(
                    p.parts()
                        .iter()
                        .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect()),
                ),
                Shape::PolylineZ(p) => lines.extend(
                    p.parts()
                        .iter()
                        .map(|part| part.iter().map(|pt| (pt.x, pt.y)).collect()),
                ),
                Shape::Polygon(p) => lines.extend(
                    p.rings()
                        .iter()
                        .map(|ring| ring.points().iter().map(|pt| (pt.x, pt.y)).collect()),
                ),
                _ => {}
            }
        }

        debug!(shapes = total, "Shapefile read");
        info!(lines = lines.len(), "Basemap loaded");
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[Vec<(f64, f64)>] {
        &self.lines
    }

    /// Strokes every road onto a fresh white image sized to `viewport`.
    pub fn render(&self, viewport: &MercatorViewport) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(viewport.width(), viewport.height(), Rgba(BACKGROUND));

        for line in &self.lines {
            for pair in line.windows(2) {
                let (ax, ay) = viewport.project(pair[0].0, pair[0].1);
                let (bx, by) = viewport.project(pair[1].0, pair[1].1);
                if off_canvas(&img, ax, ay) && off_canvas(&img, bx, by) {
                    continue;
                }
                paint_line(&mut img, ax, ay, bx, by, ROAD);
            }
        }

        img
    }
}

fn off_canvas(img: &RgbaImage, x: f32, y: f32) -> bool {
    x < 0.0 || y < 0.0 || x >= img.width() as f32 || y >= img.height() as f32
}
