//! Bar-and-line chart of a station's hourly profile.

use image::{Rgba, RgbaImage};
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::profile::StationProfile;
use crate::render::painting::{fill_rect, paint_dashed_line, paint_line, paint_text, text_width};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const GRID: [u8; 4] = [225, 225, 225, 255];
const RETURN_COLOR: [u8; 4] = [0, 0, 255, 255];
const BORROW_COLOR: [u8; 4] = [255, 0, 0, 255];

const X_RANGE: (f64, f64) = (-1.0, 24.0);
const BAR_OFFSET: f64 = 0.2;
const BAR_WIDTH: f64 = 0.4;

const MARGIN_LEFT: u32 = 80;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 60;

/// Data-to-pixel mapping for the plot area.
#[derive(Debug, Clone, Copy)]
struct Axes {
    x_range: (f64, f64),
    y_range: (f64, f64),
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Axes {
    fn px(&self, x: f64) -> f64 {
        self.left + (x - self.x_range.0) / (self.x_range.1 - self.x_range.0) * (self.right - self.left)
    }

    fn py(&self, y: f64) -> f64 {
        self.bottom - (y - self.y_range.0) / (self.y_range.1 - self.y_range.0) * (self.bottom - self.top)
    }
}

/// Tick spacing of 1, 2 or 5 times a power of ten giving about `target` ticks.
pub fn nice_step(span: f64, target: usize) -> f64 {
    if span <= 0.0 || !span.is_finite() {
        return 1.0;
    }
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let factor = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Vertical data range covering the zero line and every plotted value.
fn y_range(profile: &StationProfile) -> (f64, f64) {
    let values = profile
        .stock
        .values()
        .chain(profile.returns.values())
        .chain(profile.borrows.values())
        .copied();

    let (lo, hi) = values.fold((0.0f64, 1.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = (hi - lo) * 0.05;
    (lo - if lo < 0.0 { pad } else { 0.0 }, hi + pad)
}

fn tick_label(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Draws the hourly profile onto a `width` x `height` image.
pub fn render_profile(profile: &StationProfile, width: u32, height: u32) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(width, height, Rgba(WHITE));

    let axes = Axes {
        x_range: X_RANGE,
        y_range: y_range(profile),
        left: MARGIN_LEFT as f64,
        right: width.saturating_sub(MARGIN_RIGHT) as f64,
        top: MARGIN_TOP as f64,
        bottom: height.saturating_sub(MARGIN_BOTTOM) as f64,
    };

    // Horizontal grid and y ticks
    let step = nice_step(axes.y_range.1 - axes.y_range.0, 6);
    let mut tick = (axes.y_range.0 / step).ceil() * step;
    while tick <= axes.y_range.1 {
        let y = axes.py(tick) as f32;
        paint_line(&mut img, axes.left as f32, y, axes.right as f32, y, GRID);
        let label = tick_label(tick, step);
        let lx = axes.left as i64 - 8 - text_width(&label, 2) as i64;
        paint_text(&mut img, lx, y as i64 - 7, 2, &label, BLACK);
        tick += step;
    }

    // Bars
    let zero = axes.py(0.0);
    for (hour, value) in &profile.returns {
        let center = *hour as f64 - BAR_OFFSET;
        fill_bar(&mut img, &axes, center, zero, axes.py(*value), RETURN_COLOR);
    }
    for (hour, value) in &profile.borrows {
        let center = *hour as f64 + BAR_OFFSET;
        fill_bar(&mut img, &axes, center, zero, axes.py(*value), BORROW_COLOR);
    }

    // Stock line
    let points: Vec<(f32, f32)> = profile
        .stock
        .iter()
        .map(|(h, s)| (axes.px(*h as f64) as f32, axes.py(*s) as f32))
        .collect();
    for pair in points.windows(2) {
        paint_dashed_line(&mut img, pair[0], pair[1], 10.0, 6.0, 2, BLACK);
    }

    // Axes and x ticks
    let (l, r, t, b) = (axes.left as f32, axes.right as f32, axes.top as f32, axes.bottom as f32);
    paint_line(&mut img, l, b, r, b, BLACK);
    paint_line(&mut img, l, t, l, b, BLACK);
    paint_line(&mut img, l, zero as f32, r, zero as f32, BLACK);
    for hour in 0..24 {
        let x = axes.px(hour as f64) as f32;
        paint_line(&mut img, x, b, x, b + 5.0, BLACK);
        let label = hour.to_string();
        let lx = x as i64 - text_width(&label, 2) as i64 / 2;
        paint_text(&mut img, lx, b as i64 + 10, 2, &label, BLACK);
    }

    // Labels
    let x_label = "Hour";
    let cx = (axes.left + axes.right) / 2.0;
    paint_text(
        &mut img,
        cx as i64 - text_width(x_label, 2) as i64 / 2,
        b as i64 + 34,
        2,
        x_label,
        BLACK,
    );
    paint_text(&mut img, 10, axes.top as i64 - 24, 2, "Count", BLACK);
    paint_text(
        &mut img,
        cx as i64 - text_width(&profile.station_name, 3) as i64 / 2,
        14,
        3,
        &profile.station_name,
        BLACK,
    );

    paint_legend(&mut img, &axes);
    img
}

fn fill_bar(img: &mut RgbaImage, axes: &Axes, center: f64, zero: f64, top: f64, color: [u8; 4]) {
    let x0 = axes.px(center - BAR_WIDTH / 2.0).round() as i64;
    let x1 = axes.px(center + BAR_WIDTH / 2.0).round() as i64;
    fill_rect(img, x0, top.round() as i64, x1, zero.round() as i64, color);
}

fn paint_legend(img: &mut RgbaImage, axes: &Axes) {
    let entries = [("stock", None), ("return", Some(RETURN_COLOR)), ("borrow", Some(BORROW_COLOR))];
    let x = axes.right as i64 - 150;
    let mut y = axes.top as i64 + 12;

    for (label, swatch) in entries {
        match swatch {
            Some(color) => fill_rect(img, x, y, x + 30, y + 14, color),
            None => paint_dashed_line(
                img,
                (x as f32, y as f32 + 7.0),
                (x as f32 + 30.0, y as f32 + 7.0),
                10.0,
                6.0,
                2,
                BLACK,
            ),
        }
        paint_text(img, x + 40, y, 2, label, BLACK);
        y += 24;
    }
}

/// Renders and writes the profile chart as PNG.
#[tracing::instrument(skip(profile, settings), fields(station = %profile.station_name))]
pub fn save_profile(profile: &StationProfile, settings: &Settings, path: &str) -> Result<()> {
    let img = render_profile(profile, settings.chart_width_px, settings.chart_height_px);
    img.save(path)?;
    info!(path, "Station profile chart written");
    Ok(())
}
