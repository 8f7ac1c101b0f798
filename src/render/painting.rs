//! Pixel-painting helpers shared by the map and chart renderers.

use image::{Rgba, RgbaImage};

use crate::render::font::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph};

/// Alpha-composites `color` over the pixel at (`x`, `y`). Out-of-bounds is a no-op.
pub fn blend(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = color[3] as u32;
    if alpha == 0 {
        return;
    }

    let dst = img.get_pixel_mut(x as u32, y as u32);
    if alpha == 255 {
        *dst = Rgba(color);
        return;
    }

    let inv = 255 - alpha;
    for c in 0..3 {
        dst.0[c] = ((color[c] as u32 * alpha + dst.0[c] as u32 * inv) / 255) as u8;
    }
    dst.0[3] = (alpha + dst.0[3] as u32 * inv / 255).min(255) as u8;
}

/// Paint a filled circle.
pub fn paint_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
    let r2 = radius * radius + 0.5; // slight expansion for anti-alias
    let min_x = (cx - radius).floor() as i64;
    let max_x = (cx + radius).ceil() as i64;
    let min_y = (cy - radius).floor() as i64;
    let max_y = (cy + radius).ceil() as i64;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f32 - cx;
            let dy = py as f32 - cy;
            if dx * dx + dy * dy <= r2 {
                blend(img, px, py, color);
            }
        }
    }
}

/// Paint a one-pixel ring just inside the edge of a circle.
pub fn paint_ring(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
    let outer = radius * radius + 0.5;
    let inner = (radius - 1.0).max(0.0).powi(2);
    let min_x = (cx - radius).floor() as i64 - 1;
    let max_x = (cx + radius).ceil() as i64 + 1;
    let min_y = (cy - radius).floor() as i64 - 1;
    let max_y = (cy + radius).ceil() as i64 + 1;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f32 - cx;
            let dy = py as f32 - cy;
            let d2 = dx * dx + dy * dy;
            if d2 > inner && d2 <= outer {
                blend(img, px, py, color);
            }
        }
    }
}

/// One-pixel line from (`x0`, `y0`) to (`x1`, `y1`).
pub fn paint_line(img: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: [u8; 4]) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (x0 + dx * t).round() as i64;
        let y = (y0 + dy * t).round() as i64;
        blend(img, x, y, color);
    }
}

/// Line drawn as alternating `dash` and `gap` pixel runs of `width` pixels.
pub fn paint_dashed_line(
    img: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    dash: f32,
    gap: f32,
    width: u32,
    color: [u8; 4],
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }
    let (ux, uy) = (dx / length, dy / length);
    let period = dash + gap;

    let mut s = 0.0;
    while s < length {
        let e = (s + dash).min(length);
        for w in 0..width {
            // Offset perpendicular to the direction of travel.
            let off = w as f32 - (width as f32 - 1.0) / 2.0;
            let (ox, oy) = (-uy * off, ux * off);
            paint_line(
                img,
                from.0 + ux * s + ox,
                from.1 + uy * s + oy,
                from.0 + ux * e + ox,
                from.1 + uy * e + oy,
                color,
            );
        }
        s += period;
    }
}

/// Fill the half-open pixel rectangle [`x0`, `x1`) x [`y0`, `y1`).
pub fn fill_rect(img: &mut RgbaImage, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 4]) {
    let (x0, x1) = (x0.min(x1), x0.max(x1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));
    for y in y0..y1 {
        for x in x0..x1 {
            blend(img, x, y, color);
        }
    }
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    (n * (GLYPH_WIDTH + 1) - 1) * scale
}

/// Draw `text` with its top-left corner at (`x`, `y`). Unknown characters render blank.
pub fn paint_text(img: &mut RgbaImage, x: i64, y: i64, scale: u32, text: &str, color: [u8; 4]) {
    let scale = scale.max(1) as i64;
    let advance = (GLYPH_WIDTH as i64 + 1) * scale;

    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let gx = x + i as i64 * advance;
        for (row, bits) in rows.iter().enumerate().take(GLYPH_HEIGHT as usize) {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let px = gx + col as i64 * scale;
                let py = y + row as i64 * scale;
                fill_rect(img, px, py, px + scale, py + scale, color);
            }
        }
    }
}
