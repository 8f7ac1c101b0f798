//! Diverging red-white-blue colormap.
//!
//! Low stock reads red, high stock blue, with white at the midpoint of the
//! normalisation range.

/// Linear normalisation of `[vmin, vmax]` onto `[0, 1]`, clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    pub fn apply(&self, value: f64) -> f64 {
        ((value - self.vmin) / (self.vmax - self.vmin)).clamp(0.0, 1.0)
    }
}

/// Maps a position in `[0, 1]` to red (0) through white (0.5) to blue (1).
pub fn red_white_blue(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let (r, g, b) = if t <= 0.5 {
        let k = t / 0.5;
        (1.0, k, k)
    } else {
        let k = (1.0 - t) / 0.5;
        (k, k, 1.0)
    };
    [to_byte(r), to_byte(g), to_byte(b)]
}

fn to_byte(c: f64) -> u8 {
    (c * 255.0).round() as u8
}

/// Marker colour for `stock`, with the given opacity (0.0 to 1.0).
///
/// Empty cells are fully transparent.
pub fn stock_color(stock: Option<f64>, norm: &Normalize, opacity: f64) -> [u8; 4] {
    match stock {
        Some(v) => {
            let [r, g, b] = red_white_blue(norm.apply(v));
            [r, g, b, to_byte(opacity.clamp(0.0, 1.0))]
        }
        None => [0, 0, 0, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_clamps() {
        let n = Normalize::new(-50.0, 70.0);
        assert_eq!(n.apply(-50.0), 0.0);
        assert_eq!(n.apply(10.0), 0.5);
        assert_eq!(n.apply(70.0), 1.0);
        assert_eq!(n.apply(-500.0), 0.0);
        assert_eq!(n.apply(500.0), 1.0);
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(red_white_blue(0.0), [255, 0, 0]);
        assert_eq!(red_white_blue(0.5), [255, 255, 255]);
        assert_eq!(red_white_blue(1.0), [0, 0, 255]);
    }

    #[test]
    fn test_below_midpoint_is_reddish() {
        let [r, g, b] = red_white_blue(0.25);
        assert_eq!(r, 255);
        assert!(g < 255 && b < 255);
    }

    #[test]
    fn test_stock_color_alpha() {
        let n = Normalize::new(-50.0, 70.0);
        assert_eq!(stock_color(Some(10.0), &n, 0.0)[3], 0);
        assert_eq!(stock_color(Some(10.0), &n, 1.0), [255, 255, 255, 255]);
        assert_eq!(stock_color(None, &n, 1.0), [0, 0, 0, 0]);
    }
}
