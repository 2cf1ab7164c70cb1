use std::f64::consts::PI;

use geo::Rect;
use serde::{Deserialize, Serialize};

/// Web map tile size in pixels.
const TILE_SIZE: f64 = 256.0;

/// Map view: center as `[lat, lon]` and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { center: [46.5, -122.6], zoom: 9.0 }
    }
}

impl Viewport {
    /// Largest whole zoom (at most `max_zoom`) at which `bounds` (lon/lat) fits in a
    /// `size` pixel map, centered on the bounds.
    pub fn fit_bounds(bounds: Rect<f64>, size: (f64, f64), max_zoom: f64) -> Self {
        let (min, max) = (bounds.min(), bounds.max());
        let center = [(min.y + max.y) / 2.0, (min.x + max.x) / 2.0];

        let dx = (max.x - min.x) / 360.0;
        let dy = (mercator_y(max.y) - mercator_y(min.y)).abs();
        let fit = |pixels: f64, span: f64| {
            if span > 0.0 { (pixels / (TILE_SIZE * span)).log2() } else { f64::INFINITY }
        };
        let zoom = fit(size.0, dx).min(fit(size.1, dy)).floor().min(max_zoom).max(0.0);

        Self { center, zoom }
    }
}

/// Normalized web mercator y in [0, 1] units.
fn mercator_y(lat: f64) -> f64 {
    let lat = lat.clamp(-85.051_128, 85.051_128).to_radians();
    (PI - ((PI / 4.0 + lat / 2.0).tan()).ln()) / (2.0 * PI)
}
