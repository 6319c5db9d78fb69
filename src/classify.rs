use crate::config::{BLANK_RATIO, LIGHT_CHANNEL_MIN, LIGHT_RATIO, WHITE_CHANNEL_MIN};
use crate::model::{PageRaster, PlacementStatus};

/// Candidate region in raster pixels. Unlike [`crate::model::RasterRect`] it
/// may extend past the raster; only the overlap is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeRegion {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl ProbeRegion {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Overlap with a `w` x `h` raster as (x0, y0, x1, y1), or `None` if empty.
    fn intersect(&self, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.x.saturating_add(self.width).min(w as i64);
        let y1 = self.y.saturating_add(self.height).min(h as i64);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Judges whether a region of the rendered page is free for an overlay.
///
/// Every pixel of the in-bounds part of `probe` is sampled. A region with no
/// in-bounds pixels is reported occupied: blankness of nothing cannot be
/// verified.
pub fn classify_region(raster: &PageRaster, probe: ProbeRegion) -> PlacementStatus {
    let Some((x0, y0, x1, y1)) = probe.intersect(raster.width(), raster.height()) else {
        return PlacementStatus::Occupied;
    };

    let mut white = 0u64;
    let mut light = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let [r, g, b] = raster.rgb(x, y);
            if r > WHITE_CHANNEL_MIN && g > WHITE_CHANNEL_MIN && b > WHITE_CHANNEL_MIN {
                white += 1;
            } else if r > LIGHT_CHANNEL_MIN && g > LIGHT_CHANNEL_MIN && b > LIGHT_CHANNEL_MIN {
                light += 1;
            }
        }
    }

    let total = (x1 - x0) as f64 * (y1 - y0) as f64;
    let white_ratio = white as f64 / total;
    let light_ratio = (white + light) as f64 / total;

    if white_ratio > BLANK_RATIO {
        PlacementStatus::Blank
    } else if light_ratio > LIGHT_RATIO {
        PlacementStatus::Light
    } else {
        PlacementStatus::Occupied
    }
}
