use crate::anchors::{AUTOMATIC_LADDER, AnchorPosition, FallbackPriority};
use crate::classify::{ProbeRegion, classify_region};
use crate::config::{LOGO_SIZE_MAX, LOGO_SIZE_MIN, PROBE_MARGIN_PX};
use crate::model::{PageRaster, PlacementResult, PlacementStatus, RasterRect};

/// Logo footprint in raster pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub width: f32,
    pub height: f32,
}

/// Probe and resulting logo rect for one anchor.
fn evaluate_anchor(raster: &PageRaster, footprint: Footprint, anchor: AnchorPosition) -> PlacementResult {
    let page_w = raster.width() as f32;
    let page_h = raster.height() as f32;
    let area_w = footprint.width + PROBE_MARGIN_PX * 2.0;
    let area_h = footprint.height + PROBE_MARGIN_PX * 2.0;
    let (x_ratio, y_ratio) = anchor.ratios();

    let x = (x_ratio * page_w - area_w / 2.0).floor();
    let y = (y_ratio * page_h - area_h / 2.0).floor();
    // Keep a margin of clearance from the page edge; max wins on tiny pages.
    let safe_x = x.min(page_w - area_w - PROBE_MARGIN_PX).max(PROBE_MARGIN_PX);
    let safe_y = y.min(page_h - area_h - PROBE_MARGIN_PX).max(PROBE_MARGIN_PX);

    let probe = ProbeRegion::new(
        safe_x as i64,
        safe_y as i64,
        area_w.ceil() as i64,
        area_h.ceil() as i64,
    );
    let status = classify_region(raster, probe);
    log::debug!("anchor {anchor}: probe {probe:?} -> {status}");

    PlacementResult {
        rect: RasterRect::within(
            safe_x + PROBE_MARGIN_PX,
            safe_y + PROBE_MARGIN_PX,
            footprint.width,
            footprint.height,
            page_w,
            page_h,
        ),
        status,
        anchor,
    }
}

/// First candidate accepted by `strict`, else the first accepted by `relaxed`.
///
/// Candidates are produced lazily and each is evaluated at most once; the
/// relaxed pass replays the evaluations of the strict pass.
pub fn first_strict_then_relaxed<T, I>(
    candidates: I,
    strict: impl Fn(&T) -> bool,
    relaxed: impl Fn(&T) -> bool,
) -> Option<T>
where
    I: IntoIterator<Item = T>,
{
    let mut seen = Vec::new();
    for candidate in candidates {
        if strict(&candidate) {
            return Some(candidate);
        }
        seen.push(candidate);
    }
    seen.into_iter().find(|c| relaxed(c))
}

fn search_ladder(
    raster: &PageRaster,
    footprint: Footprint,
    ladder: impl IntoIterator<Item = AnchorPosition>,
) -> Option<PlacementResult> {
    first_strict_then_relaxed(
        ladder
            .into_iter()
            .map(|anchor| evaluate_anchor(raster, footprint, anchor)),
        |r| r.status == PlacementStatus::Blank,
        |r| r.status == PlacementStatus::Light,
    )
}

/// Chooses where a logo of `footprint` goes on `raster`.
///
/// With a preferred anchor the result keeps that anchor unless it is not blank
/// and `fallback` is given; then the rest of the fallback ladder is searched,
/// blank first, light second. Without a preferred anchor the four corners are
/// searched the same way and the first corner is returned when nothing fits.
pub fn select_placement(
    raster: &PageRaster,
    footprint: Footprint,
    preferred: Option<AnchorPosition>,
    fallback: Option<&FallbackPriority>,
) -> PlacementResult {
    match preferred {
        Some(anchor) => {
            let result = evaluate_anchor(raster, footprint, anchor);
            if result.status == PlacementStatus::Blank {
                return result;
            }
            let Some(priority) = fallback else {
                return result;
            };
            let ladder = priority.anchors().iter().copied().filter(|a| *a != anchor);
            match search_ladder(raster, footprint, ladder) {
                Some(alt) => {
                    log::debug!(
                        "preferred anchor {anchor} is {}, falling back to {} ({})",
                        result.status,
                        alt.anchor,
                        alt.status
                    );
                    alt
                }
                None => result,
            }
        }
        None => search_ladder(raster, footprint, AUTOMATIC_LADDER)
            .unwrap_or_else(|| evaluate_anchor(raster, footprint, AUTOMATIC_LADDER[0])),
    }
}

/// Aspect-preserving logo footprint whose longer side is `size_pt` points,
/// expressed in pixels at `render_scale`.
pub fn logo_footprint(image_w: u32, image_h: u32, size_pt: f32, render_scale: f32) -> Footprint {
    let target = size_pt * render_scale;
    if image_w == 0 || image_h == 0 {
        return Footprint {
            width: target.round(),
            height: target.round(),
        };
    }
    let aspect = image_w as f32 / image_h as f32;
    if aspect >= 1.0 {
        Footprint {
            width: target.round(),
            height: (target / aspect).round(),
        }
    } else {
        Footprint {
            width: (target * aspect).round(),
            height: target.round(),
        }
    }
}

/// Logo size for auto-size mode: a percentage of the displayed page width,
/// kept within the logo size bounds.
pub fn auto_logo_size(page_width_pt: f32, percent: f32) -> f32 {
    (page_width_pt * percent / 100.0).clamp(LOGO_SIZE_MIN, LOGO_SIZE_MAX)
}
