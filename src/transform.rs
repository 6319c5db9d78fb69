//! Conversions between raster space and native PDF space.
//!
//! Raster space is what the viewer sees: pixels, origin top-left, Y down, with
//! the page's `/Rotate` already applied. Native space is what the content
//! stream draws in: points, origin bottom-left, Y up, unrotated. A rotated
//! page's raster is sized against the swapped (effective) dimensions.
//!
//! Positions go through fractions of the effective page so one formula per
//! rotation covers every page size:
//!
//! | rotation | native x       | native y       |
//! |----------|----------------|----------------|
//! | 0        | fx * W         | (1 - fy) * H   |
//! | 90       | fy * W         | fx * H         |
//! | 180      | (1 - fx) * W   | fy * H         |
//! | 270      | (1 - fy) * W   | (1 - fx) * H   |
//!
//! where (fx, fy) is the displayed point as fractions of the displayed width
//! and height and W x H is the unrotated page.

use crate::model::{DisplayPoint, PageGeometry, PdfPoint, PdfRect, RasterRect, Rotation};

/// Displayed-fraction point to native points.
fn fraction_to_native(fx: f32, fy: f32, page: &PageGeometry) -> (f32, f32) {
    let (w, h) = (page.width_pt, page.height_pt);
    match page.rotation {
        Rotation::Deg0 => (fx * w, (1.0 - fy) * h),
        Rotation::Deg90 => (fy * w, fx * h),
        Rotation::Deg180 => ((1.0 - fx) * w, fy * h),
        Rotation::Deg270 => ((1.0 - fy) * w, (1.0 - fx) * h),
    }
}

/// Native point to displayed fractions; inverse of [`fraction_to_native`].
fn native_to_fraction(x: f32, y: f32, page: &PageGeometry) -> (f32, f32) {
    let u = x / page.width_pt;
    let v = y / page.height_pt;
    match page.rotation {
        Rotation::Deg0 => (u, 1.0 - v),
        Rotation::Deg90 => (v, u),
        Rotation::Deg180 => (1.0 - u, v),
        Rotation::Deg270 => (1.0 - v, 1.0 - u),
    }
}

/// Raster pixels to native points.
///
/// For 90 and 270 the native rect's width and height are the raster rect's
/// height and width. That swapped size is also the draw size of an asset that
/// was counter-rotated before embedding, since its pixels are already turned.
pub fn raster_to_native(rect: &RasterRect, page: &PageGeometry) -> PdfRect {
    let (eff_w, eff_h) = page.display_size();
    let scale = page.render_scale;

    let left = rect.x() / scale / eff_w;
    let top = rect.y() / scale / eff_h;
    let right = (rect.x() + rect.width()) / scale / eff_w;
    let bottom = (rect.y() + rect.height()) / scale / eff_h;

    let (ax, ay) = fraction_to_native(left, top, page);
    let (bx, by) = fraction_to_native(right, bottom, page);

    PdfRect::within(
        ax.min(bx),
        ay.min(by),
        (ax - bx).abs(),
        (ay - by).abs(),
        page.width_pt,
        page.height_pt,
    )
}

/// Native points to raster pixels; inverse of [`raster_to_native`].
pub fn native_to_raster(rect: &PdfRect, page: &PageGeometry) -> RasterRect {
    let (eff_w, eff_h) = page.display_size();
    let scale = page.render_scale;

    let (ax, ay) = native_to_fraction(rect.x(), rect.y(), page);
    let (bx, by) = native_to_fraction(rect.x() + rect.width(), rect.y() + rect.height(), page);

    let left = ax.min(bx) * eff_w * scale;
    let top = ay.min(by) * eff_h * scale;
    let width = (ax - bx).abs() * eff_w * scale;
    let height = (ay - by).abs() * eff_h * scale;

    let (raster_w, raster_h) = page.raster_size();
    RasterRect::within(left, top, width, height, raster_w, raster_h)
}

/// Displayed point (points, top-left origin) to native point.
pub fn display_to_native_point(point: DisplayPoint, page: &PageGeometry) -> PdfPoint {
    let (eff_w, eff_h) = page.display_size();
    let (x, y) = fraction_to_native(point.x / eff_w, point.y / eff_h, page);
    PdfPoint { x, y }
}

/// Native point to displayed point; inverse of [`display_to_native_point`].
pub fn native_to_display_point(point: PdfPoint, page: &PageGeometry) -> DisplayPoint {
    let (eff_w, eff_h) = page.display_size();
    let (fx, fy) = native_to_fraction(point.x, point.y, page);
    DisplayPoint {
        x: fx * eff_w,
        y: fy * eff_h,
    }
}

/// Native text angle that shows up as `visual_deg` (counter-clockwise) once
/// the viewer turns the page clockwise by its rotation.
pub fn native_text_angle(visual_deg: f32, rotation: Rotation) -> f32 {
    (visual_deg + rotation.degrees() as f32).rem_euclid(360.0)
}
