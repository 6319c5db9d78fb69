use crate::config::{TILE_POINT_CAP, TileSettings, WATERMARK_EDGE_INSET, WatermarkPosition, WatermarkSettings};
use crate::error::Error;
use crate::fonts::JobFonts;
use crate::model::{DisplayPoint, EntityKind, PageGeometry, TextOverlay};

/// Axis-aligned extent of a `w` x `h` box turned by `angle_deg`.
fn rotated_extent(w: f32, h: f32, angle_deg: f32) -> (f32, f32) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    (
        (w * cos).abs() + (h * sin).abs(),
        (w * sin).abs() + (h * cos).abs(),
    )
}

/// Centers of tiled copies, row-major, in displayed points.
///
/// The grid starts `overrun` before the top-left corner and runs `overrun`
/// past the bottom-right one, so rotated copies at the edges are not cut off.
/// Neighbouring centers are exactly the configured spacing apart. Generation
/// stops after `cap` copies.
pub fn tile_centers(
    display_w: f32,
    display_h: f32,
    overrun: f32,
    tile: &TileSettings,
    cap: usize,
) -> Vec<DisplayPoint> {
    let step_x = tile.horizontal_spacing.max(1.0);
    let step_y = tile.vertical_spacing.max(1.0);

    let mut points = Vec::new();
    let mut row = 0usize;
    let mut y = -overrun;
    'rows: while y <= display_h + overrun {
        let shift = if tile.offset_alternate_rows && row % 2 == 1 {
            -step_x / 2.0
        } else {
            0.0
        };
        let mut x = -overrun + shift;
        while x <= display_w + overrun {
            if points.len() == cap {
                break 'rows;
            }
            points.push(DisplayPoint { x, y });
            x += step_x;
        }
        row += 1;
        y += step_y;
    }
    points
}

/// Visual center of a single watermark on a `display_w` x `display_h` page.
fn single_center(
    position: WatermarkPosition,
    display_w: f32,
    display_h: f32,
    extent: (f32, f32),
) -> DisplayPoint {
    let (half_w, half_h) = (extent.0 / 2.0, extent.1 / 2.0);
    let left = WATERMARK_EDGE_INSET + half_w;
    let right = display_w - WATERMARK_EDGE_INSET - half_w;
    let top = WATERMARK_EDGE_INSET + half_h;
    let bottom = display_h - WATERMARK_EDGE_INSET - half_h;
    let (x, y) = match position {
        WatermarkPosition::TopLeft => (left, top),
        WatermarkPosition::TopRight => (right, top),
        WatermarkPosition::BottomLeft => (left, bottom),
        WatermarkPosition::BottomRight => (right, bottom),
        WatermarkPosition::Center | WatermarkPosition::Tile => (display_w / 2.0, display_h / 2.0),
    };
    DisplayPoint { x, y }
}

/// Baseline origin that puts the middle of a `text_w` x `text_h` run at
/// `center` when drawn at `angle_deg` (counter-clockwise, Y down).
fn origin_for_center(center: DisplayPoint, text_w: f32, text_h: f32, angle_deg: f32) -> DisplayPoint {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let (dir_x, dir_y) = (cos, -sin);
    let (up_x, up_y) = (-sin, -cos);
    DisplayPoint {
        x: center.x - dir_x * text_w / 2.0 - up_x * text_h / 2.0,
        y: center.y - dir_y * text_w / 2.0 - up_y * text_h / 2.0,
    }
}

/// Lays out the watermark text for one page in displayed coordinates.
pub fn layout_watermark(
    settings: &WatermarkSettings,
    page: &PageGeometry,
    fonts: &JobFonts,
) -> Result<TextOverlay, Error> {
    let face = fonts.face_for(&settings.text, settings.font)?;
    let text_w = fonts.text_width(face, &settings.text, settings.font_size);
    let text_h = settings.font_size * fonts.ascender_ratio(face);
    let (display_w, display_h) = page.display_size();

    let centers = match settings.position {
        WatermarkPosition::Tile => {
            let overrun = text_w.max(settings.font_size);
            tile_centers(display_w, display_h, overrun, &settings.tile, TILE_POINT_CAP)
        }
        single => {
            let extent = rotated_extent(text_w, settings.font_size, settings.rotation);
            vec![single_center(single, display_w, display_h, extent)]
        }
    };

    let origins = centers
        .into_iter()
        .map(|c| origin_for_center(c, text_w, text_h, settings.rotation))
        .collect();

    Ok(TextOverlay {
        kind: EntityKind::Watermark,
        text: settings.text.clone(),
        font: settings.font,
        font_size: settings.font_size,
        color: settings.color,
        opacity_percent: settings.opacity,
        rotation_deg: settings.rotation,
        origins,
    })
}
