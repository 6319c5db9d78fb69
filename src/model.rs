use std::sync::Arc;

use crate::anchors::AnchorPosition;
use crate::error::Error;
use crate::fonts::StandardFont;

/// Quarter-turn page rotation, clockwise, as stored in the page's `/Rotate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(deg: i32) -> Result<Self, Error> {
        match deg {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// The rotation that undoes this one (360 - self).
    pub fn counter(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// True for 90 and 270, where displayed width and height trade places.
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// A rendered page: RGBA pixels in displayed (rotation-applied) orientation.
#[derive(Clone, Debug)]
pub struct PageRaster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    rotation: Rotation,
    render_scale: f32,
}

impl PageRaster {
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        rotation: Rotation,
        render_scale: f32,
    ) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyRaster);
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::RasterSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            rotation,
            render_scale,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn render_scale(&self) -> f32 {
        self.render_scale
    }

    /// RGB of the pixel at (x, y). Caller guarantees bounds.
    pub(crate) fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// Native page dimensions plus what is needed to relate them to a raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    /// Unrotated MediaBox width in points.
    pub width_pt: f32,
    /// Unrotated MediaBox height in points.
    pub height_pt: f32,
    pub rotation: Rotation,
    pub render_scale: f32,
}

impl PageGeometry {
    pub fn new(width_pt: f32, height_pt: f32, rotation: Rotation, render_scale: f32) -> Self {
        Self {
            width_pt,
            height_pt,
            rotation,
            render_scale,
        }
    }

    /// Page size in points as the viewer sees it.
    pub fn display_size(&self) -> (f32, f32) {
        if self.rotation.is_sideways() {
            (self.height_pt, self.width_pt)
        } else {
            (self.width_pt, self.height_pt)
        }
    }

    /// Size of the raster a rasterizer produces for this page at `render_scale`.
    pub fn raster_size(&self) -> (f32, f32) {
        let (w, h) = self.display_size();
        (w * self.render_scale, h * self.render_scale)
    }
}

fn clamp_span(origin: f32, len: f32, bound: f32) -> (f32, f32) {
    let len = len.max(0.0).min(bound.max(0.0));
    let origin = origin.max(0.0).min(bound - len);
    (origin, len)
}

/// Rectangle in raster space: pixels, origin top-left, Y down, displayed orientation.
///
/// Always lies inside the page it was constructed against. Convert to native
/// space only through [`crate::transform`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl RasterRect {
    /// Builds a rect inside a `page_w` x `page_h` raster. Out-of-bounds origins
    /// are shifted inward; sizes larger than the page are truncated.
    pub fn within(x: f32, y: f32, width: f32, height: f32, page_w: f32, page_h: f32) -> Self {
        let (x, width) = clamp_span(x, width, page_w);
        let (y, height) = clamp_span(y, height, page_h);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Rectangle in native space: points, origin bottom-left, Y up, unrotated page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PdfRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl PdfRect {
    pub fn within(x: f32, y: f32, width: f32, height: f32, page_w: f32, page_h: f32) -> Self {
        let (x, width) = clamp_span(x, width, page_w);
        let (y, height) = clamp_span(y, height, page_h);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Point in displayed page space: points, origin top-left, Y down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

/// Point in native space: points, origin bottom-left, Y up. Not clamped;
/// tiled text may start beyond the page edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PdfPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementStatus {
    Blank,
    Light,
    Occupied,
}

impl std::fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PlacementStatus::Blank => "blank",
            PlacementStatus::Light => "light",
            PlacementStatus::Occupied => "occupied",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementResult {
    pub rect: RasterRect,
    pub status: PlacementStatus,
    pub anchor: AnchorPosition,
}

/// Where the logo goes on one page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogoPlacement {
    Detected(PlacementResult),
    /// User-dragged rectangle; already clamped, never classified.
    Manual(RasterRect),
    Skip,
}

impl LogoPlacement {
    pub fn rect(&self) -> Option<RasterRect> {
        match self {
            LogoPlacement::Detected(result) => Some(result.rect),
            LogoPlacement::Manual(rect) => Some(*rect),
            LogoPlacement::Skip => None,
        }
    }
}

/// Encoded logo bytes as supplied by the host (PNG, JPEG or SVG).
#[derive(Debug)]
pub struct SourceImage {
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Logo,
    Watermark,
    Header,
    Footer,
}

#[derive(Clone, Debug)]
pub struct LogoOverlay {
    pub rect: RasterRect,
    pub opacity_percent: u8,
    pub source: Arc<SourceImage>,
}

#[derive(Clone, Debug)]
pub struct TextOverlay {
    pub kind: EntityKind,
    pub text: String,
    pub font: StandardFont,
    pub font_size: f32,
    pub color: [u8; 3],
    pub opacity_percent: u8,
    /// Counter-clockwise angle as the viewer sees it.
    pub rotation_deg: f32,
    /// Baseline start of each copy of the text.
    pub origins: Vec<DisplayPoint>,
}

#[derive(Clone, Debug)]
pub enum OverlayEntity {
    Logo(LogoOverlay),
    Text(TextOverlay),
}

impl OverlayEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            OverlayEntity::Logo(_) => EntityKind::Logo,
            OverlayEntity::Text(t) => t.kind,
        }
    }
}

/// A logo bitmap prepared for one (page rotation, opacity) pair.
#[derive(Debug)]
pub struct LogoAsset {
    pub rotation: Rotation,
    pub opacity_percent: u8,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// PNG re-encoded after counter-rotation and opacity.
    pub png: Vec<u8>,
}

/// Which font program draws a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontFace {
    Standard(StandardFont),
    /// The job's subsetted Unicode font.
    Unicode,
}

#[derive(Clone, Debug)]
pub struct TextDraw {
    pub text: String,
    pub face: FontFace,
    pub font_size: f32,
    pub color: [u8; 3],
    pub opacity: f32,
    /// Counter-clockwise angle in native space.
    pub angle_deg: f32,
    pub origin: PdfPoint,
}

#[derive(Clone, Debug)]
pub enum DrawOp {
    Image { asset: Arc<LogoAsset>, rect: PdfRect },
    Text(TextDraw),
}

#[derive(Debug)]
pub struct OverlayFailure {
    pub entity: EntityKind,
    pub error: Error,
}

/// Draw operations for one page plus the entities that could not be drawn.
#[derive(Debug)]
pub struct PageOverlay {
    pub page_index: usize,
    pub geometry: PageGeometry,
    pub ops: Vec<DrawOp>,
    pub failures: Vec<OverlayFailure>,
}

impl PageOverlay {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
