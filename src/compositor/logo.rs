use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use resvg::{tiny_skia, usvg};

use crate::error::Error;
use crate::model::{LogoAsset, Rotation, SourceImage};

/// Vector logos are rasterized at twice their intrinsic size.
const SVG_RENDER_SCALE: f32 = 2.0;
/// Pixel length used when an SVG side has no usable size.
const SVG_FALLBACK_SIDE: u32 = 200;

/// Sniffs SVG markup; raster formats are left to `image`.
fn is_svg(data: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&data[..data.len().min(4096)]);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with('<') && head.contains("<svg")
}

fn parse_svg(data: &[u8]) -> Result<usvg::Tree, Error> {
    usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| Error::ImageDecode(format!("svg: {e}")))
}

fn svg_side(len: f32) -> u32 {
    let px = (len * SVG_RENDER_SCALE).round();
    if px.is_finite() && px >= 1.0 {
        px as u32
    } else {
        SVG_FALLBACK_SIDE
    }
}

fn svg_pixel_size(tree: &usvg::Tree) -> (u32, u32) {
    let size = tree.size();
    (svg_side(size.width()), svg_side(size.height()))
}

fn rasterize_svg(data: &[u8]) -> Result<RgbaImage, Error> {
    let tree = parse_svg(data)?;
    let (width, height) = svg_pixel_size(&tree);
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::ImageDecode(format!("svg canvas {width}x{height}")))?;
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha.
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    log::debug!("svg logo rasterized at {width}x{height}");
    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::ImageDecode(format!("svg buffer {width}x{height}")))
}

/// Pixel size of an encoded logo without decoding the whole bitmap.
///
/// SVG logos report the size they rasterize to.
pub fn source_dimensions(source: &SourceImage) -> Result<(u32, u32), Error> {
    if is_svg(&source.data) {
        return parse_svg(&source.data).map(|tree| svg_pixel_size(&tree));
    }
    image::ImageReader::new(Cursor::new(&source.data))
        .with_guessed_format()
        .map_err(|e| Error::ImageDecode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| Error::ImageDecode(e.to_string()))
}

fn decode(source: &SourceImage) -> Result<RgbaImage, Error> {
    if is_svg(&source.data) {
        return rasterize_svg(&source.data);
    }
    image::load_from_memory(&source.data)
        .map(|img| img.to_rgba8())
        .map_err(|e| Error::ImageDecode(e.to_string()))
}

/// Turns the bitmap so it reads upright after the viewer applies `page_rotation`.
fn counter_rotate(img: &RgbaImage, page_rotation: Rotation) -> RgbaImage {
    match page_rotation.counter() {
        Rotation::Deg0 => img.clone(),
        Rotation::Deg90 => imageops::rotate90(img),
        Rotation::Deg180 => imageops::rotate180(img),
        Rotation::Deg270 => imageops::rotate270(img),
    }
}

/// Same result as drawing onto a transparent canvas with a global alpha.
fn apply_opacity(img: &mut RgbaImage, opacity_percent: u8) {
    if opacity_percent >= 100 {
        return;
    }
    let op = opacity_percent as u32;
    for px in img.pixels_mut() {
        px.0[3] = ((px.0[3] as u32 * op + 50) / 100) as u8;
    }
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| Error::ImageEncode(e.to_string()))?;
    Ok(out)
}

/// Prepared logo bitmaps keyed by (page rotation, opacity).
///
/// Bound to one source image at a time; handing it a different source drops
/// the variants of the previous one.
#[derive(Default)]
pub struct LogoVariantCache {
    source: Option<Arc<SourceImage>>,
    decoded: Option<RgbaImage>,
    variants: HashMap<(Rotation, u8), Arc<LogoAsset>>,
    encodes: usize,
}

impl LogoVariantCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variant(
        &mut self,
        source: &Arc<SourceImage>,
        rotation: Rotation,
        opacity_percent: u8,
    ) -> Result<Arc<LogoAsset>, Error> {
        let same_source = self
            .source
            .as_ref()
            .is_some_and(|cached| Arc::ptr_eq(cached, source));
        if !same_source {
            self.source = Some(Arc::clone(source));
            self.decoded = None;
            self.variants.clear();
        }

        let key = (rotation, opacity_percent);
        if let Some(asset) = self.variants.get(&key) {
            log::debug!(
                "logo variant cache hit: rotation={} opacity={opacity_percent}",
                rotation.degrees()
            );
            return Ok(Arc::clone(asset));
        }

        let base = match self.decoded.take() {
            Some(img) => img,
            None => decode(source)?,
        };

        let t0 = std::time::Instant::now();
        let mut img = counter_rotate(&base, rotation);
        self.decoded = Some(base);
        apply_opacity(&mut img, opacity_percent);
        let (pixel_width, pixel_height) = img.dimensions();
        let png = encode_png(img)?;
        self.encodes += 1;
        log::debug!(
            "logo variant encoded: rotation={} opacity={opacity_percent} {}x{} {} bytes in {:.1}ms",
            rotation.degrees(),
            pixel_width,
            pixel_height,
            png.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        let asset = Arc::new(LogoAsset {
            rotation,
            opacity_percent,
            pixel_width,
            pixel_height,
            png,
        });
        self.variants.insert(key, Arc::clone(&asset));
        Ok(asset)
    }

    /// PNG encodes performed so far.
    pub fn encode_count(&self) -> usize {
        self.encodes
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
