#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pagemark_pdf::{PageRaster, Rotation, SourceImage};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Page pixels built up from filled rectangles.
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = (0..width as usize * height as usize)
            .flat_map(|_| [rgb[0], rgb[1], rgb[2], 255])
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn white(width: u32, height: u32) -> Self {
        Self::new(width, height, WHITE)
    }

    /// Fills the part of the rect that lies on the canvas.
    pub fn fill(mut self, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) -> Self {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                let i = (py as usize * self.width as usize + px as usize) * 4;
                self.pixels[i..i + 3].copy_from_slice(&rgb);
            }
        }
        self
    }

    pub fn raster(self, rotation: Rotation, scale: f32) -> PageRaster {
        PageRaster::new(self.width, self.height, self.pixels, rotation, scale)
            .expect("valid raster")
    }
}

pub fn white_raster(width: u32, height: u32) -> PageRaster {
    Canvas::white(width, height).raster(Rotation::Deg0, 1.5)
}

/// Opaque PNG logo of the given size, red with a blue left half so
/// orientation is visible after rotation.
pub fn logo_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([255, 0, 0, 255])
        }
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode png");
    out
}

pub fn logo_source(width: u32, height: u32) -> Arc<SourceImage> {
    Arc::new(SourceImage {
        data: logo_png(width, height),
    })
}

pub fn decode_png(data: &[u8]) -> RgbaImage {
    image::load_from_memory_with_format(data, ImageFormat::Png)
        .expect("decode png")
        .to_rgba8()
}
