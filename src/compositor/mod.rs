//! Turns overlay entities into native draw operations, one page at a time.

pub mod header_footer;
pub mod logo;
pub mod watermark;

use crate::error::Error;
use crate::fonts::JobFonts;
use crate::model::{
    DrawOp, LogoOverlay, OverlayEntity, OverlayFailure, PageGeometry, PageOverlay, TextDraw,
    TextOverlay,
};
use crate::transform::{display_to_native_point, native_text_angle, raster_to_native};

use logo::LogoVariantCache;

/// Owns the logo variant cache for the lifetime of a job.
#[derive(Default)]
pub struct OverlayCompositor {
    logos: LogoVariantCache,
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw operations for every entity of one page. An entity that fails is
    /// recorded in the result and the rest are still drawn.
    pub fn compose_page(
        &mut self,
        page_index: usize,
        geometry: &PageGeometry,
        entities: &[OverlayEntity],
        fonts: &JobFonts,
    ) -> PageOverlay {
        let mut ops = Vec::new();
        let mut failures = Vec::new();

        for entity in entities {
            let drawn = match entity {
                OverlayEntity::Logo(logo) => self.logo_op(logo, geometry).map(|op| vec![op]),
                OverlayEntity::Text(text) => text_ops(text, geometry, fonts),
            };
            match drawn {
                Ok(mut entity_ops) => ops.append(&mut entity_ops),
                Err(error) => {
                    log::warn!(
                        "page {}: {:?} skipped: {error}",
                        page_index + 1,
                        entity.kind()
                    );
                    failures.push(OverlayFailure {
                        entity: entity.kind(),
                        error,
                    });
                }
            }
        }

        PageOverlay {
            page_index,
            geometry: *geometry,
            ops,
            failures,
        }
    }

    fn logo_op(&mut self, logo: &LogoOverlay, geometry: &PageGeometry) -> Result<DrawOp, Error> {
        let asset = self
            .logos
            .variant(&logo.source, geometry.rotation, logo.opacity_percent)?;
        Ok(DrawOp::Image {
            asset,
            rect: raster_to_native(&logo.rect, geometry),
        })
    }

    /// PNG encodes performed by the logo cache so far.
    pub fn encode_count(&self) -> usize {
        self.logos.encode_count()
    }
}

fn text_ops(text: &TextOverlay, geometry: &PageGeometry, fonts: &JobFonts) -> Result<Vec<DrawOp>, Error> {
    let face = fonts.face_for(&text.text, text.font)?;
    let angle_deg = native_text_angle(text.rotation_deg, geometry.rotation);
    let opacity = text.opacity_percent as f32 / 100.0;

    Ok(text
        .origins
        .iter()
        .map(|&origin| {
            DrawOp::Text(TextDraw {
                text: text.text.clone(),
                face,
                font_size: text.font_size,
                color: text.color,
                opacity,
                angle_deg,
                origin: display_to_native_point(origin, geometry),
            })
        })
        .collect())
}
