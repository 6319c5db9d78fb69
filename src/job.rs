use std::sync::Arc;
use std::time::Instant;

use crate::compositor::OverlayCompositor;
use crate::compositor::header_footer::{self, PageContext, layout_header_footer};
use crate::compositor::watermark::layout_watermark;
use crate::config::{LOGO_SIZE_MAX, LOGO_SIZE_MIN, LogoSettings, OverlaySettings};
use crate::fonts::JobFonts;
use crate::model::{
    EntityKind, LogoOverlay, LogoPlacement, OverlayEntity, OverlayFailure, PageGeometry,
    PageOverlay, PageRaster, RasterRect, SourceImage,
};
use crate::placement::{auto_logo_size, logo_footprint, select_placement};

/// Document-level values for header/footer tokens.
#[derive(Clone, Debug, Default)]
pub struct DocumentInfo {
    pub title: String,
    pub date: String,
}

/// User adjustments for a single page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageOverrides {
    pub skip_logo: bool,
    /// Dragged rectangle in raster pixels; replaces detection.
    pub manual_rect: Option<RasterRect>,
    pub logo_opacity: Option<u8>,
    /// Longer logo side in points.
    pub logo_size: Option<f32>,
}

/// Everything decided for a page before composition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagePlan {
    pub geometry: PageGeometry,
    pub logo: LogoPlacement,
    pub logo_opacity: Option<u8>,
}

/// Logo size in points for a page, before the footprint is computed.
pub fn logo_size_for(settings: &LogoSettings, overrides: &PageOverrides, page: &PageGeometry) -> f32 {
    if let Some(size) = overrides.logo_size {
        return size.clamp(LOGO_SIZE_MIN, LOGO_SIZE_MAX);
    }
    if settings.auto_size {
        let (display_w, _) = page.display_size();
        return auto_logo_size(display_w, settings.auto_size_percent);
    }
    settings.size
}

/// Decides the logo placement of one page from its raster.
///
/// `logo_pixels` is the pixel size of the source logo, used for its aspect
/// ratio. `raster` must be the rendering of `page`: both carry the same
/// rotation and render scale.
pub fn plan_page(
    raster: &PageRaster,
    page: &PageGeometry,
    logo_pixels: (u32, u32),
    settings: &LogoSettings,
    overrides: &PageOverrides,
) -> PagePlan {
    debug_assert_eq!(
        raster.rotation(),
        page.rotation,
        "raster rotation does not match the page geometry"
    );
    debug_assert!(
        raster.render_scale() == page.render_scale,
        "raster render scale {} does not match the page geometry ({})",
        raster.render_scale(),
        page.render_scale,
    );
    let page_w = raster.width() as f32;
    let page_h = raster.height() as f32;

    let logo = if overrides.skip_logo {
        LogoPlacement::Skip
    } else if let Some(rect) = overrides.manual_rect {
        let (width, height) = match overrides.logo_size {
            Some(_) => {
                let size = logo_size_for(settings, overrides, page);
                let footprint = logo_footprint(logo_pixels.0, logo_pixels.1, size, page.render_scale);
                (footprint.width, footprint.height)
            }
            None => (rect.width(), rect.height()),
        };
        LogoPlacement::Manual(RasterRect::within(
            rect.x(),
            rect.y(),
            width,
            height,
            page_w,
            page_h,
        ))
    } else {
        let size = logo_size_for(settings, overrides, page);
        let footprint = logo_footprint(logo_pixels.0, logo_pixels.1, size, page.render_scale);
        let fallback = settings.effective_fallback();
        LogoPlacement::Detected(select_placement(
            raster,
            footprint,
            settings.preferred_anchor,
            fallback.as_ref(),
        ))
    };

    PagePlan {
        geometry: *page,
        logo,
        logo_opacity: overrides.logo_opacity,
    }
}

/// Every string the job may draw, for deciding on a Unicode font.
pub fn job_texts(settings: &OverlaySettings, doc: &DocumentInfo) -> Vec<String> {
    let mut texts = header_footer::job_strings(&settings.header_footer, &doc.date, &doc.title);
    if settings.watermark.enabled {
        texts.push(settings.watermark.text.clone());
    }
    texts
}

fn page_entities(
    settings: &OverlaySettings,
    logo: Option<&Arc<SourceImage>>,
    plan: &PagePlan,
    ctx: &PageContext,
    fonts: &JobFonts,
    failures: &mut Vec<OverlayFailure>,
) -> Vec<OverlayEntity> {
    let mut entities = Vec::new();

    if let (Some(source), Some(rect)) = (logo, plan.logo.rect()) {
        let opacity = plan
            .logo_opacity
            .unwrap_or(settings.logo.opacity)
            .clamp(10, 100);
        entities.push(OverlayEntity::Logo(LogoOverlay {
            rect,
            opacity_percent: opacity,
            source: Arc::clone(source),
        }));
    }

    if settings.watermark.enabled {
        match layout_watermark(&settings.watermark, &plan.geometry, fonts) {
            Ok(text) => entities.push(OverlayEntity::Text(text)),
            Err(error) => {
                log::warn!("page {}: watermark skipped: {error}", ctx.page_number);
                failures.push(OverlayFailure {
                    entity: EntityKind::Watermark,
                    error,
                });
            }
        }
    }

    let (texts, mut text_failures) =
        layout_header_footer(&settings.header_footer, &plan.geometry, ctx, fonts);
    entities.extend(texts.into_iter().map(OverlayEntity::Text));
    failures.append(&mut text_failures);

    entities
}

/// Composes every page of a job in order.
pub fn compose_job(
    compositor: &mut OverlayCompositor,
    settings: &OverlaySettings,
    logo: Option<&Arc<SourceImage>>,
    pages: &[PagePlan],
    doc: &DocumentInfo,
    fonts: &JobFonts,
) -> Vec<PageOverlay> {
    let t0 = Instant::now();
    let total_pages = pages.len();

    let overlays: Vec<PageOverlay> = pages
        .iter()
        .enumerate()
        .map(|(index, plan)| {
            let ctx = PageContext {
                page_number: index + 1,
                total_pages,
                date: &doc.date,
                title: &doc.title,
            };
            let mut layout_failures = Vec::new();
            let entities = page_entities(settings, logo, plan, &ctx, fonts, &mut layout_failures);
            let mut overlay = compositor.compose_page(index, &plan.geometry, &entities, fonts);
            overlay.failures.append(&mut layout_failures);
            overlay
        })
        .collect();

    let failed = overlays.iter().filter(|o| !o.is_complete()).count();
    log::info!(
        "Composed {} pages ({} with failures, {} logo encodes) in {:.1}ms",
        overlays.len(),
        failed,
        compositor.encode_count(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    overlays
}
