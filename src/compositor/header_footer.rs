use crate::config::{HeaderFooterRow, HeaderFooterSettings, TextBlock};
use crate::fonts::JobFonts;
use crate::model::{DisplayPoint, EntityKind, OverlayFailure, PageGeometry, TextOverlay};

/// Values available to `{page}`, `{total}`, `{date}` and `{title}`.
#[derive(Clone, Debug)]
pub struct PageContext<'a> {
    /// 1-based.
    pub page_number: usize,
    pub total_pages: usize,
    pub date: &'a str,
    pub title: &'a str,
}

fn token_value(name: &str, ctx: &PageContext) -> Option<String> {
    match name {
        "page" => Some(ctx.page_number.to_string()),
        "total" => Some(ctx.total_pages.to_string()),
        "date" => Some(ctx.date.to_string()),
        "title" => Some(ctx.title.to_string()),
        _ => None,
    }
}

/// Expands tokens in one left-to-right pass. Substituted values are copied
/// as they are, so braces inside a title or date stay literal.
pub fn substitute_tokens(template: &str, ctx: &PageContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let token = tail
            .find('}')
            .and_then(|close| Some((close, token_value(&tail[..close], ctx)?)));
        match token {
            Some((close, value)) => {
                out.push_str(&value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

fn blocks(row: &HeaderFooterRow) -> [(Align, &TextBlock); 3] {
    [
        (Align::Left, &row.left),
        (Align::Center, &row.center),
        (Align::Right, &row.right),
    ]
}

fn layout_row(
    row: &HeaderFooterRow,
    kind: EntityKind,
    page: &PageGeometry,
    ctx: &PageContext,
    fonts: &JobFonts,
    overlays: &mut Vec<TextOverlay>,
    failures: &mut Vec<OverlayFailure>,
) {
    if !row.enabled {
        return;
    }
    let (display_w, display_h) = page.display_size();

    for (align, block) in blocks(row) {
        if !block.enabled {
            continue;
        }
        let text = substitute_tokens(&block.text, ctx);
        if text.trim().is_empty() {
            continue;
        }
        let face = match fonts.face_for(&text, row.font) {
            Ok(face) => face,
            Err(error) => {
                log::warn!("{kind:?} block {align:?} skipped: {error}");
                failures.push(OverlayFailure {
                    entity: kind,
                    error,
                });
                continue;
            }
        };

        let width = fonts.text_width(face, &text, row.font_size);
        let ascender_ratio = fonts.ascender_ratio(face);
        let x = match align {
            Align::Left => row.margin,
            Align::Center => (display_w - width) / 2.0,
            Align::Right => display_w - row.margin - width,
        };
        let baseline_y = if kind == EntityKind::Header {
            row.margin + row.font_size * ascender_ratio
        } else {
            display_h - row.margin - row.font_size * (1.0 - ascender_ratio)
        };

        overlays.push(TextOverlay {
            kind,
            text,
            font: row.font,
            font_size: row.font_size,
            color: row.color,
            opacity_percent: 100,
            rotation_deg: 0.0,
            origins: vec![DisplayPoint { x, y: baseline_y }],
        });
    }
}

/// Header and footer text for one page, one overlay per enabled block.
/// Blocks that cannot be measured are reported and left out.
pub fn layout_header_footer(
    settings: &HeaderFooterSettings,
    page: &PageGeometry,
    ctx: &PageContext,
    fonts: &JobFonts,
) -> (Vec<TextOverlay>, Vec<OverlayFailure>) {
    let mut overlays = Vec::new();
    let mut failures = Vec::new();
    layout_row(
        &settings.header,
        EntityKind::Header,
        page,
        ctx,
        fonts,
        &mut overlays,
        &mut failures,
    );
    layout_row(
        &settings.footer,
        EntityKind::Footer,
        page,
        ctx,
        fonts,
        &mut overlays,
        &mut failures,
    );
    (overlays, failures)
}

/// Every string the header/footer can produce for a job, with page numbers
/// left as digits. Used to decide which code points need a Unicode font.
pub fn job_strings(settings: &HeaderFooterSettings, date: &str, title: &str) -> Vec<String> {
    let ctx = PageContext {
        page_number: 0,
        total_pages: 0,
        date,
        title,
    };
    [&settings.header, &settings.footer]
        .into_iter()
        .filter(|row| row.enabled)
        .flat_map(|row| blocks(row).into_iter().map(|(_, b)| b))
        .filter(|b| b.enabled)
        .map(|b| substitute_tokens(&b.text, &ctx))
        .collect()
}
