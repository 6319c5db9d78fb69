//! Serializes composed pages into a standalone overlay PDF.
//!
//! Each overlay page copies the source page's MediaBox and `/Rotate`, so the
//! result can be stamped onto the source document page for page.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::error::Error;
use crate::fonts::{JobFonts, UnicodeFont, encode_as_gids, to_winansi_bytes};
use crate::model::{DrawOp, FontFace, LogoAsset, PageOverlay, TextDraw};

struct Resource {
    pdf_name: String,
    id: Ref,
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

/// Writes the subsetted font as a Type0/CID font with Identity-H encoding.
fn embed_unicode_font(pdf: &mut Pdf, font: &UnicodeFont, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let font_ref = alloc();
    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    pdf.stream(data_ref, &font.data)
        .pair(Name(b"Length1"), font.data.len() as i32);

    let [x_min, y_min, x_max, y_max] = font.bbox;
    pdf.font_descriptor(descriptor_ref)
        .name(Name(font.name.as_bytes()))
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(x_min, y_min, x_max, y_max))
        .italic_angle(0.0)
        .ascent(font.ascent)
        .descent(font.descent)
        .cap_height(font.cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(CidFontType::Type2);
        cid.base_font(Name(font.name.as_bytes()));
        cid.system_info(identity_system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = font
            .char_to_gid
            .iter()
            .map(|(ch, &gid)| (gid, font.char_widths_1000.get(ch).copied().unwrap_or(0.0)))
            .collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        gid_widths.dedup_by_key(|&mut (gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", font.name);
    let mut cmap = UnicodeCmap::new(Name(cmap_name.as_bytes()), identity_system_info());
    for (&ch, &gid) in &font.char_to_gid {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(font.name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    font_ref
}

/// Writes a prepared logo as an RGB image XObject with an alpha soft mask.
fn embed_logo(pdf: &mut Pdf, asset: &LogoAsset, alloc: &mut impl FnMut() -> Ref) -> Result<Ref, Error> {
    let rgba = image::load_from_memory_with_format(&asset.png, image::ImageFormat::Png)
        .map_err(|e| Error::ImageDecode(e.to_string()))?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok(xobj_ref)
}

fn opacity_key(opacity: f32) -> u16 {
    (opacity.clamp(0.0, 1.0) * 1000.0).round() as u16
}

fn text_bytes(text: &TextDraw, fonts: &JobFonts) -> Result<Vec<u8>, Error> {
    match text.face {
        FontFace::Standard(_) => Ok(to_winansi_bytes(&text.text)),
        FontFace::Unicode => fonts
            .unicode()
            .map(|u| encode_as_gids(&text.text, &u.char_to_gid))
            .ok_or_else(|| Error::MissingGlyphs(text.text.clone())),
    }
}

fn draw_text(content: &mut Content, text: &TextDraw, font: &str, gs: Option<&str>, bytes: &[u8]) {
    let (sin, cos) = text.angle_deg.to_radians().sin_cos();
    let [r, g, b] = text.color;
    content.save_state();
    if let Some(gs) = gs {
        content.set_parameters(Name(gs.as_bytes()));
    }
    content
        .set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
        .begin_text()
        .set_font(Name(font.as_bytes()), text.font_size)
        .set_text_matrix([cos, sin, -sin, cos, text.origin.x, text.origin.y])
        .show(Str(bytes))
        .end_text();
    content.restore_state();
}

/// One overlay page per entry of `pages`, in order.
///
/// An op whose image or font cannot be written is logged and left out; the
/// rest of its page and every other page are still drawn.
pub fn render_overlay(pages: &[PageOverlay], fonts: &JobFonts) -> Vec<u8> {
    let t0 = Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };
    let catalog_id = alloc();
    let pages_id = alloc();

    // Shared resources, in first-use order. `None` marks a resource that
    // failed once and is not retried.
    let mut font_ids: HashMap<FontFace, Option<usize>> = HashMap::new();
    let mut font_res: Vec<Resource> = Vec::new();
    let mut image_ids: HashMap<*const LogoAsset, Option<usize>> = HashMap::new();
    let mut image_res: Vec<Resource> = Vec::new();
    let mut gs_ids: HashMap<u16, usize> = HashMap::new();
    let mut gs_res: Vec<Resource> = Vec::new();
    let mut skipped = 0usize;

    let mut contents = Vec::with_capacity(pages.len());
    for page in pages {
        let mut content = Content::new();
        for op in &page.ops {
            match op {
                DrawOp::Image { asset, rect } => {
                    let key = Arc::as_ptr(asset);
                    let index = match image_ids.get(&key) {
                        Some(&known) => known,
                        None => {
                            let embedded = match embed_logo(&mut pdf, asset, &mut alloc) {
                                Ok(id) => {
                                    image_res.push(Resource {
                                        pdf_name: format!("Im{}", image_res.len() + 1),
                                        id,
                                    });
                                    Some(image_res.len() - 1)
                                }
                                Err(e) => {
                                    log::warn!("page {}: logo image skipped: {e}", page.page_index + 1);
                                    None
                                }
                            };
                            image_ids.insert(key, embedded);
                            embedded
                        }
                    };
                    let Some(index) = index else {
                        skipped += 1;
                        continue;
                    };
                    content.save_state();
                    content.transform([rect.width(), 0.0, 0.0, rect.height(), rect.x(), rect.y()]);
                    content.x_object(Name(image_res[index].pdf_name.as_bytes()));
                    content.restore_state();
                }
                DrawOp::Text(text) => {
                    let bytes = match text_bytes(text, fonts) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            log::warn!("page {}: text skipped: {e}", page.page_index + 1);
                            skipped += 1;
                            continue;
                        }
                    };
                    let font_index = match font_ids.get(&text.face) {
                        Some(&known) => known,
                        None => {
                            let id = match text.face {
                                FontFace::Standard(font) => {
                                    let id = alloc();
                                    pdf.type1_font(id)
                                        .base_font(Name(font.base_font().as_bytes()))
                                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                                    Some(id)
                                }
                                FontFace::Unicode => match fonts.unicode() {
                                    Some(unicode) => Some(embed_unicode_font(&mut pdf, unicode, &mut alloc)),
                                    None => {
                                        log::warn!(
                                            "page {}: no Unicode font for {:?}",
                                            page.page_index + 1,
                                            text.text
                                        );
                                        None
                                    }
                                },
                            };
                            let registered = id.map(|id| {
                                font_res.push(Resource {
                                    pdf_name: format!("F{}", font_res.len() + 1),
                                    id,
                                });
                                font_res.len() - 1
                            });
                            font_ids.insert(text.face, registered);
                            registered
                        }
                    };
                    let Some(font_index) = font_index else {
                        skipped += 1;
                        continue;
                    };

                    let gs_index = if text.opacity < 1.0 {
                        let key = opacity_key(text.opacity);
                        Some(match gs_ids.get(&key) {
                            Some(&i) => i,
                            None => {
                                let id = alloc();
                                let alpha = key as f32 / 1000.0;
                                pdf.ext_graphics(id)
                                    .non_stroking_alpha(alpha)
                                    .stroking_alpha(alpha);
                                gs_res.push(Resource {
                                    pdf_name: format!("GS{}", gs_res.len() + 1),
                                    id,
                                });
                                gs_ids.insert(key, gs_res.len() - 1);
                                gs_res.len() - 1
                            }
                        })
                    } else {
                        None
                    };

                    draw_text(
                        &mut content,
                        text,
                        &font_res[font_index].pdf_name,
                        gs_index.map(|i| gs_res[i].pdf_name.as_str()),
                        &bytes,
                    );
                }
            }
        }
        contents.push(content);
    }

    let n = contents.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, c) in contents.into_iter().enumerate() {
        let raw = c.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for (i, overlay) in pages.iter().enumerate() {
        let g = &overlay.geometry;
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, g.width_pt, g.height_pt))
            .rotate(g.rotation.degrees())
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        if !font_res.is_empty() {
            let mut dict = resources.fonts();
            for r in &font_res {
                dict.pair(Name(r.pdf_name.as_bytes()), r.id);
            }
        }
        if !image_res.is_empty() {
            let mut dict = resources.x_objects();
            for r in &image_res {
                dict.pair(Name(r.pdf_name.as_bytes()), r.id);
            }
        }
        if !gs_res.is_empty() {
            let mut dict = resources.ext_g_states();
            for r in &gs_res {
                dict.pair(Name(r.pdf_name.as_bytes()), r.id);
            }
        }
    }

    let bytes = pdf.finish();
    log::info!(
        "Overlay PDF: {} pages, {} fonts, {} images, {} ops skipped, {} bytes in {:.1}ms",
        n,
        font_res.len(),
        image_res.len(),
        skipped,
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    bytes
}
