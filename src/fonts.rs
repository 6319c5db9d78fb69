use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use memmap2::Mmap;
use ttf_parser::Face;

use crate::error::Error;
use crate::model::FontFace;

/// The base-14 families offered for watermark and header/footer text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StandardFont {
    Helvetica,
    #[cfg_attr(feature = "serde", serde(rename = "Times-Roman"))]
    TimesRoman,
    Courier,
}

impl StandardFont {
    pub fn base_font(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::Courier => "Courier",
        }
    }

    /// Approximate advance of a WinAnsi byte at 1000 units/em.
    fn width_1000(self, byte: u8) -> f32 {
        match self {
            StandardFont::Courier => 600.0,
            StandardFont::Helvetica => match byte {
                32 => 278.0,                          // space
                33..=47 => 333.0,                     // punctuation
                48..=57 => 556.0,                     // digits
                58..=64 => 333.0,                     // more punctuation
                73 | 74 => 278.0,                     // I J (narrow uppercase)
                77 => 833.0,                          // M (wide)
                65..=90 => 667.0,                     // uppercase A-Z (average)
                91..=96 => 333.0,                     // brackets etc.
                102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
                109 | 119 => 833.0,                   // m w (wide)
                97..=122 => 556.0,                    // lowercase a-z (average)
                _ => 556.0,
            },
            StandardFont::TimesRoman => match byte {
                32 => 250.0,
                33..=47 => 333.0,
                48..=57 => 500.0,
                58..=64 => 278.0,
                73 => 333.0,
                74 => 389.0,
                77 => 889.0,
                87 => 944.0,
                65..=90 => 667.0,
                91..=96 => 333.0,
                102 | 105 | 106 | 108 | 116 => 278.0,
                109 => 778.0,
                119 => 722.0,
                97..=122 => 500.0,
                _ => 500.0,
            },
        }
    }
}

/// Map a single Unicode char to its WinAnsi byte, or `None` if unmappable.
fn char_to_winansi(c: char) -> Option<u8> {
    let byte = match c as u32 {
        0x0000..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8, // Latin-1 supplement maps directly
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// True when every char of `text` has a WinAnsi code.
pub fn is_winansi(text: &str) -> bool {
    text.chars().all(|c| char_to_winansi(c).is_some())
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(char_to_winansi).collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.push((gid >> 8) as u8);
        out.push((gid & 0xFF) as u8);
    }
    out
}

/// Result of subsetting: the smaller font program and where each char landed.
#[derive(Clone, Debug)]
pub struct SubsetFont {
    pub data: Vec<u8>,
    /// Char -> glyph id inside `data`.
    pub char_to_gid: HashMap<char, u16>,
}

/// Capability to shrink a font to a set of code points.
pub trait FontSubsetter {
    fn subset(
        &self,
        font_data: &[u8],
        face_index: u32,
        code_points: &BTreeSet<char>,
    ) -> Result<SubsetFont, Error>;
}

/// Subsets TrueType/OpenType faces with `subsetter`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TtfSubsetter;

impl FontSubsetter for TtfSubsetter {
    fn subset(
        &self,
        font_data: &[u8],
        face_index: u32,
        code_points: &BTreeSet<char>,
    ) -> Result<SubsetFont, Error> {
        let face =
            Face::parse(font_data, face_index).map_err(|e| Error::FontParse(e.to_string()))?;

        let mut remapper = subsetter::GlyphRemapper::new();
        let mut char_to_gid = HashMap::new();
        for &ch in code_points {
            if let Some(gid) = face.glyph_index(ch) {
                char_to_gid.insert(ch, remapper.remap(gid.0));
            }
        }

        let data = subsetter::subset(font_data, face_index, &remapper)
            .map_err(|e| Error::FontSubset(e.to_string()))?;
        Ok(SubsetFont { data, char_to_gid })
    }
}

enum FontData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

/// Full font program used for text that WinAnsi cannot encode.
pub struct FontSource {
    name: String,
    data: FontData,
    face_index: u32,
}

impl FontSource {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data: FontData::Owned(data),
            face_index: 0,
        }
    }

    /// Memory-maps a TTF/OTF file; the face name is taken from the file stem.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        let map = unsafe { Mmap::map(&file) }?;
        Face::parse(&map, 0).map_err(|e| Error::FontParse(format!("{}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UnicodeFont")
            .to_string();
        Ok(Self {
            name,
            data: FontData::Mapped(map),
            face_index: 0,
        })
    }

    pub fn with_face_index(mut self, face_index: u32) -> Self {
        self.face_index = face_index;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        match &self.data {
            FontData::Owned(v) => v.as_slice(),
            FontData::Mapped(m) => &m[..],
        }
    }
}

/// Subsetted Unicode font for one job, with the metrics needed to lay out and
/// embed it. Metrics come from the full face; glyph ids from the subset.
#[derive(Clone, Debug)]
pub struct UnicodeFont {
    pub name: String,
    pub data: Vec<u8>,
    pub char_to_gid: HashMap<char, u16>,
    pub char_widths_1000: HashMap<char, f32>,
    pub ascender_ratio: f32,
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bbox: [f32; 4],
}

impl UnicodeFont {
    pub fn covers(&self, text: &str) -> bool {
        text.chars().all(|c| self.char_to_gid.contains_key(&c))
    }
}

/// Fonts available while composing one job.
#[derive(Clone, Debug, Default)]
pub struct JobFonts {
    unicode: Option<UnicodeFont>,
}

impl JobFonts {
    /// Built-in metrics only; non-WinAnsi text will be rejected.
    pub fn builtin() -> Self {
        Self { unicode: None }
    }

    pub fn unicode(&self) -> Option<&UnicodeFont> {
        self.unicode.as_ref()
    }

    /// The face that draws `text` when the user picked `font`.
    pub fn face_for(&self, text: &str, font: StandardFont) -> Result<FontFace, Error> {
        if is_winansi(text) {
            return Ok(FontFace::Standard(font));
        }
        match &self.unicode {
            Some(u) if u.covers(text) => Ok(FontFace::Unicode),
            _ => Err(Error::MissingGlyphs(text.to_string())),
        }
    }

    pub fn text_width(&self, face: FontFace, text: &str, font_size: f32) -> f32 {
        let units: f32 = match (face, &self.unicode) {
            (FontFace::Standard(font), _) => to_winansi_bytes(text)
                .into_iter()
                .map(|b| if b >= 32 { font.width_1000(b) } else { 0.0 })
                .sum(),
            (FontFace::Unicode, Some(u)) => text
                .chars()
                .map(|c| u.char_widths_1000.get(&c).copied().unwrap_or(0.0))
                .sum(),
            (FontFace::Unicode, None) => 0.0,
        };
        units * font_size / 1000.0
    }

    /// Ascender height as a fraction of the font size.
    pub fn ascender_ratio(&self, face: FontFace) -> f32 {
        match (face, &self.unicode) {
            (FontFace::Unicode, Some(u)) => u.ascender_ratio,
            _ => 0.75,
        }
    }
}

/// Picks between built-in metrics and a subsetted Unicode font for a job.
pub struct FontResolver<'a> {
    source: Option<&'a FontSource>,
    subsetter: &'a dyn FontSubsetter,
}

impl<'a> FontResolver<'a> {
    pub fn new(source: Option<&'a FontSource>, subsetter: &'a dyn FontSubsetter) -> Self {
        Self { source, subsetter }
    }

    /// Requests one subset covering every code point of the strings that
    /// WinAnsi cannot encode. Failure leaves the job on built-in metrics; the
    /// affected entities then fail individually.
    pub fn resolve<S: AsRef<str>>(&self, texts: &[S]) -> JobFonts {
        let code_points: BTreeSet<char> = texts
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !is_winansi(t))
            .flat_map(str::chars)
            .collect();
        if code_points.is_empty() {
            return JobFonts::builtin();
        }
        let Some(source) = self.source else {
            log::warn!(
                "{} non-WinAnsi chars in job but no Unicode font configured",
                code_points.len()
            );
            return JobFonts::builtin();
        };

        let t0 = std::time::Instant::now();
        match build_unicode_font(source, self.subsetter, &code_points) {
            Ok(font) => {
                log::info!(
                    "Subset {} to {} glyphs ({} bytes) in {:.1}ms",
                    source.name(),
                    font.char_to_gid.len(),
                    font.data.len(),
                    t0.elapsed().as_secs_f64() * 1000.0,
                );
                JobFonts {
                    unicode: Some(font),
                }
            }
            Err(e) => {
                log::warn!("Unicode font {} unusable: {e}", source.name());
                JobFonts::builtin()
            }
        }
    }
}

fn build_unicode_font(
    source: &FontSource,
    subsetter: &dyn FontSubsetter,
    code_points: &BTreeSet<char>,
) -> Result<UnicodeFont, Error> {
    let data = source.data();
    let face = Face::parse(data, source.face_index).map_err(|e| Error::FontParse(e.to_string()))?;

    let units = face.units_per_em() as f32;
    let to_1000 = |v: f32| v / units * 1000.0;
    let bb = face.global_bounding_box();

    let char_widths_1000 = code_points
        .iter()
        .filter_map(|&ch| {
            let gid = face.glyph_index(ch)?;
            let adv = face.glyph_hor_advance(gid).unwrap_or(0);
            Some((ch, to_1000(adv as f32)))
        })
        .collect();

    let subset = subsetter.subset(data, source.face_index, code_points)?;

    Ok(UnicodeFont {
        name: source.name().replace(' ', ""),
        data: subset.data,
        char_to_gid: subset.char_to_gid,
        char_widths_1000,
        ascender_ratio: face.ascender() as f32 / units,
        ascent: to_1000(face.ascender() as f32),
        descent: to_1000(face.descender() as f32),
        cap_height: face
            .capital_height()
            .map(|h| to_1000(h as f32))
            .unwrap_or(700.0),
        bbox: [
            to_1000(bb.x_min as f32),
            to_1000(bb.y_min as f32),
            to_1000(bb.x_max as f32),
            to_1000(bb.y_max as f32),
        ],
    })
}
