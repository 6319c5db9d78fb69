mod common;

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::PathBuf;

use common::init_logging;
use pagemark_pdf::Error;
use pagemark_pdf::config::UNICODE_FONT_ENV;
use pagemark_pdf::fonts::{
    FontResolver, FontSource, FontSubsetter, JobFonts, StandardFont, SubsetFont, TtfSubsetter,
    is_winansi,
};
use pagemark_pdf::model::FontFace;

/// Counts calls and always fails.
#[derive(Default)]
struct RecordingSubsetter {
    calls: Cell<usize>,
}

impl FontSubsetter for RecordingSubsetter {
    fn subset(
        &self,
        _font_data: &[u8],
        _face_index: u32,
        _code_points: &BTreeSet<char>,
    ) -> Result<SubsetFont, Error> {
        self.calls.set(self.calls.get() + 1);
        Err(Error::FontSubset("unavailable".to_string()))
    }
}

#[test]
fn winansi_detection() {
    assert!(is_winansi("Page 1 / 2 \u{20ac} \u{2014} caf\u{e9}"));
    assert!(!is_winansi("\u{65e5}\u{672c}"));
    assert!(!is_winansi("\u{0141}\u{00f3}d\u{017a}"));
}

#[test]
fn builtin_metrics_measure_standard_fonts() {
    let fonts = JobFonts::builtin();
    let helvetica = FontFace::Standard(StandardFont::Helvetica);
    let courier = FontFace::Standard(StandardFont::Courier);
    assert!((fonts.text_width(helvetica, "1 / 2", 10.0) - 20.01).abs() < 1e-3);
    assert!((fonts.text_width(courier, "abcd", 10.0) - 24.0).abs() < 1e-3);
    assert_eq!(fonts.ascender_ratio(helvetica), 0.75);
    assert_eq!(
        fonts.face_for("Draft", StandardFont::TimesRoman).unwrap(),
        FontFace::Standard(StandardFont::TimesRoman)
    );
    assert!(matches!(
        fonts.face_for("\u{65e5}", StandardFont::Helvetica),
        Err(Error::MissingGlyphs(_))
    ));
}

#[test]
fn winansi_jobs_never_subset() {
    let subsetter = RecordingSubsetter::default();
    let source = FontSource::from_bytes("Any", vec![0; 16]);
    let fonts = FontResolver::new(Some(&source), &subsetter).resolve(&["Page {page}", "CONFIDENTIAL"]);
    assert!(fonts.unicode().is_none());
    assert_eq!(subsetter.calls.get(), 0);
}

#[test]
fn unusable_font_falls_back_to_builtin() {
    init_logging();
    let subsetter = RecordingSubsetter::default();
    let source = FontSource::from_bytes("Broken", b"not a font".to_vec());
    let fonts = FontResolver::new(Some(&source), &subsetter).resolve(&["\u{65e5}\u{672c}", "ok"]);
    assert!(fonts.unicode().is_none());

    let fonts = FontResolver::new(None, &subsetter).resolve(&["\u{65e5}\u{672c}"]);
    assert!(fonts.unicode().is_none());
    assert_eq!(subsetter.calls.get(), 0);
}

/// Runs only when a Unicode font is configured through the environment.
#[test]
fn configured_font_covers_job_text() {
    let Some(path) = std::env::var_os(UNICODE_FONT_ENV).map(PathBuf::from) else {
        return;
    };
    init_logging();
    let source = FontSource::open(&path).expect("open font");
    let text = "\u{0141}\u{00f3}d\u{017a}";
    let fonts = FontResolver::new(Some(&source), &TtfSubsetter).resolve(&[text]);
    let Some(unicode) = fonts.unicode() else {
        panic!("font at {} did not subset", path.display());
    };
    if !unicode.covers(text) {
        return;
    }
    assert_eq!(fonts.face_for(text, StandardFont::Helvetica).unwrap(), FontFace::Unicode);
    assert!(fonts.text_width(FontFace::Unicode, text, 12.0) > 0.0);
    assert!(unicode.data.len() < source.data().len());
}
