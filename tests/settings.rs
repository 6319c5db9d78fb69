use pagemark_pdf::anchors::{ALL_ANCHORS, AUTOMATIC_LADDER, AnchorPosition};
use pagemark_pdf::config::{LogoSettings, OverlaySettings, WatermarkPosition};
use pagemark_pdf::fonts::StandardFont;
use pagemark_pdf::{Error, FallbackPriority};

#[test]
fn anchor_names_round_trip() {
    for anchor in ALL_ANCHORS {
        assert_eq!(anchor.name().parse::<AnchorPosition>().unwrap(), anchor);
    }
    assert_eq!(
        "Right-Bottom".parse::<AnchorPosition>().unwrap(),
        AnchorPosition::RightBottom
    );
    assert!(matches!(
        "bottom-right".parse::<AnchorPosition>(),
        Err(Error::UnknownAnchor(_))
    ));
}

#[test]
fn ratios_stay_on_the_page() {
    for anchor in ALL_ANCHORS {
        let (x, y) = anchor.ratios();
        assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y), "{anchor}");
    }
    assert_eq!(AUTOMATIC_LADDER, ALL_ANCHORS[..4]);
}

#[test]
fn fallback_priority_must_be_a_permutation() {
    assert!(FallbackPriority::new(&ALL_ANCHORS).is_ok());

    let mut reversed = ALL_ANCHORS;
    reversed.reverse();
    assert_eq!(
        FallbackPriority::new(&reversed).unwrap().anchors()[0],
        AnchorPosition::RightCenter
    );

    let short = &ALL_ANCHORS[..8];
    assert!(matches!(
        FallbackPriority::new(short),
        Err(Error::InvalidFallbackPriority(_))
    ));

    let mut duplicated = ALL_ANCHORS;
    duplicated[8] = AnchorPosition::Center;
    assert!(matches!(
        FallbackPriority::new(&duplicated),
        Err(Error::InvalidFallbackPriority(_))
    ));

    let mut long = ALL_ANCHORS.to_vec();
    long.push(AnchorPosition::Center);
    assert!(FallbackPriority::try_from(long).is_err());
}

#[test]
fn fallback_priority_parses_comma_lists() {
    let list = "left-top, right-top,left-bottom,right-bottom,center,top-center,bottom-center,left-center,right-center";
    let priority: FallbackPriority = list.parse().unwrap();
    assert_eq!(priority.anchors()[0], AnchorPosition::LeftTop);
    assert_eq!(priority.anchors()[3], AnchorPosition::RightBottom);

    assert!("left-top,right-top".parse::<FallbackPriority>().is_err());
    assert!("left-top,nowhere".parse::<FallbackPriority>().is_err());
}

#[test]
fn fallback_defaults_to_catalog_order_when_enabled() {
    let mut logo = LogoSettings::default();
    assert_eq!(logo.effective_fallback(), None);
    logo.auto_fallback = true;
    assert_eq!(logo.effective_fallback(), Some(FallbackPriority::default()));
    assert_eq!(FallbackPriority::default().anchors(), &ALL_ANCHORS);
}

#[test]
fn logo_settings_are_clamped() {
    let logo = LogoSettings {
        size: 500.0,
        opacity: 3,
        auto_size_percent: 40.0,
        ..Default::default()
    }
    .sanitized();
    assert_eq!(logo.size, 200.0);
    assert_eq!(logo.opacity, 10);
    assert_eq!(logo.auto_size_percent, 15.0);
}

#[cfg(feature = "serde")]
#[test]
fn settings_file_fills_missing_fields_with_defaults() {
    let json = r#"{
        "logo": {
            "preferred_anchor": "left-top",
            "auto_fallback": true,
            "fallback_priority": ["center", "right-top", "left-top", "right-bottom",
                "left-bottom", "top-center", "bottom-center", "left-center", "right-center"]
        },
        "watermark": { "enabled": true, "position": "tile", "font": "Times-Roman" }
    }"#;
    let settings: OverlaySettings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.logo.preferred_anchor, Some(AnchorPosition::LeftTop));
    assert_eq!(settings.logo.size, 80.0);
    assert_eq!(
        settings.logo.fallback_priority.unwrap().anchors()[0],
        AnchorPosition::Center
    );
    assert_eq!(settings.watermark.position, WatermarkPosition::Tile);
    assert_eq!(settings.watermark.font, StandardFont::TimesRoman);
    assert_eq!(settings.watermark.text, "CONFIDENTIAL");
    assert!(!settings.header_footer.footer.enabled);
}

#[cfg(feature = "serde")]
#[test]
fn settings_file_rejects_bad_fallback_lists() {
    let json = r#"{ "logo": { "fallback_priority": ["center", "center"] } }"#;
    assert!(serde_json::from_str::<OverlaySettings>(json).is_err());
}
