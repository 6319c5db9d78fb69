mod common;

use std::cell::Cell;

use common::{BLACK, Canvas, init_logging, white_raster};
use pagemark_pdf::anchors::{ALL_ANCHORS, AnchorPosition};
use pagemark_pdf::placement::{
    Footprint, auto_logo_size, first_strict_then_relaxed, logo_footprint, select_placement,
};
use pagemark_pdf::{FallbackPriority, PlacementStatus, Rotation};

const PAGE_W: u32 = 900;
const PAGE_H: u32 = 1165;
const LOGO: Footprint = Footprint {
    width: 120.0,
    height: 80.0,
};

fn dark_page() -> Canvas {
    Canvas::new(PAGE_W, PAGE_H, BLACK)
}

#[test]
fn white_page_keeps_preferred_anchor() {
    init_logging();
    let raster = white_raster(PAGE_W, PAGE_H);
    let result = select_placement(&raster, LOGO, Some(AnchorPosition::RightBottom), None);
    assert_eq!(result.anchor, AnchorPosition::RightBottom);
    assert_eq!(result.status, PlacementStatus::Blank);
    assert_eq!(result.rect.x(), 705.0);
    assert_eq!(result.rect.y(), 1008.0);
    assert_eq!(result.rect.width(), 120.0);
    assert_eq!(result.rect.height(), 80.0);
}

#[test]
fn fallback_disabled_returns_preferred_even_if_occupied() {
    let raster = dark_page().raster(Rotation::Deg0, 1.5);
    let result = select_placement(&raster, LOGO, Some(AnchorPosition::RightBottom), None);
    assert_eq!(result.anchor, AnchorPosition::RightBottom);
    assert_eq!(result.status, PlacementStatus::Occupied);
    assert_eq!((result.rect.x(), result.rect.y()), (705.0, 1008.0));
}

#[test]
fn fallback_takes_first_blank_entry_over_earlier_light_one() {
    init_logging();
    // Center probe is light, left-top probe is white, everything else dark.
    let raster = dark_page()
        .fill(375, 527, 150, 110, [230, 230, 230])
        .fill(40, 40, 220, 170, [255, 255, 255])
        .raster(Rotation::Deg0, 1.5);
    let priority = FallbackPriority::new(&[
        AnchorPosition::Center,
        AnchorPosition::RightTop,
        AnchorPosition::LeftTop,
        AnchorPosition::RightBottom,
        AnchorPosition::LeftBottom,
        AnchorPosition::TopCenter,
        AnchorPosition::BottomCenter,
        AnchorPosition::LeftCenter,
        AnchorPosition::RightCenter,
    ])
    .unwrap();

    let result = select_placement(
        &raster,
        LOGO,
        Some(AnchorPosition::RightBottom),
        Some(&priority),
    );
    assert_eq!(result.anchor, AnchorPosition::LeftTop);
    assert_eq!(result.status, PlacementStatus::Blank);
    assert_eq!((result.rect.x(), result.rect.y()), (75.0, 76.0));
}

#[test]
fn fallback_settles_for_light_when_nothing_is_blank() {
    let raster = dark_page()
        .fill(375, 527, 150, 110, [230, 230, 230])
        .raster(Rotation::Deg0, 1.5);
    let priority = FallbackPriority::default();
    let result = select_placement(
        &raster,
        LOGO,
        Some(AnchorPosition::RightBottom),
        Some(&priority),
    );
    assert_eq!(result.anchor, AnchorPosition::Center);
    assert_eq!(result.status, PlacementStatus::Light);
}

#[test]
fn fallback_with_no_candidates_returns_preferred() {
    let raster = dark_page().raster(Rotation::Deg0, 1.5);
    let priority = FallbackPriority::default();
    let result = select_placement(&raster, LOGO, Some(AnchorPosition::LeftTop), Some(&priority));
    assert_eq!(result.anchor, AnchorPosition::LeftTop);
    assert_eq!(result.status, PlacementStatus::Occupied);
}

#[test]
fn automatic_search_walks_the_corners() {
    // Only the left-bottom probe is white.
    let raster = dark_page()
        .fill(40, 980, 220, 170, [255, 255, 255])
        .raster(Rotation::Deg0, 1.5);
    let result = select_placement(&raster, LOGO, None, None);
    assert_eq!(result.anchor, AnchorPosition::LeftBottom);
    assert_eq!(result.status, PlacementStatus::Blank);

    let dark = dark_page().raster(Rotation::Deg0, 1.5);
    let result = select_placement(&dark, LOGO, None, None);
    assert_eq!(result.anchor, AnchorPosition::RightBottom);
    assert_eq!(result.status, PlacementStatus::Occupied);
}

#[test]
fn selection_is_deterministic() {
    let raster = dark_page()
        .fill(375, 527, 150, 110, [230, 230, 230])
        .raster(Rotation::Deg0, 1.5);
    let priority = FallbackPriority::default();
    let first = select_placement(&raster, LOGO, Some(AnchorPosition::RightBottom), Some(&priority));
    for _ in 0..5 {
        let again =
            select_placement(&raster, LOGO, Some(AnchorPosition::RightBottom), Some(&priority));
        assert_eq!(again, first);
    }
}

#[test]
fn logo_rect_stays_on_tiny_pages() {
    let raster = white_raster(100, 60);
    for anchor in ALL_ANCHORS {
        let rect = select_placement(&raster, LOGO, Some(anchor), None).rect;
        assert!(rect.x() >= 0.0 && rect.y() >= 0.0, "{anchor}");
        assert!(rect.x() + rect.width() <= 100.0, "{anchor}");
        assert!(rect.y() + rect.height() <= 60.0, "{anchor}");
    }
}

#[test]
fn two_pass_search_evaluates_each_candidate_once() {
    let evaluated = Cell::new(0);
    let found = first_strict_then_relaxed(
        [1, 2, 3, 4].into_iter().inspect(|_| evaluated.set(evaluated.get() + 1)),
        |n| *n > 10,
        |n| n % 3 == 0,
    );
    assert_eq!(found, Some(3));
    assert_eq!(evaluated.get(), 4);

    let evaluated = Cell::new(0);
    let found = first_strict_then_relaxed(
        [1, 2, 3, 4].into_iter().inspect(|_| evaluated.set(evaluated.get() + 1)),
        |n| *n == 2,
        |_| true,
    );
    assert_eq!(found, Some(2));
    assert_eq!(evaluated.get(), 2);
}

#[test]
fn footprint_keeps_aspect_ratio() {
    assert_eq!(
        logo_footprint(400, 200, 80.0, 1.5),
        Footprint {
            width: 120.0,
            height: 60.0
        }
    );
    assert_eq!(
        logo_footprint(200, 400, 80.0, 1.5),
        Footprint {
            width: 60.0,
            height: 120.0
        }
    );
    assert_eq!(
        logo_footprint(300, 300, 100.0, 2.0),
        Footprint {
            width: 200.0,
            height: 200.0
        }
    );
}

#[test]
fn auto_size_is_clamped() {
    assert!((auto_logo_size(595.0, 8.0) - 47.6).abs() < 1e-3);
    assert_eq!(auto_logo_size(300.0, 8.0), 40.0);
    assert_eq!(auto_logo_size(3000.0, 8.0), 200.0);
}
