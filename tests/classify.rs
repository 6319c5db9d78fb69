mod common;

use common::{BLACK, Canvas, white_raster};
use pagemark_pdf::classify::{ProbeRegion, classify_region};
use pagemark_pdf::{Error, PageRaster, PlacementStatus, Rotation};
use rayon::prelude::*;

#[test]
fn probe_entirely_outside_raster_is_occupied() {
    let raster = white_raster(100, 100);
    for probe in [
        ProbeRegion::new(200, 200, 50, 50),
        ProbeRegion::new(-100, -100, 50, 50),
        ProbeRegion::new(100, 0, 10, 10),
        ProbeRegion::new(10, 10, 0, 30),
    ] {
        assert_eq!(classify_region(&raster, probe), PlacementStatus::Occupied, "{probe:?}");
    }
}

#[test]
fn probe_partly_outside_samples_only_the_overlap() {
    let raster = Canvas::white(100, 100)
        .fill(60, 60, 40, 40, BLACK)
        .raster(Rotation::Deg0, 1.5);
    assert_eq!(
        classify_region(&raster, ProbeRegion::new(-50, -50, 100, 100)),
        PlacementStatus::Blank
    );
    assert_eq!(
        classify_region(&raster, ProbeRegion::new(70, 70, 100, 100)),
        PlacementStatus::Occupied
    );
}

#[test]
fn uniform_pages() {
    let probe = ProbeRegion::new(0, 0, 50, 50);
    let cases = [
        ([255, 255, 255], PlacementStatus::Blank),
        ([241, 241, 241], PlacementStatus::Blank),
        ([240, 240, 240], PlacementStatus::Light),
        ([230, 230, 230], PlacementStatus::Light),
        ([220, 220, 220], PlacementStatus::Occupied),
        ([200, 200, 200], PlacementStatus::Occupied),
        ([255, 255, 100], PlacementStatus::Occupied),
    ];
    for (rgb, expected) in cases {
        let raster = Canvas::new(50, 50, rgb).raster(Rotation::Deg0, 1.5);
        assert_eq!(classify_region(&raster, probe), expected, "{rgb:?}");
    }
}

#[test]
fn alpha_channel_is_ignored() {
    let mut pixels = Vec::new();
    for _ in 0..20 * 20 {
        pixels.extend_from_slice(&[255, 255, 255, 0]);
    }
    let raster = PageRaster::new(20, 20, pixels, Rotation::Deg0, 1.5).unwrap();
    assert_eq!(
        classify_region(&raster, ProbeRegion::new(0, 0, 20, 20)),
        PlacementStatus::Blank
    );
}

#[test]
fn light_ratio_cutoff() {
    // 100 x 10 probe: 86 light columns is 86 %, 84 is 84 %.
    let probe = ProbeRegion::new(0, 0, 100, 10);
    let above = Canvas::new(100, 10, BLACK)
        .fill(0, 0, 86, 10, [230, 230, 230])
        .raster(Rotation::Deg0, 1.5);
    let below = Canvas::new(100, 10, BLACK)
        .fill(0, 0, 84, 10, [230, 230, 230])
        .raster(Rotation::Deg0, 1.5);
    assert_eq!(classify_region(&above, probe), PlacementStatus::Light);
    assert_eq!(classify_region(&below, probe), PlacementStatus::Occupied);
}

#[test]
fn blank_ratio_cutoff() {
    let probe = ProbeRegion::new(0, 0, 100, 10);
    // 96 % white, 4 % dark.
    let blank = Canvas::white(100, 10)
        .fill(96, 0, 4, 10, BLACK)
        .raster(Rotation::Deg0, 1.5);
    // 95 % white is not more than the cutoff; 95 % is also not light enough.
    let edge = Canvas::white(100, 10)
        .fill(95, 0, 5, 10, BLACK)
        .raster(Rotation::Deg0, 1.5);
    assert_eq!(classify_region(&blank, probe), PlacementStatus::Blank);
    assert_eq!(classify_region(&edge, probe), PlacementStatus::Light);
}

#[test]
fn malformed_rasters_are_rejected() {
    assert!(matches!(
        PageRaster::new(0, 10, Vec::new(), Rotation::Deg0, 1.5),
        Err(Error::EmptyRaster)
    ));
    assert!(matches!(
        PageRaster::new(2, 2, vec![0; 15], Rotation::Deg0, 1.5),
        Err(Error::RasterSize {
            expected: 16,
            actual: 15
        })
    ));
}

#[test]
fn pages_classify_in_parallel() {
    let rasters: Vec<_> = (0..8u32)
        .map(|i| {
            let canvas = Canvas::white(200, 200);
            let canvas = if i % 2 == 0 {
                canvas.fill(0, 0, 100, 100, BLACK)
            } else {
                canvas
            };
            canvas.raster(Rotation::Deg0, 1.5)
        })
        .collect();
    let probe = ProbeRegion::new(10, 10, 50, 50);

    let statuses: Vec<_> = rasters
        .par_iter()
        .map(|raster| classify_region(raster, probe))
        .collect();

    for (i, status) in statuses.iter().enumerate() {
        let expected = if i % 2 == 0 {
            PlacementStatus::Occupied
        } else {
            PlacementStatus::Blank
        };
        assert_eq!(*status, expected, "page {i}");
    }
}
