pub mod anchors;
pub mod classify;
pub mod compositor;
pub mod config;
mod error;
pub mod fonts;
pub mod job;
pub mod model;
pub mod pdf;
pub mod placement;
pub mod transform;

pub use anchors::{AnchorPosition, FallbackPriority};
pub use compositor::OverlayCompositor;
pub use config::OverlaySettings;
pub use error::Error;
pub use job::{DocumentInfo, PageOverrides, PagePlan, compose_job, job_texts, plan_page};
pub use model::{
    LogoPlacement, PageGeometry, PageOverlay, PageRaster, PdfRect, PlacementResult,
    PlacementStatus, RasterRect, Rotation, SourceImage,
};
pub use placement::select_placement;
