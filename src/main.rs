use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use pagemark_pdf::compositor::logo::source_dimensions;
use pagemark_pdf::config::{DEFAULT_RENDER_SCALE, UNICODE_FONT_ENV};
use pagemark_pdf::fonts::{FontResolver, FontSource, TtfSubsetter};
use pagemark_pdf::{
    AnchorPosition, DocumentInfo, Error, FallbackPriority, LogoPlacement, OverlayCompositor,
    OverlaySettings, PageGeometry, PageOverrides, PageRaster, Rotation, SourceImage, compose_job,
    job_texts, plan_page,
};

/// Place a logo, watermark and header/footer on rendered PDF pages without covering content.
#[derive(Parser)]
#[command(name = "pagemark-pdf", about, version)]
struct Cli {
    /// Rendered pages (PNG), one per page, in displayed orientation
    #[arg(value_name = "PAGE", required = true)]
    pages: Vec<PathBuf>,

    /// Page rotation as stored in /Rotate (0, 90, 180, 270)
    #[arg(long, default_value_t = 0)]
    rotation: i32,

    /// Pixels per point used when the pages were rendered
    #[arg(long, default_value_t = DEFAULT_RENDER_SCALE)]
    scale: f32,

    /// Unrotated page width in points. Derived from the raster when omitted
    #[arg(long, requires = "height_pt")]
    width_pt: Option<f32>,

    /// Unrotated page height in points
    #[arg(long, requires = "width_pt")]
    height_pt: Option<f32>,

    /// Logo image (PNG, JPEG or SVG)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Preferred anchor, e.g. right-bottom
    #[arg(long, conflicts_with = "auto_anchor")]
    anchor: Option<AnchorPosition>,

    /// Search the four corners instead of using a preferred anchor
    #[arg(long)]
    auto_anchor: bool,

    /// Enable fallback with this comma-separated order of all nine anchors
    #[arg(long)]
    fallback: Option<FallbackPriority>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Value of {title}
    #[arg(long, default_value = "")]
    title: String,

    /// Value of {date}; today when omitted
    #[arg(long)]
    date: Option<String>,

    /// TTF/OTF for text outside WinAnsi (default: $PAGEMARK_UNICODE_FONT)
    #[arg(long)]
    unicode_font: Option<PathBuf>,

    /// Write the overlay PDF here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_settings(path: Option<&Path>) -> Result<OverlaySettings, Error> {
    let Some(path) = path else {
        return Ok(OverlaySettings::default());
    };
    let text = std::fs::read_to_string(path)?;
    let settings: OverlaySettings =
        serde_json::from_str(&text).map_err(|e| Error::Settings(format!("{}: {e}", path.display())))?;
    Ok(settings.sanitized())
}

fn load_raster(path: &Path, rotation: Rotation, scale: f32) -> Result<PageRaster, Error> {
    let img = image::open(path)
        .map_err(|e| Error::ImageDecode(format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    PageRaster::new(w, h, img.into_raw(), rotation, scale)
}

fn geometry_for(cli: &Cli, raster: &PageRaster) -> PageGeometry {
    let rotation = raster.rotation();
    let (width_pt, height_pt) = match (cli.width_pt, cli.height_pt) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            let display_w = raster.width() as f32 / cli.scale;
            let display_h = raster.height() as f32 / cli.scale;
            if rotation.is_sideways() {
                (display_h, display_w)
            } else {
                (display_w, display_h)
            }
        }
    };
    PageGeometry::new(width_pt, height_pt, rotation, cli.scale)
}

fn run(cli: &Cli) -> Result<(), Error> {
    let rotation = Rotation::from_degrees(cli.rotation)?;
    let mut settings = load_settings(cli.settings.as_deref())?;
    if cli.auto_anchor {
        settings.logo.preferred_anchor = None;
    } else if let Some(anchor) = cli.anchor {
        settings.logo.preferred_anchor = Some(anchor);
    }
    if let Some(priority) = &cli.fallback {
        settings.logo.auto_fallback = true;
        settings.logo.fallback_priority = Some(priority.clone());
    }

    let logo = match &cli.logo {
        Some(path) => Some(Arc::new(SourceImage {
            data: std::fs::read(path)?,
        })),
        None => None,
    };
    let logo_pixels = match &logo {
        Some(source) => source_dimensions(source).unwrap_or_else(|e| {
            log::warn!("Cannot read logo size: {e}");
            (1, 1)
        }),
        None => (1, 1),
    };

    let mut plans = Vec::with_capacity(cli.pages.len());
    for (i, path) in cli.pages.iter().enumerate() {
        let raster = load_raster(path, rotation, cli.scale)?;
        let geometry = geometry_for(cli, &raster);
        let plan = plan_page(
            &raster,
            &geometry,
            logo_pixels,
            &settings.logo,
            &PageOverrides::default(),
        );
        match plan.logo {
            LogoPlacement::Detected(result) => println!(
                "page {}: {} {} x={} y={} w={} h={}",
                i + 1,
                result.anchor,
                result.status,
                result.rect.x(),
                result.rect.y(),
                result.rect.width(),
                result.rect.height(),
            ),
            LogoPlacement::Manual(rect) => {
                println!("page {}: manual x={} y={}", i + 1, rect.x(), rect.y())
            }
            LogoPlacement::Skip => println!("page {}: skipped", i + 1),
        }
        plans.push(plan);
    }

    let Some(output) = &cli.output else {
        return Ok(());
    };

    let doc = DocumentInfo {
        title: cli.title.clone(),
        date: cli
            .date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
    };
    let font_path = cli
        .unicode_font
        .clone()
        .or_else(|| std::env::var_os(UNICODE_FONT_ENV).map(PathBuf::from));
    let font_source = match font_path {
        Some(path) => Some(FontSource::open(&path)?),
        None => None,
    };
    let subsetter = TtfSubsetter;
    let fonts = FontResolver::new(font_source.as_ref(), &subsetter).resolve(&job_texts(&settings, &doc));

    let mut compositor = OverlayCompositor::new();
    let overlays = compose_job(&mut compositor, &settings, logo.as_ref(), &plans, &doc, &fonts);
    for overlay in &overlays {
        for failure in &overlay.failures {
            eprintln!(
                "page {}: {:?} not drawn: {}",
                overlay.page_index + 1,
                failure.entity,
                failure.error
            );
        }
    }

    let bytes = pagemark_pdf::pdf::render_overlay(&overlays, &fonts);
    std::fs::write(output, &bytes)?;
    println!("wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
