//! Fixed engine constants and the user-facing overlay settings.
//!
//! `sanitized()` clamps every settings field into its supported range.

use crate::anchors::{AnchorPosition, FallbackPriority};
use crate::fonts::StandardFont;

/// Pixels per point when rasterizing pages for analysis.
pub const DEFAULT_RENDER_SCALE: f32 = 1.5;
/// Clearance around the logo footprint, in raster pixels.
pub const PROBE_MARGIN_PX: f32 = 15.0;
/// A channel above this is "white".
pub const WHITE_CHANNEL_MIN: u8 = 240;
/// A channel above this is at least "light".
pub const LIGHT_CHANNEL_MIN: u8 = 220;
/// White fraction a probe must exceed to be blank.
pub const BLANK_RATIO: f64 = 0.95;
/// White-or-light fraction a probe must exceed to be light.
pub const LIGHT_RATIO: f64 = 0.85;
/// Upper bound on tiled watermark copies per page.
pub const TILE_POINT_CAP: usize = 200;
pub const LOGO_SIZE_MIN: f32 = 40.0;
pub const LOGO_SIZE_MAX: f32 = 200.0;
/// Inset of corner-positioned watermark text from the page edges, in points.
pub const WATERMARK_EDGE_INSET: f32 = 40.0;

/// Env var naming a TTF/OTF used for text outside WinAnsi.
pub const UNICODE_FONT_ENV: &str = "PAGEMARK_UNICODE_FONT";

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogoSettings {
    /// Longer side of the logo in points.
    pub size: f32,
    pub opacity: u8,
    /// `None` runs the automatic corner search.
    pub preferred_anchor: Option<AnchorPosition>,
    pub auto_fallback: bool,
    /// Order tried when `auto_fallback` is set; catalog order when absent.
    pub fallback_priority: Option<FallbackPriority>,
    /// Size the logo from the page width instead of `size`.
    pub auto_size: bool,
    pub auto_size_percent: f32,
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            size: 80.0,
            opacity: 100,
            preferred_anchor: Some(AnchorPosition::RightBottom),
            auto_fallback: false,
            fallback_priority: None,
            auto_size: false,
            auto_size_percent: 8.0,
        }
    }
}

impl LogoSettings {
    pub fn sanitized(mut self) -> Self {
        self.size = self.size.clamp(LOGO_SIZE_MIN, LOGO_SIZE_MAX);
        self.opacity = self.opacity.clamp(10, 100);
        self.auto_size_percent = self.auto_size_percent.clamp(3.0, 15.0);
        self
    }

    /// The ladder in force, or `None` when fallback is off.
    pub fn effective_fallback(&self) -> Option<FallbackPriority> {
        if !self.auto_fallback {
            return None;
        }
        Some(self.fallback_priority.clone().unwrap_or_default())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum WatermarkPosition {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Tile,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileSettings {
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    pub offset_alternate_rows: bool,
}

impl Default for TileSettings {
    fn default() -> Self {
        Self {
            horizontal_spacing: 150.0,
            vertical_spacing: 100.0,
            offset_alternate_rows: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatermarkSettings {
    pub enabled: bool,
    pub text: String,
    pub font: StandardFont,
    pub font_size: f32,
    pub color: [u8; 3],
    pub opacity: u8,
    /// Counter-clockwise, as seen by the viewer.
    pub rotation: f32,
    pub position: WatermarkPosition,
    pub tile: TileSettings,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            text: "CONFIDENTIAL".to_string(),
            font: StandardFont::Helvetica,
            font_size: 48.0,
            color: [0x88, 0x88, 0x88],
            opacity: 30,
            rotation: 45.0,
            position: WatermarkPosition::Center,
            tile: TileSettings::default(),
        }
    }
}

impl WatermarkSettings {
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.clamp(12.0, 72.0);
        self.opacity = self.opacity.clamp(10, 100);
        self.rotation = self.rotation.clamp(-90.0, 90.0);
        self.tile.horizontal_spacing = self.tile.horizontal_spacing.clamp(80.0, 300.0);
        self.tile.vertical_spacing = self.tile.vertical_spacing.clamp(60.0, 200.0);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextBlock {
    pub enabled: bool,
    /// May contain `{page}`, `{total}`, `{date}`, `{title}`.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeaderFooterRow {
    pub enabled: bool,
    pub left: TextBlock,
    pub center: TextBlock,
    pub right: TextBlock,
    pub font: StandardFont,
    pub font_size: f32,
    pub color: [u8; 3],
    /// Distance from the visual top (header) or bottom (footer) edge, in points.
    pub margin: f32,
}

impl Default for HeaderFooterRow {
    fn default() -> Self {
        Self {
            enabled: false,
            left: TextBlock::default(),
            center: TextBlock {
                enabled: true,
                text: "{page} / {total}".to_string(),
            },
            right: TextBlock::default(),
            font: StandardFont::Helvetica,
            font_size: 10.0,
            color: [0x33, 0x33, 0x33],
            margin: 30.0,
        }
    }
}

impl HeaderFooterRow {
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.clamp(8.0, 24.0);
        self.margin = self.margin.clamp(20.0, 80.0);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeaderFooterSettings {
    pub header: HeaderFooterRow,
    pub footer: HeaderFooterRow,
}

impl HeaderFooterSettings {
    pub fn sanitized(self) -> Self {
        Self {
            header: self.header.sanitized(),
            footer: self.footer.sanitized(),
        }
    }
}

/// Everything that styles a job, as loaded from a settings file.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlaySettings {
    pub logo: LogoSettings,
    pub watermark: WatermarkSettings,
    pub header_footer: HeaderFooterSettings,
}

impl OverlaySettings {
    pub fn sanitized(self) -> Self {
        Self {
            logo: self.logo.sanitized(),
            watermark: self.watermark.sanitized(),
            header_footer: self.header_footer.sanitized(),
        }
    }
}
