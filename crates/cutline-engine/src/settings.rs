//! Print and preprocessing options.
//!
//! These values are threaded explicitly through every stage; nothing in the
//! engine reads global state.

use crate::tiler::PagePixels;
use crate::{EngineError, Result};

/// Default print resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 100;

/// Default printable area of a page (page minus margins), slightly
/// underestimated so no printer clips it.
pub const DEFAULT_CANVAS: CanvasSize = CanvasSize {
    height_in: 7.75,
    width_in: 10.125,
};

/// Default physical length of the long edge of the finished piece.
pub const DEFAULT_TARGET_LENGTH_IN: f64 = 12.0;

/// Default thickness of the frame fiducial around each cut sheet.
pub const DEFAULT_FRAME_THICKNESS: u32 = 2;

/// Default thickness of the registration border on each page tile.
pub const DEFAULT_TILE_BORDER: u32 = 2;

/// Default long edge of the working image used for segmentation.
pub const DEFAULT_WORK_SIZE: u32 = 800;

/// Default Gaussian blur sigma.
pub const DEFAULT_SIGMA: f32 = 2.0;

/// Printable canvas size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub height_in: f64,
    pub width_in: f64,
}

/// Physical output settings shared by the tiler, boundary extractor and
/// calibration page.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSettings {
    /// Print resolution in dots per inch.
    pub dpi: u32,

    /// Printable area per page.
    pub canvas: CanvasSize,

    /// Physical length of the long edge of the finished piece, in inches.
    pub target_length_in: f64,

    /// Frame fiducial thickness in pixels, drawn around each cut sheet.
    pub frame_thickness: u32,

    /// Registration border thickness in pixels, drawn around each tile.
    pub tile_border: u32,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            canvas: DEFAULT_CANVAS,
            target_length_in: DEFAULT_TARGET_LENGTH_IN,
            frame_thickness: DEFAULT_FRAME_THICKNESS,
            tile_border: DEFAULT_TILE_BORDER,
        }
    }
}

impl PrintSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set print resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Builder: set printable canvas size.
    pub fn with_canvas(mut self, height_in: f64, width_in: f64) -> Self {
        self.canvas = CanvasSize {
            height_in,
            width_in,
        };
        self
    }

    /// Builder: set target physical length.
    pub fn with_target_length(mut self, inches: f64) -> Self {
        self.target_length_in = inches;
        self
    }

    /// Builder: set frame fiducial thickness.
    pub fn with_frame_thickness(mut self, px: u32) -> Self {
        self.frame_thickness = px;
        self
    }

    /// Builder: set tile border thickness.
    pub fn with_tile_border(mut self, px: u32) -> Self {
        self.tile_border = px;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(invalid("dpi", "must be positive"));
        }
        positive("canvas height", self.canvas.height_in)?;
        positive("canvas width", self.canvas.width_in)?;
        positive("target length", self.target_length_in)?;

        let page = self.page_pixels();
        if page.width == 0 || page.height == 0 {
            return Err(invalid("canvas", "rounds to an empty page at this dpi"));
        }
        if self.target_long_edge_px() == 0 {
            return Err(invalid("target length", "rounds to zero pixels at this dpi"));
        }
        Ok(())
    }

    /// Printable canvas in pixels, rounded half to even.
    pub fn page_pixels(&self) -> PagePixels {
        let dpi = f64::from(self.dpi);
        PagePixels {
            width: to_px(self.canvas.width_in * dpi),
            height: to_px(self.canvas.height_in * dpi),
        }
    }

    /// Long edge of the finished piece in pixels.
    pub fn target_long_edge_px(&self) -> u32 {
        to_px(self.target_length_in * f64::from(self.dpi))
    }
}

/// Working resolution and smoothing for segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessOptions {
    /// Long edge of the working image in pixels.
    pub long_edge: u32,

    /// Gaussian blur standard deviation. Larger values give simpler shapes.
    pub sigma: f32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            long_edge: DEFAULT_WORK_SIZE,
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl PreprocessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set working long edge.
    pub fn with_long_edge(mut self, px: u32) -> Self {
        self.long_edge = px;
        self
    }

    /// Builder: set blur sigma.
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.long_edge == 0 {
            return Err(invalid("long edge", "must be positive"));
        }
        positive("sigma", f64::from(self.sigma))
    }
}

fn to_px(value: f64) -> u32 {
    value.round_ties_even().max(0.0) as u32
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be a positive number, got {value}")))
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidOption {
        name,
        reason: reason.into(),
    }
}
