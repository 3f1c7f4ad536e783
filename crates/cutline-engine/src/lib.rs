//! Image processing for paper-cut templates.
//!
//! Turns a reference photo into palette regions (preprocess, segment), draws
//! the cut lines around each region (boundary) and splits the result across
//! printable pages with registration borders (tiler, output).

pub mod boundary;
pub mod calibration;
pub mod output;
pub mod preprocess;
pub mod segment;
pub mod settings;
pub mod tiler;

// Re-exports for convenience
pub use boundary::{
    BoundaryOptions, Connectivity, SheetMode, cut_line_image, foreground_sheet, label_regions,
    sheet_for_mask,
};
pub use calibration::calibration_page;
pub use output::{ensure_dir, save_gray_png_with_dpi, save_image, tile_file_name};
pub use preprocess::{
    Preprocessed, load_rgb, mean_gray, preprocess, rescale_long_edge, smooth, to_rgb,
};
pub use segment::{MaskRule, Segmentation, color_mask, segment, segment_rgb};
pub use settings::{CanvasSize, PreprocessOptions, PrintSettings};
pub use tiler::{PagePixels, TileGrid, rescale_to_length, tile_image, tile_sheet};

/// Cut-line ink value.
pub const INK: u8 = 0;

/// Blank paper value.
pub const PAPER: u8 = 255;

/// Errors that can occur while producing templates.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("Unsupported input image: {0}")]
    UnsupportedInput(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Palette(#[from] paper_palette::PaletteError),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save {path}: {source}")]
    Save {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG encode error for {path}: {source}")]
    PngEncode {
        path: String,
        #[source]
        source: png::EncodingError,
    },
}

impl EngineError {
    /// True for logic defects that no input change can fix.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            EngineError::Invariant(_) => true,
            EngineError::Palette(e) => e.is_invariant_violation(),
            _ => false,
        }
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
