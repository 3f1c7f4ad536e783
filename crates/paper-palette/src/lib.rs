//! Paper palette model and grayscale threshold derivation.
//!
//! A palette is the ordered set of physical paper colors available for a
//! template. Colors are kept sorted by luma, and [`ThresholdTable`] splits the
//! grayscale axis halfway between each pair of neighbouring papers.

pub mod palette;
pub mod thresholds;

// Re-exports for convenience
pub use palette::{Palette, PaperColor, luma};
pub use thresholds::{GrayInterval, ThresholdTable};

/// Upper end of the 8-bit grayscale range.
pub const MAX_GRAY: f64 = 255.0;

/// Errors that can occur while building a palette or its thresholds.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("Palette is empty")]
    Empty,

    #[error("Duplicate color name in palette: {0}")]
    DuplicateName(String),

    #[error("Color '{name}' has {count} channels, expected 3")]
    ChannelCount { name: String, count: usize },

    #[error("Color '{name}' has channel value {value} outside 0..=255")]
    ChannelOutOfRange { name: String, value: i64 },

    #[error("Invalid maximum gray value: {0}")]
    InvalidMaxGray(f64),

    #[error("Palette JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read palette {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Threshold table invariant violated: {0}")]
    ThresholdInvariant(String),
}

impl PaletteError {
    /// True for errors that indicate a logic defect rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, PaletteError::ThresholdInvariant(_))
    }
}

/// Result type alias for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;
