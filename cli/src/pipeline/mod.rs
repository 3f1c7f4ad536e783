//! Command pipelines: photo segmentation, print pages and calibration.

pub mod calibrate;
pub mod pages;
pub mod segment;

pub use calibrate::write_calibration_page;
pub use pages::{PagesReport, write_print_pages};
pub use segment::{BatchReport, run_segment_batch, segment_photo};

use std::path::Path;

use paper_palette::{Palette, ThresholdTable};
use tracing::info;

use crate::error::PipelineError;

/// Palette and thresholds shared by every input of a run.
#[derive(Debug, Clone)]
pub struct PaletteSetup {
    pub palette: Palette,
    pub table: ThresholdTable,
}

impl PaletteSetup {
    /// Load a palette file and derive its threshold table.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let palette = Palette::load(path)?;
        let table = ThresholdTable::from_palette(&palette);
        table.verify()?;
        info!(path = %path.display(), colors = palette.len(), "Loaded palette");
        Ok(Self { palette, table })
    }
}

/// File stem of an input path, used to name its outputs.
pub(crate) fn file_stem(path: &Path) -> Result<String, PipelineError> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::Input {
            path: path.display().to_string(),
            reason: "path has no file name".into(),
        })
}
