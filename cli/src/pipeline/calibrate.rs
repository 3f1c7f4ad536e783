//! Printer calibration page.

use std::path::{Path, PathBuf};

use cutline_engine::{EngineError, calibration_page, ensure_dir, save_gray_png_with_dpi};
use tracing::info;

use crate::config::AppConfig;
use crate::error::PipelineError;

/// Where the calibration page goes when no destination is given.
pub const DEFAULT_CALIBRATION_PATH: &str = "printer-calibration/full-page-rectangle.png";

/// Write a canvas-sized rectangle for checking printer dpi and margins.
pub fn write_calibration_page(dest: &Path, config: &AppConfig) -> Result<PathBuf, PipelineError> {
    config.validate()?;
    let settings = config.print_settings();
    let engine_err = |e: EngineError| PipelineError::from_engine(e, dest);

    let page = calibration_page(&settings, config.calibration_border_px).map_err(engine_err)?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).map_err(engine_err)?;
    }
    save_gray_png_with_dpi(&page, dest, settings.dpi).map_err(engine_err)?;

    info!(
        path = %dest.display(),
        width = page.width(),
        height = page.height(),
        "Calibration page written"
    );
    Ok(dest.to_path_buf())
}
