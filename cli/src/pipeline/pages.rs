//! Segmentation image to printable, DPI-tagged cut sheets.

use std::path::{Path, PathBuf};

use cutline_engine::{
    EngineError, color_mask, ensure_dir, load_rgb, rescale_to_length, save_gray_png_with_dpi,
    segment_rgb, sheet_for_mask, tile_file_name, tile_sheet,
};
use image::imageops::FilterType;
use tracing::{debug, info};

use super::PaletteSetup;
use crate::config::AppConfig;
use crate::error::PipelineError;

/// Pages written for one segmentation image.
#[derive(Debug, Default)]
pub struct PagesReport {
    pub rows: u32,
    pub cols: u32,
    /// Every page file, grouped by color in palette order.
    pub pages: Vec<PathBuf>,
}

/// Turn a segmentation image into per-color page tiles in the pages directory.
///
/// The image is resized to the target physical length with nearest-neighbour
/// sampling and snapped back onto the palette, so hand-edited segmentations
/// with stray colors still map to exactly one paper per pixel.
pub fn write_print_pages(input: &Path, config: &AppConfig) -> Result<PagesReport, PipelineError> {
    config.validate()?;
    let setup = PaletteSetup::load(&config.palette_path)?;
    for color in &setup.palette {
        check_color_name(&color.name)?;
    }

    let engine_err = |e: EngineError| PipelineError::from_engine(e, input);
    ensure_dir(&config.pages_dir).map_err(engine_err)?;

    let settings = config.print_settings();
    let boundary = config.boundary_options();

    let seg_image = load_rgb(input).map_err(engine_err)?;
    let scaled = rescale_to_length(&seg_image, &settings, FilterType::Nearest).map_err(engine_err)?;
    let seg = segment_rgb(&scaled, &setup.table, &setup.palette).map_err(engine_err)?;

    let mut report = PagesReport::default();
    for (index, color) in setup.palette.iter().enumerate() {
        let mask = color_mask(&seg.image, &setup.table, &setup.palette, index, config.mask_rule)
            .map_err(engine_err)?;
        let sheet = sheet_for_mask(&mask, config.sheet_mode, &boundary);
        let grid = tile_sheet(&sheet, &settings).map_err(engine_err)?;
        debug!(color = %color.name, rows = grid.rows(), cols = grid.cols(), "Cut sheet tiled");

        for (row, col, tile) in grid.iter() {
            let dest = config.pages_dir.join(tile_file_name(&color.name, row, col));
            save_gray_png_with_dpi(tile, &dest, settings.dpi).map_err(engine_err)?;
            report.pages.push(dest);
        }
        report.rows = grid.rows();
        report.cols = grid.cols();
    }

    info!(
        input = %input.display(),
        pages = report.pages.len(),
        rows = report.rows,
        cols = report.cols,
        "Print pages written"
    );
    Ok(report)
}

/// Characters no common file system accepts in a file name.
const FORBIDDEN_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Color names become file names.
fn check_color_name(name: &str) -> Result<(), PipelineError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(FORBIDDEN_NAME_CHARS)
        || name.chars().any(char::is_control);
    if bad {
        return Err(PipelineError::Configuration(format!(
            "color name {name:?} cannot be used in a file name"
        )));
    }
    Ok(())
}
