//! Nearest-paper segmentation and per-color masks.

use image::{GrayImage, Luma, Rgb, RgbImage};
use paper_palette::{Palette, ThresholdTable};
use tracing::{debug, info};

use crate::preprocess::mean_gray;
use crate::{EngineError, Result};

/// Foreground value in binary masks.
pub const MASK_ON: u8 = 255;

/// Background value in binary masks.
pub const MASK_OFF: u8 = 0;

/// A photo quantized to palette colors.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Every pixel is exactly one palette RGB triple.
    pub image: RgbImage,
    /// Pixel count per palette color, in palette order.
    pub counts: Vec<u64>,
}

/// How a single color's mask is derived from a segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskRule {
    /// Pixels equal to the color.
    #[default]
    Exact,
    /// Pixels at least as bright as the color's lower threshold, i.e. this
    /// paper plus every lighter paper stacked on top of it.
    Layered,
}

/// Assign every pixel of a grayscale image the palette color whose interval
/// contains its value.
pub fn segment(gray: &GrayImage, table: &ThresholdTable, palette: &Palette) -> Result<Segmentation> {
    ensure_matching(table, palette)?;
    table.verify()?;
    let lut = table.index_lut()?;

    let (width, height) = gray.dimensions();
    debug!(width, height, colors = palette.len(), "Segmenting image");

    let colors = palette.colors();
    let mut counts = vec![0u64; colors.len()];
    let image = RgbImage::from_fn(width, height, |x, y| {
        let idx = lut[usize::from(gray.get_pixel(x, y).0[0])];
        counts[idx] += 1;
        Rgb(colors[idx].rgb)
    });

    log_counts(table, &counts);
    Ok(Segmentation { image, counts })
}

/// Snap an RGB image onto the palette, without smoothing.
///
/// Pixels that already equal a palette color keep it, even when two papers
/// are closer in luma than the 8-bit gray rounding. Any other pixel takes
/// the color whose interval contains its gray value.
pub fn segment_rgb(img: &RgbImage, table: &ThresholdTable, palette: &Palette) -> Result<Segmentation> {
    ensure_matching(table, palette)?;
    table.verify()?;
    let lut = table.index_lut()?;

    let (width, height) = img.dimensions();
    debug!(width, height, colors = palette.len(), "Snapping image onto palette");

    let gray = mean_gray(img);
    let colors = palette.colors();
    let mut counts = vec![0u64; colors.len()];
    let mut snapped = 0u64;
    let image = RgbImage::from_fn(width, height, |x, y| {
        let rgb = img.get_pixel(x, y).0;
        let idx = match colors.iter().position(|c| c.rgb == rgb) {
            Some(idx) => idx,
            None => {
                snapped += 1;
                lut[usize::from(gray.get_pixel(x, y).0[0])]
            }
        };
        counts[idx] += 1;
        Rgb(colors[idx].rgb)
    });

    if snapped > 0 {
        debug!(snapped, "Off-palette pixels reassigned");
    }
    log_counts(table, &counts);
    Ok(Segmentation { image, counts })
}

fn log_counts(table: &ThresholdTable, counts: &[u64]) {
    for ((name, interval), count) in table.iter().zip(counts) {
        info!(
            color = name,
            lo = interval.lo,
            hi = interval.hi,
            pixels = count,
            "Segmented color"
        );
    }
}

/// Binary mask (255 = foreground) for the palette color at `index`.
pub fn color_mask(
    image: &RgbImage,
    table: &ThresholdTable,
    palette: &Palette,
    index: usize,
    rule: MaskRule,
) -> Result<GrayImage> {
    ensure_matching(table, palette)?;
    let (Some(color), Some(interval)) = (palette.colors().get(index), table.intervals().get(index))
    else {
        return Err(EngineError::Invariant(format!(
            "color index {index} out of range for {} colors",
            palette.len()
        )));
    };

    let mask = match rule {
        MaskRule::Exact => GrayImage::from_fn(image.width(), image.height(), |x, y| {
            mask_value(image.get_pixel(x, y).0 == color.rgb)
        }),
        MaskRule::Layered => {
            let gray = mean_gray(image);
            GrayImage::from_fn(image.width(), image.height(), |x, y| {
                mask_value(f64::from(gray.get_pixel(x, y).0[0]) >= interval.lo)
            })
        }
    };
    Ok(mask)
}

fn mask_value(on: bool) -> Luma<u8> {
    Luma([if on { MASK_ON } else { MASK_OFF }])
}

fn ensure_matching(table: &ThresholdTable, palette: &Palette) -> Result<()> {
    let same = table.len() == palette.len()
        && table
            .names()
            .iter()
            .zip(palette.iter())
            .all(|(name, color)| *name == color.name);
    if same {
        Ok(())
    } else {
        Err(EngineError::Invariant(
            "threshold table does not match palette order".into(),
        ))
    }
}
