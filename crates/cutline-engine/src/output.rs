//! Writing sheets and intermediate images to disk.
//!
//! Print pages are encoded directly with `png` so the print resolution lands
//! in the `pHYs` chunk; other artifacts go through the `image` encoders.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{EncodableLayout, GrayImage, ImageBuffer, Pixel, PixelWithColorType};
use tracing::debug;

use crate::{EngineError, Result};

const METERS_PER_INCH: f64 = 0.0254;

/// Print resolution expressed in PNG units (pixels per meter).
pub fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (f64::from(dpi) / METERS_PER_INCH).round() as u32
}

/// File name of one cut-sheet page tile; `row` and `col` are zero-based.
pub fn tile_file_name(color: &str, row: u32, col: u32) -> String {
    format!("{color}_cuts_row{}_col{}.png", row + 1, col + 1)
}

/// Create a directory and its parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| EngineError::Io {
        path: dir.display().to_string(),
        source,
    })
}

/// Write an 8-bit grayscale PNG tagged with the given print resolution.
pub fn save_gray_png_with_dpi(img: &GrayImage, path: &Path, dpi: u32) -> Result<()> {
    let file = File::create(path).map_err(|source| EngineError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), img.width(), img.height());
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = dpi_to_pixels_per_meter(dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let encode_err = |source: png::EncodingError| EngineError::PngEncode {
        path: path.display().to_string(),
        source,
    };
    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer.write_image_data(img.as_raw()).map_err(encode_err)?;
    writer.finish().map_err(encode_err)?;

    debug!(path = %path.display(), dpi, "Saved page");
    Ok(())
}

/// Write an image, choosing the format from the file extension.
pub fn save_image<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>, path: &Path) -> Result<()>
where
    P: Pixel + PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
{
    img.save(path).map_err(|source| EngineError::Save {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), "Saved image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_tile_file_name_is_one_based() {
        assert_eq!(tile_file_name("red", 0, 0), "red_cuts_row1_col1.png");
        assert_eq!(tile_file_name("dark-blue", 1, 2), "dark-blue_cuts_row2_col3.png");
    }

    #[test]
    fn test_dpi_to_pixels_per_meter() {
        assert_eq!(dpi_to_pixels_per_meter(100), 3937);
        assert_eq!(dpi_to_pixels_per_meter(300), 11811);
    }

    #[test]
    fn test_png_carries_dpi_and_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let img = GrayImage::from_fn(6, 4, |x, y| Luma([(x * 40 + y) as u8]));

        save_gray_png_with_dpi(&img, &path, 100).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!((dims.xppu, dims.yppu), (3937, 3937));

        let back = image::open(&path).unwrap().to_luma8();
        assert_eq!(back, img);
    }

    #[test]
    fn test_save_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page.png");
        let img = GrayImage::new(2, 2);
        let err = save_gray_png_with_dpi(&img, &path, 100).unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
        assert!(err.to_string().contains("page.png"));
    }

    #[test]
    fn test_save_image_roundtrips_rgb_png() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();

        let path = nested.join("seg.png");
        let img = RgbImage::from_pixel(3, 3, Rgb([1, 128, 250]));
        save_image(&img, &path).unwrap();
        assert_eq!(image::open(&path).unwrap().to_rgb8(), img);
    }
}
