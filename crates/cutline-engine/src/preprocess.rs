//! Photo preprocessing: rescale, grayscale and smoothing.
//!
//! Blurring suppresses fine photographic texture that would otherwise break
//! the segmentation into many tiny regions. Sigma is the main shape
//! simplification control.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Pixel, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use crate::settings::PreprocessOptions;
use crate::{EngineError, Result};

/// Intermediate images of the preprocessing stage.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Input at working resolution.
    pub rescaled: RgbImage,
    /// Channel mean of `rescaled`.
    pub gray: GrayImage,
    /// Smoothed `gray`, the input to segmentation.
    pub blurred: GrayImage,
}

/// Take the first three channels of a decoded image.
///
/// Alpha is dropped. Images with fewer than three channels are rejected.
pub fn to_rgb(img: &DynamicImage) -> Result<RgbImage> {
    let channels = img.color().channel_count();
    if channels < 3 {
        return Err(EngineError::UnsupportedInput(format!(
            "{channels}-channel image, need at least 3"
        )));
    }
    Ok(img.to_rgb8())
}

/// Decode an image file and take its first three channels.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| EngineError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), width = img.width(), height = img.height(), "Decoded image");
    to_rgb(&img)
}

/// Dimensions after scaling so that the longer side equals `long_edge`.
pub fn scaled_dimensions(width: u32, height: u32, long_edge: u32) -> (u32, u32) {
    let scale = f64::from(long_edge) / f64::from(width.max(height).max(1));
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Uniformly rescale an image so its longer side equals `long_edge`.
///
/// Returns a copy when the image already has that size.
pub fn rescale_long_edge<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    long_edge: u32,
    filter: FilterType,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (orig_w, orig_h) = img.dimensions();
    let (new_w, new_h) = scaled_dimensions(orig_w, orig_h, long_edge);

    if (new_w, new_h) == (orig_w, orig_h) {
        debug!(long_edge, "Image already at target size, skipping resize");
        return img.clone();
    }

    debug!(orig_w, orig_h, new_w, new_h, ?filter, "Rescaling image");
    imageops::resize(img, new_w, new_h, filter)
}

/// Grayscale as the unweighted channel mean, rounded to nearest.
pub fn mean_gray(img: &RgbImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        let sum = u32::from(r) + u32::from(g) + u32::from(b);
        Luma([round_to_u8(f64::from(sum) / 3.0)])
    })
}

/// Isotropic Gaussian smoothing with standard deviation `sigma`.
///
/// Filtering happens in floating point; the result is rounded to nearest
/// and clamped to the 8-bit range.
pub fn smooth(gray: &GrayImage, sigma: f32) -> Result<GrayImage> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(EngineError::InvalidOption {
            name: "sigma",
            reason: format!("must be a positive number, got {sigma}"),
        });
    }

    let (width, height) = gray.dimensions();
    debug!(width, height, sigma, "Applying Gaussian blur");

    let src: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([f32::from(gray.get_pixel(x, y).0[0])]));
    let blurred = gaussian_blur_f32(&src, sigma);

    Ok(GrayImage::from_fn(width, height, |x, y| {
        Luma([round_to_u8(f64::from(blurred.get_pixel(x, y).0[0]))])
    }))
}

/// Run the full preprocessing stage on an RGB photo.
pub fn preprocess(img: &RgbImage, opts: &PreprocessOptions) -> Result<Preprocessed> {
    opts.validate()?;
    if img.width() == 0 || img.height() == 0 {
        return Err(EngineError::UnsupportedInput("image is empty".into()));
    }

    let rescaled = rescale_long_edge(img, opts.long_edge, FilterType::Triangle);
    let gray = mean_gray(&rescaled);
    let blurred = smooth(&gray, opts.sigma)?;

    debug!(
        width = blurred.width(),
        height = blurred.height(),
        "Preprocessing complete"
    );
    Ok(Preprocessed {
        rescaled,
        gray,
        blurred,
    })
}

fn round_to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
