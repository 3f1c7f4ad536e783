//! Printer calibration page.
//!
//! A blank canvas-sized page with a black border. Printed at the configured
//! resolution, the border should land fully on paper and measure exactly the
//! canvas size; otherwise the dpi or canvas settings need adjusting.

use image::{GrayImage, Luma};
use tracing::debug;

use crate::boundary::draw_frame;
use crate::settings::PrintSettings;
use crate::{INK, PAPER, Result};

/// Default border thickness of the calibration rectangle.
pub const CALIBRATION_BORDER: u32 = 4;

/// Full-canvas rectangle for checking printer dpi and margins.
pub fn calibration_page(settings: &PrintSettings, border: u32) -> Result<GrayImage> {
    settings.validate()?;
    let page = settings.page_pixels();
    debug!(width = page.width, height = page.height, border, "Drawing calibration page");

    let mut img = GrayImage::from_pixel(page.width, page.height, Luma([PAPER]));
    draw_frame(&mut img, border, Luma([INK]));
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration_page() {
        let img = calibration_page(&PrintSettings::default(), CALIBRATION_BORDER).unwrap();
        assert_eq!(img.dimensions(), (1012, 775));

        assert_eq!(img.get_pixel(0, 0).0[0], INK);
        assert_eq!(img.get_pixel(3, 400).0[0], INK);
        assert_eq!(img.get_pixel(4, 400).0[0], PAPER);
        assert_eq!(img.get_pixel(1008, 400).0[0], INK);
        assert_eq!(img.get_pixel(1007, 400).0[0], PAPER);
        assert_eq!(img.get_pixel(500, 771).0[0], INK);
        assert_eq!(img.get_pixel(500, 387).0[0], PAPER);
    }

    #[test]
    fn test_calibration_follows_settings() {
        let settings = PrintSettings::new().with_dpi(50).with_canvas(2.0, 3.0);
        let img = calibration_page(&settings, 1).unwrap();
        assert_eq!(img.dimensions(), (150, 100));
    }

    #[test]
    fn test_calibration_rejects_invalid_settings() {
        assert!(calibration_page(&PrintSettings::new().with_dpi(0), 4).is_err());
    }
}
