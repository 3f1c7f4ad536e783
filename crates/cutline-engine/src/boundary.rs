//! Cut-line extraction from binary color masks.
//!
//! Foreground pixels are grouped into connected regions, and every pixel
//! with a neighbour of a different label (background included) is inked.
//! Both sides of a region edge are marked, so each region is enclosed by a
//! closed line. A frame is always drawn along the image border as a cutting
//! fiducial. No minimum region size is applied.

use image::{GrayImage, ImageBuffer, Luma, Pixel};
use imageproc::region_labelling::connected_components;
use tracing::debug;

pub use imageproc::region_labelling::Connectivity;

use crate::segment::{MASK_OFF, MASK_ON};
use crate::settings::DEFAULT_FRAME_THICKNESS;
use crate::{INK, PAPER};

/// Connected-component labels; 0 is background.
pub type LabelMap = ImageBuffer<Luma<u32>, Vec<u32>>;

const FOUR_NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const EIGHT_NEIGHBORS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Options for cut-line extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryOptions {
    /// Connectivity used to group foreground pixels into regions.
    pub labeling: Connectivity,
    /// Neighbourhood checked when deciding whether a pixel is on an edge.
    pub neighborhood: Connectivity,
    /// Frame fiducial thickness in pixels.
    pub frame_thickness: u32,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            labeling: Connectivity::Eight,
            neighborhood: Connectivity::Four,
            frame_thickness: DEFAULT_FRAME_THICKNESS,
        }
    }
}

impl BoundaryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set region labeling connectivity.
    pub fn with_labeling(mut self, conn: Connectivity) -> Self {
        self.labeling = conn;
        self
    }

    /// Builder: set edge neighbourhood.
    pub fn with_neighborhood(mut self, conn: Connectivity) -> Self {
        self.neighborhood = conn;
        self
    }

    /// Builder: set frame thickness.
    pub fn with_frame_thickness(mut self, px: u32) -> Self {
        self.frame_thickness = px;
        self
    }
}

/// What a color's print sheet shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetMode {
    /// Region outlines only.
    #[default]
    CutLines,
    /// The filled mask.
    Foreground,
}

/// Render the print sheet for one color mask.
pub fn sheet_for_mask(mask: &GrayImage, mode: SheetMode, opts: &BoundaryOptions) -> GrayImage {
    match mode {
        SheetMode::CutLines => cut_line_image(mask, opts),
        SheetMode::Foreground => foreground_sheet(mask, opts.frame_thickness),
    }
}

/// Label connected foreground regions of a binary mask.
pub fn label_regions(mask: &GrayImage, conn: Connectivity) -> LabelMap {
    connected_components(mask, conn, Luma([MASK_OFF]))
}

/// Number of labeled regions.
pub fn region_count(labels: &LabelMap) -> u32 {
    labels.pixels().map(|p| p.0[0]).max().unwrap_or(0)
}

/// Whether the pixel at `(x, y)` touches a differently labeled neighbour.
///
/// Neighbours outside the image count as background, so regions touching
/// the border are closed even without a frame.
pub fn is_boundary(labels: &LabelMap, x: u32, y: u32, neighborhood: Connectivity) -> bool {
    let (width, height) = labels.dimensions();
    let here = labels.get_pixel(x, y).0[0];
    let offsets: &[(i64, i64)] = match neighborhood {
        Connectivity::Four => &FOUR_NEIGHBORS,
        Connectivity::Eight => &EIGHT_NEIGHBORS,
    };

    offsets.iter().any(|&(dx, dy)| {
        let nx = i64::from(x) + dx;
        let ny = i64::from(y) + dy;
        let inside = nx >= 0 && ny >= 0 && nx < i64::from(width) && ny < i64::from(height);
        let there = if inside {
            labels.get_pixel(nx as u32, ny as u32).0[0]
        } else {
            0
        };
        there != here
    })
}

/// Cut-line image for a binary mask: ink on region edges and on the frame,
/// paper everywhere else.
pub fn cut_line_image(mask: &GrayImage, opts: &BoundaryOptions) -> GrayImage {
    let labels = label_regions(mask, opts.labeling);
    let (width, height) = labels.dimensions();
    debug!(width, height, regions = region_count(&labels), "Extracting cut lines");

    let mut cut = GrayImage::from_fn(width, height, |x, y| {
        if is_boundary(&labels, x, y, opts.neighborhood) {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    });
    draw_frame(&mut cut, opts.frame_thickness, Luma([INK]));
    cut
}

/// Filled sheet for a binary mask: ink over the foreground, plus the frame.
pub fn foreground_sheet(mask: &GrayImage, frame_thickness: u32) -> GrayImage {
    let mut sheet = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] == MASK_ON {
            Luma([INK])
        } else {
            Luma([PAPER])
        }
    });
    draw_frame(&mut sheet, frame_thickness, Luma([INK]));
    sheet
}

/// Paint a `thickness`-pixel band along all four edges of an image.
pub fn draw_frame<P: Pixel>(img: &mut ImageBuffer<P, Vec<P::Subpixel>>, thickness: u32, value: P) {
    if thickness == 0 {
        return;
    }
    let (width, height) = img.dimensions();
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let on_frame = x < thickness
            || y < thickness
            || x >= width.saturating_sub(thickness)
            || y >= height.saturating_sub(thickness);
        if on_frame {
            *pixel = value;
        }
    }
}
