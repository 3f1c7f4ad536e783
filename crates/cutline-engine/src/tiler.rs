//! Page tiling for printing.
//!
//! A print-resolution image is split into a row-major grid of page-sized
//! tiles. Each source block gets a registration border so adjacent printed
//! pages can be lined up and taped together. Blocks at the right and bottom
//! edges are smaller than a page and are padded with background, anchored at
//! the top-left.

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma, Pixel};
use tracing::{debug, info};

use crate::boundary::draw_frame;
use crate::preprocess::rescale_long_edge;
use crate::settings::PrintSettings;
use crate::{EngineError, INK, PAPER, Result};

/// Printable canvas of one page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePixels {
    pub width: u32,
    pub height: u32,
}

/// Page-sized tiles in row-major order.
#[derive(Debug, Clone)]
pub struct TileGrid<P: Pixel> {
    rows: u32,
    cols: u32,
    page: PagePixels,
    tiles: Vec<ImageBuffer<P, Vec<P::Subpixel>>>,
}

impl<P: Pixel> TileGrid<P> {
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn page(&self) -> PagePixels {
        self.page
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile at zero-based `(row, col)`.
    pub fn get(&self, row: u32, col: u32) -> Option<&ImageBuffer<P, Vec<P::Subpixel>>> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get((row * self.cols + col) as usize)
    }

    /// `(row, col, tile)` triples, zero-based, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &ImageBuffer<P, Vec<P::Subpixel>>)> + '_ {
        let cols = self.cols;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i as u32 / cols, i as u32 % cols, tile))
    }
}

/// Number of page rows and columns needed to cover `width x height`.
pub fn grid_shape(width: u32, height: u32, page: PagePixels) -> (u32, u32) {
    (height.div_ceil(page.height), width.div_ceil(page.width))
}

/// Rescale so the long edge spans the target physical length at print
/// resolution.
pub fn rescale_to_length<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    settings: &PrintSettings,
    filter: FilterType,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    settings.validate()?;
    if img.width() == 0 || img.height() == 0 {
        return Err(EngineError::UnsupportedInput("image is empty".into()));
    }

    let scaled = rescale_long_edge(img, settings.target_long_edge_px(), filter);
    let dpi = f64::from(settings.dpi);
    info!(
        "Final size of piece: {:.1} tall X {:.1} inches wide",
        f64::from(scaled.height()) / dpi,
        f64::from(scaled.width()) / dpi
    );
    Ok(scaled)
}

/// Split an image into page-sized tiles.
///
/// `border` pixels of `ink` are drawn along the edges of every source block
/// before it is pasted onto a `background` page.
pub fn tile_image<P>(
    img: &ImageBuffer<P, Vec<P::Subpixel>>,
    page: PagePixels,
    border: u32,
    ink: P,
    background: P,
) -> Result<TileGrid<P>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    if page.width == 0 || page.height == 0 {
        return Err(EngineError::InvalidOption {
            name: "page size",
            reason: format!("{}x{} pixels", page.width, page.height),
        });
    }
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(EngineError::UnsupportedInput("image is empty".into()));
    }

    let (rows, cols) = grid_shape(width, height, page);
    debug!(width, height, rows, cols, "Tiling image");

    let mut tiles = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        let y0 = row * page.height;
        let block_h = page.height.min(height - y0);
        for col in 0..cols {
            let x0 = col * page.width;
            let block_w = page.width.min(width - x0);

            let mut block = imageops::crop_imm(img, x0, y0, block_w, block_h).to_image();
            if block.width() > page.width || block.height() > page.height {
                return Err(EngineError::Invariant(format!(
                    "tile block {}x{} exceeds page {}x{}",
                    block.width(),
                    block.height(),
                    page.width,
                    page.height
                )));
            }
            draw_frame(&mut block, border, ink);

            let mut tile = ImageBuffer::from_pixel(page.width, page.height, background);
            imageops::replace(&mut tile, &block, 0, 0);
            debug!(row, col, block_w, block_h, "Tile ready");
            tiles.push(tile);
        }
    }

    Ok(TileGrid {
        rows,
        cols,
        page,
        tiles,
    })
}

/// Tile a grayscale sheet using the page size and border from `settings`.
pub fn tile_sheet(sheet: &GrayImage, settings: &PrintSettings) -> Result<TileGrid<Luma<u8>>> {
    settings.validate()?;
    tile_image(
        sheet,
        settings.page_pixels(),
        settings.tile_border,
        Luma([INK]),
        Luma([PAPER]),
    )
}
