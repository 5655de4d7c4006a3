//! Grid rasterization: 25×40 cells at 15×19 pixels each.
//!
//! Glyph pixels come from the built-in font atlas, the G3 atlas or a
//! decoded DRCS raster, scaled into the cell with nearest-neighbour
//! sampling. Nothing here is cached; a render call re-derives everything
//! from current state.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::constants::{CELL_HEIGHT, CELL_WIDTH, GRID_COLS, GRID_ROWS};

use super::TxtError;
use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH, GlyphRaster};
use super::mot;
use super::service::TxtService;
use super::subpage::{Glyph, Grid, SubPage};

/// Default CLUT: the Level 1 colours, the transparent/half-intensity
/// block and the Level 2.5 defaults for CLUTs 2 and 3. Entry 8
/// (transparent) renders as black here; there is no video underlay.
#[rustfmt::skip]
static DEFAULT_CLUT: [[u8; 3]; 32] = [
    [0x00, 0x00, 0x00], [0xFF, 0x00, 0x00], [0x00, 0xFF, 0x00], [0xFF, 0xFF, 0x00],
    [0x00, 0x00, 0xFF], [0xFF, 0x00, 0xFF], [0x00, 0xFF, 0xFF], [0xFF, 0xFF, 0xFF],
    [0x00, 0x00, 0x00], [0x77, 0x00, 0x00], [0x00, 0x77, 0x00], [0x77, 0x77, 0x00],
    [0x00, 0x00, 0x77], [0x77, 0x00, 0x77], [0x00, 0x77, 0x77], [0x77, 0x77, 0x77],
    [0xFF, 0x00, 0x55], [0xFF, 0x77, 0x00], [0x00, 0xFF, 0x77], [0xFF, 0xFF, 0xBB],
    [0x00, 0xCC, 0xAA], [0x55, 0x00, 0x00], [0x66, 0x55, 0x22], [0xCC, 0x77, 0x77],
    [0x33, 0x33, 0x33], [0xFF, 0x77, 0x77], [0x77, 0xFF, 0x77], [0xFF, 0xFF, 0x77],
    [0x77, 0x77, 0xFF], [0xFF, 0x77, 0xFF], [0x77, 0xFF, 0xFF], [0xDD, 0xDD, 0xDD],
];

/// One rendered page: RGBA pixels, 600×475.
#[derive(Clone, PartialEq, Eq)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PageImage {
    fn new(width: u32, height: u32) -> Self {
        Self { width, height, pixels: vec![0; (width * height * 4) as usize] }
    }

    fn put(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let off = (y * self.width as usize + x) * 4;
        self.pixels[off] = rgb[0];
        self.pixels[off + 1] = rgb[1];
        self.pixels[off + 2] = rgb[2];
        self.pixels[off + 3] = 0xFF;
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let off = (y * self.width as usize + x) * 4;
        [self.pixels[off], self.pixels[off + 1], self.pixels[off + 2], self.pixels[off + 3]]
    }

    pub fn save_png(&self, path: &Path) -> Result<(), TxtError> {
        let file = File::create(path)?;
        let encoder = PngEncoder::new(BufWriter::new(file));
        encoder
            .write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)
            .map_err(|e| TxtError::Encode(e.to_string()))
    }
}

/// The active colour table: the default CLUT with any X/28/0 (or M/29/0)
/// redefinitions applied on top.
fn colour_table(svc: &TxtService, magazine: u8, sub: &SubPage) -> [[u8; 3]; 32] {
    let mut table = DEFAULT_CLUT;
    let ext = sub.extension().or_else(|| svc.magazine(magazine).extension());
    if let Some(ext) = ext {
        for (i, entry) in ext.clut.iter().enumerate() {
            if let Some([r, g, b]) = entry {
                table[i] = [r * 17, g * 17, b * 17];
            }
        }
    }
    table
}

/// Looks up the raster for a cell glyph. DRCS cells resolve through the
/// MOT DRCS association and links; unresolvable characters render blank.
fn glyph_raster(svc: &TxtService, magazine: u8, page: u8, glyph: Glyph) -> GlyphRaster {
    match glyph {
        Glyph::Char(c) => font::glyph(c),
        Glyph::Mosaic { code, separated } => font::mosaic(code, separated),
        Glyph::Smooth(code) => font::g3_glyph(code),
        Glyph::Drcs { global, index } => {
            resolve_drcs(svc, magazine, page, global, index).unwrap_or([0; GLYPH_HEIGHT])
        }
    }
}

fn resolve_drcs(
    svc: &TxtService,
    magazine: u8,
    page: u8,
    global: bool,
    index: u8,
) -> Option<GlyphRaster> {
    let mot_page = svc.mot(magazine)?;
    let assoc = mot::drcs_association(mot_page, page);
    let links = mot::drcs_links(mot_page, false);
    let link = if global {
        if assoc & 0x08 == 0 {
            return None;
        }
        links[0]?
    } else {
        let idx = (assoc & 0x07) as usize;
        if idx == 0 {
            return None;
        }
        links[idx]?
    };
    let drcs_page = svc.object_subpage(link.magazine, link.page, 0)?;
    super::drcs::glyph(drcs_page, index as usize)
}

/// Renders one subpage: assembles the grid and rasterizes it.
pub fn render_subpage(svc: &TxtService, magazine: u8, page: u8, sub: &SubPage) -> PageImage {
    let grid = svc.grid(magazine, page, sub);
    rasterize(svc, magazine, page, &grid, &colour_table(svc, magazine, sub))
}

fn rasterize(
    svc: &TxtService,
    magazine: u8,
    page: u8,
    grid: &Grid,
    clut: &[[u8; 3]; 32],
) -> PageImage {
    let mut img =
        PageImage::new((GRID_COLS * CELL_WIDTH) as u32, (GRID_ROWS * CELL_HEIGHT) as u32);

    // background fill first: double-size glyphs spill over it later
    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLS {
            let cell = grid.cell(row, col);
            let bg = clut[(cell.bg & 0x1F) as usize];
            for y in 0..CELL_HEIGHT {
                for x in 0..CELL_WIDTH {
                    img.put(col * CELL_WIDTH + x, row * CELL_HEIGHT + y, bg);
                }
            }
        }
    }

    for row in 0..GRID_ROWS {
        let mut col = 0;
        while col < GRID_COLS {
            let cell = grid.cell(row, col);
            let raster = glyph_raster(svc, magazine, page, cell.glyph);
            let (mut fg, mut bg) = (cell.fg, cell.bg);
            if cell.effects.invert {
                std::mem::swap(&mut fg, &mut bg);
            }
            let fg = clut[(fg & 0x1F) as usize];
            let bg = clut[(bg & 0x1F) as usize];

            let w_cells = if cell.effects.double_width { 2 } else { 1 };
            let h_cells = if cell.effects.double_height { 2 } else { 1 };
            let px_w = CELL_WIDTH * w_cells;
            let px_h = CELL_HEIGHT * h_cells;
            for y in 0..px_h {
                let gy = y * GLYPH_HEIGHT / px_h;
                let img_y = row * CELL_HEIGHT + y;
                if img_y >= GRID_ROWS * CELL_HEIGHT {
                    break;
                }
                for x in 0..px_w {
                    let gx = x * GLYPH_WIDTH / px_w;
                    let img_x = col * CELL_WIDTH + x;
                    if img_x >= GRID_COLS * CELL_WIDTH {
                        break;
                    }
                    let lit = raster[gy] & (1 << (11 - gx)) != 0;
                    let lit = lit && !cell.effects.conceal;
                    img.put(img_x, img_y, if lit { fg } else { bg });
                }
            }
            if cell.effects.underline {
                let y = row * CELL_HEIGHT + CELL_HEIGHT - 1;
                for x in 0..px_w.min(GRID_COLS * CELL_WIDTH - col * CELL_WIDTH) {
                    img.put(col * CELL_WIDTH + x, y, fg);
                }
            }
            // a double-width glyph consumes the neighbouring column
            col += w_cells;
        }
    }
    img
}
