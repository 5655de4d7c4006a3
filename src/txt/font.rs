//! Built-in 12×10 glyph atlas and procedural mosaic rasters.
//!
//! Glyph rows use the low 12 bits of a `u16`, bit 11 being the leftmost
//! pixel. The ASCII atlas is authored 8 pixels wide and centred into the
//! 12-pixel cell at lookup time.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::charset::diacritical;

pub const GLYPH_WIDTH: usize = 12;
pub const GLYPH_HEIGHT: usize = 10;

/// One 12×10 1bpp glyph raster.
pub type GlyphRaster = [u16; GLYPH_HEIGHT];

/// 8-wide source glyphs for codes 0x20..=0x7F, bit 7 = leftmost pixel.
#[rustfmt::skip]
static ASCII: [[u8; 10]; 96] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x00], // space
    [0x00,0x18,0x18,0x18,0x18,0x18,0x00,0x18,0x00,0x00], // !
    [0x00,0x6C,0x6C,0x48,0x00,0x00,0x00,0x00,0x00,0x00], // "
    [0x00,0x28,0x7C,0x28,0x28,0x28,0x7C,0x28,0x00,0x00], // #
    [0x10,0x3C,0x50,0x38,0x14,0x14,0x78,0x10,0x00,0x00], // $
    [0x00,0x64,0x68,0x08,0x10,0x2C,0x4C,0x00,0x00,0x00], // %
    [0x00,0x30,0x48,0x30,0x56,0x48,0x36,0x00,0x00,0x00], // &
    [0x00,0x18,0x18,0x10,0x00,0x00,0x00,0x00,0x00,0x00], // '
    [0x00,0x08,0x10,0x20,0x20,0x20,0x10,0x08,0x00,0x00], // (
    [0x00,0x20,0x10,0x08,0x08,0x08,0x10,0x20,0x00,0x00], // )
    [0x00,0x00,0x28,0x10,0x7C,0x10,0x28,0x00,0x00,0x00], // *
    [0x00,0x00,0x10,0x10,0x7C,0x10,0x10,0x00,0x00,0x00], // +
    [0x00,0x00,0x00,0x00,0x00,0x00,0x18,0x18,0x10,0x20], // ,
    [0x00,0x00,0x00,0x00,0x7C,0x00,0x00,0x00,0x00,0x00], // -
    [0x00,0x00,0x00,0x00,0x00,0x00,0x18,0x18,0x00,0x00], // .
    [0x00,0x04,0x08,0x08,0x10,0x20,0x20,0x40,0x00,0x00], // /
    [0x00,0x38,0x44,0x4C,0x54,0x64,0x44,0x38,0x00,0x00], // 0
    [0x00,0x10,0x30,0x10,0x10,0x10,0x10,0x38,0x00,0x00], // 1
    [0x00,0x38,0x44,0x04,0x18,0x20,0x40,0x7C,0x00,0x00], // 2
    [0x00,0x38,0x44,0x04,0x18,0x04,0x44,0x38,0x00,0x00], // 3
    [0x00,0x08,0x18,0x28,0x48,0x7C,0x08,0x08,0x00,0x00], // 4
    [0x00,0x7C,0x40,0x78,0x04,0x04,0x44,0x38,0x00,0x00], // 5
    [0x00,0x18,0x20,0x40,0x78,0x44,0x44,0x38,0x00,0x00], // 6
    [0x00,0x7C,0x04,0x08,0x10,0x20,0x20,0x20,0x00,0x00], // 7
    [0x00,0x38,0x44,0x44,0x38,0x44,0x44,0x38,0x00,0x00], // 8
    [0x00,0x38,0x44,0x44,0x3C,0x04,0x08,0x30,0x00,0x00], // 9
    [0x00,0x00,0x18,0x18,0x00,0x18,0x18,0x00,0x00,0x00], // :
    [0x00,0x00,0x18,0x18,0x00,0x18,0x18,0x10,0x20,0x00], // ;
    [0x00,0x04,0x08,0x10,0x20,0x10,0x08,0x04,0x00,0x00], // <
    [0x00,0x00,0x00,0x7C,0x00,0x7C,0x00,0x00,0x00,0x00], // =
    [0x00,0x20,0x10,0x08,0x04,0x08,0x10,0x20,0x00,0x00], // >
    [0x00,0x38,0x44,0x04,0x08,0x10,0x00,0x10,0x00,0x00], // ?
    [0x00,0x38,0x44,0x5C,0x54,0x5C,0x40,0x38,0x00,0x00], // @
    [0x00,0x38,0x44,0x44,0x7C,0x44,0x44,0x44,0x00,0x00], // A
    [0x00,0x78,0x44,0x44,0x78,0x44,0x44,0x78,0x00,0x00], // B
    [0x00,0x38,0x44,0x40,0x40,0x40,0x44,0x38,0x00,0x00], // C
    [0x00,0x70,0x48,0x44,0x44,0x44,0x48,0x70,0x00,0x00], // D
    [0x00,0x7C,0x40,0x40,0x78,0x40,0x40,0x7C,0x00,0x00], // E
    [0x00,0x7C,0x40,0x40,0x78,0x40,0x40,0x40,0x00,0x00], // F
    [0x00,0x38,0x44,0x40,0x5C,0x44,0x44,0x3C,0x00,0x00], // G
    [0x00,0x44,0x44,0x44,0x7C,0x44,0x44,0x44,0x00,0x00], // H
    [0x00,0x38,0x10,0x10,0x10,0x10,0x10,0x38,0x00,0x00], // I
    [0x00,0x1C,0x08,0x08,0x08,0x08,0x48,0x30,0x00,0x00], // J
    [0x00,0x44,0x48,0x50,0x60,0x50,0x48,0x44,0x00,0x00], // K
    [0x00,0x40,0x40,0x40,0x40,0x40,0x40,0x7C,0x00,0x00], // L
    [0x00,0x44,0x6C,0x54,0x54,0x44,0x44,0x44,0x00,0x00], // M
    [0x00,0x44,0x64,0x54,0x4C,0x44,0x44,0x44,0x00,0x00], // N
    [0x00,0x38,0x44,0x44,0x44,0x44,0x44,0x38,0x00,0x00], // O
    [0x00,0x78,0x44,0x44,0x78,0x40,0x40,0x40,0x00,0x00], // P
    [0x00,0x38,0x44,0x44,0x44,0x54,0x48,0x34,0x00,0x00], // Q
    [0x00,0x78,0x44,0x44,0x78,0x50,0x48,0x44,0x00,0x00], // R
    [0x00,0x38,0x44,0x40,0x38,0x04,0x44,0x38,0x00,0x00], // S
    [0x00,0x7C,0x10,0x10,0x10,0x10,0x10,0x10,0x00,0x00], // T
    [0x00,0x44,0x44,0x44,0x44,0x44,0x44,0x38,0x00,0x00], // U
    [0x00,0x44,0x44,0x44,0x28,0x28,0x10,0x10,0x00,0x00], // V
    [0x00,0x44,0x44,0x44,0x54,0x54,0x6C,0x44,0x00,0x00], // W
    [0x00,0x44,0x44,0x28,0x10,0x28,0x44,0x44,0x00,0x00], // X
    [0x00,0x44,0x44,0x28,0x10,0x10,0x10,0x10,0x00,0x00], // Y
    [0x00,0x7C,0x04,0x08,0x10,0x20,0x40,0x7C,0x00,0x00], // Z
    [0x00,0x10,0x20,0x7C,0x20,0x7C,0x20,0x10,0x00,0x00], // 0x5B left arrow
    [0x00,0x40,0x7C,0x48,0x10,0x3E,0x44,0x08,0x08,0x00], // 0x5C one half
    [0x00,0x10,0x08,0x7C,0x08,0x7C,0x08,0x10,0x00,0x00], // 0x5D right arrow
    [0x00,0x10,0x38,0x54,0x10,0x10,0x10,0x10,0x00,0x00], // 0x5E up arrow
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00,0x7C,0x00,0x00], // 0x5F hash/underscore position
    [0x00,0x00,0x00,0x00,0x7C,0x00,0x00,0x00,0x00,0x00], // 0x60 dash
    [0x00,0x00,0x00,0x38,0x04,0x3C,0x44,0x3C,0x00,0x00], // a
    [0x00,0x40,0x40,0x78,0x44,0x44,0x44,0x78,0x00,0x00], // b
    [0x00,0x00,0x00,0x38,0x44,0x40,0x44,0x38,0x00,0x00], // c
    [0x00,0x04,0x04,0x3C,0x44,0x44,0x44,0x3C,0x00,0x00], // d
    [0x00,0x00,0x00,0x38,0x44,0x7C,0x40,0x38,0x00,0x00], // e
    [0x00,0x18,0x24,0x20,0x78,0x20,0x20,0x20,0x00,0x00], // f
    [0x00,0x00,0x00,0x3C,0x44,0x44,0x3C,0x04,0x44,0x38], // g
    [0x00,0x40,0x40,0x78,0x44,0x44,0x44,0x44,0x00,0x00], // h
    [0x00,0x10,0x00,0x30,0x10,0x10,0x10,0x38,0x00,0x00], // i
    [0x00,0x08,0x00,0x18,0x08,0x08,0x08,0x48,0x48,0x30], // j
    [0x00,0x40,0x40,0x48,0x50,0x60,0x50,0x48,0x00,0x00], // k
    [0x00,0x30,0x10,0x10,0x10,0x10,0x10,0x38,0x00,0x00], // l
    [0x00,0x00,0x00,0x68,0x54,0x54,0x54,0x54,0x00,0x00], // m
    [0x00,0x00,0x00,0x78,0x44,0x44,0x44,0x44,0x00,0x00], // n
    [0x00,0x00,0x00,0x38,0x44,0x44,0x44,0x38,0x00,0x00], // o
    [0x00,0x00,0x00,0x78,0x44,0x44,0x78,0x40,0x40,0x00], // p
    [0x00,0x00,0x00,0x3C,0x44,0x44,0x3C,0x04,0x04,0x00], // q
    [0x00,0x00,0x00,0x58,0x64,0x40,0x40,0x40,0x00,0x00], // r
    [0x00,0x00,0x00,0x3C,0x40,0x38,0x04,0x78,0x00,0x00], // s
    [0x00,0x20,0x20,0x78,0x20,0x20,0x24,0x18,0x00,0x00], // t
    [0x00,0x00,0x00,0x44,0x44,0x44,0x44,0x3C,0x00,0x00], // u
    [0x00,0x00,0x00,0x44,0x44,0x28,0x28,0x10,0x00,0x00], // v
    [0x00,0x00,0x00,0x44,0x54,0x54,0x54,0x28,0x00,0x00], // w
    [0x00,0x00,0x00,0x44,0x28,0x10,0x28,0x44,0x00,0x00], // x
    [0x00,0x00,0x00,0x44,0x44,0x44,0x3C,0x04,0x44,0x38], // y
    [0x00,0x00,0x00,0x7C,0x08,0x10,0x20,0x7C,0x00,0x00], // z
    [0x00,0x60,0x90,0x20,0x40,0xF0,0x0E,0x04,0x08,0x00], // 0x7B one quarter
    [0x00,0x28,0x28,0x28,0x28,0x28,0x28,0x28,0x00,0x00], // 0x7C double bar
    [0x00,0xE0,0x30,0x60,0x30,0xE6,0x0E,0x04,0x08,0x00], // 0x7D three quarters
    [0x00,0x00,0x10,0x00,0x7C,0x00,0x10,0x00,0x00,0x00], // 0x7E divide
    [0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC], // 0x7F block
];

/// Glyphs for non-ASCII characters the charset tables can produce.
#[rustfmt::skip]
static SPECIALS: &[(char, [u8; 10])] = &[
    ('£', [0x00,0x18,0x24,0x20,0x78,0x20,0x20,0x7C,0x00,0x00]),
    ('¤', [0x00,0x44,0x38,0x28,0x28,0x38,0x44,0x00,0x00,0x00]),
    ('¥', [0x00,0x44,0x28,0x10,0x7C,0x10,0x7C,0x10,0x00,0x00]),
    ('§', [0x00,0x38,0x40,0x38,0x44,0x38,0x04,0x38,0x00,0x00]),
    ('°', [0x00,0x30,0x48,0x48,0x30,0x00,0x00,0x00,0x00,0x00]),
    ('±', [0x00,0x10,0x7C,0x10,0x00,0x7C,0x00,0x00,0x00,0x00]),
    ('×', [0x00,0x00,0x44,0x28,0x10,0x28,0x44,0x00,0x00,0x00]),
    ('÷', [0x00,0x00,0x10,0x00,0x7C,0x00,0x10,0x00,0x00,0x00]),
    ('–', [0x00,0x00,0x00,0x00,0x7C,0x00,0x00,0x00,0x00,0x00]),
    ('—', [0x00,0x00,0x00,0x00,0xFE,0x00,0x00,0x00,0x00,0x00]),
    ('½', [0x00,0x40,0x7C,0x48,0x10,0x3E,0x44,0x08,0x08,0x00]),
    ('¼', [0x00,0x60,0x90,0x20,0x40,0xF0,0x0E,0x04,0x08,0x00]),
    ('¾', [0x00,0xE0,0x30,0x60,0x30,0xE6,0x0E,0x04,0x08,0x00]),
    ('‖', [0x00,0x28,0x28,0x28,0x28,0x28,0x28,0x28,0x00,0x00]),
    ('←', [0x00,0x10,0x20,0x7C,0x20,0x7C,0x20,0x10,0x00,0x00]),
    ('→', [0x00,0x10,0x08,0x7C,0x08,0x7C,0x08,0x10,0x00,0x00]),
    ('↑', [0x00,0x10,0x38,0x54,0x10,0x10,0x10,0x10,0x00,0x00]),
    ('↓', [0x00,0x10,0x10,0x10,0x10,0x54,0x38,0x10,0x00,0x00]),
    ('■', [0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC,0xFC]),
    ('¡', [0x00,0x18,0x00,0x18,0x18,0x18,0x18,0x18,0x00,0x00]),
    ('¿', [0x00,0x10,0x00,0x10,0x20,0x40,0x44,0x38,0x00,0x00]),
    ('ß', [0x00,0x38,0x44,0x44,0x58,0x44,0x44,0x58,0x40,0x00]),
    ('¢', [0x00,0x10,0x38,0x54,0x50,0x54,0x38,0x10,0x00,0x00]),
    ('«', [0x00,0x00,0x24,0x48,0x90,0x48,0x24,0x00,0x00,0x00]),
    ('»', [0x00,0x00,0x48,0x24,0x12,0x24,0x48,0x00,0x00,0x00]),
    ('·', [0x00,0x00,0x00,0x18,0x18,0x00,0x00,0x00,0x00,0x00]),
    ('¶', [0x00,0x3C,0x74,0x74,0x34,0x14,0x14,0x14,0x00,0x00]),
    ('²', [0x00,0x30,0x48,0x10,0x20,0x78,0x00,0x00,0x00,0x00]),
    ('³', [0x00,0x70,0x08,0x30,0x08,0x70,0x00,0x00,0x00,0x00]),
    ('¹', [0x00,0x20,0x60,0x20,0x20,0x70,0x00,0x00,0x00,0x00]),
    ('©', [0x00,0x38,0x44,0x5A,0x52,0x5A,0x44,0x38,0x00,0x00]),
    ('®', [0x00,0x38,0x44,0x5A,0x56,0x5A,0x44,0x38,0x00,0x00]),
    ('™', [0x00,0xEA,0x4E,0x4A,0x4A,0x00,0x00,0x00,0x00,0x00]),
    ('♪', [0x00,0x18,0x14,0x12,0x10,0x10,0x70,0x60,0x00,0x00]),
    ('µ', [0x00,0x00,0x00,0x44,0x44,0x44,0x78,0x40,0x40,0x00]),
    ('Ñ', [0x38,0x00,0x44,0x64,0x54,0x4C,0x44,0x44,0x00,0x00]),
    ('ñ', [0x38,0x00,0x00,0x78,0x44,0x44,0x44,0x44,0x00,0x00]),
    ('Ø', [0x00,0x3A,0x44,0x4C,0x54,0x64,0x44,0xB8,0x00,0x00]),
    ('ø', [0x00,0x00,0x02,0x3C,0x4C,0x54,0x64,0x78,0x80,0x00]),
    ('Æ', [0x00,0x3C,0x50,0x50,0x7C,0x50,0x50,0x5C,0x00,0x00]),
    ('æ', [0x00,0x00,0x00,0x78,0x14,0x7C,0x50,0x3C,0x00,0x00]),
    ('Þ', [0x00,0x40,0x78,0x44,0x44,0x78,0x40,0x40,0x00,0x00]),
    ('þ', [0x00,0x40,0x40,0x78,0x44,0x44,0x78,0x40,0x40,0x00]),
    ('ð', [0x00,0x28,0x10,0x28,0x04,0x3C,0x44,0x38,0x00,0x00]),
    ('Đ', [0x00,0x70,0x48,0x44,0xE4,0x44,0x48,0x70,0x00,0x00]),
    ('đ', [0x00,0x04,0x0E,0x3C,0x44,0x44,0x44,0x3C,0x00,0x00]),
    ('ı', [0x00,0x00,0x00,0x30,0x10,0x10,0x10,0x38,0x00,0x00]),
    ('İ', [0x10,0x00,0x38,0x10,0x10,0x10,0x10,0x38,0x00,0x00]),
    ('Ω', [0x00,0x38,0x44,0x44,0x44,0x28,0x28,0x6C,0x00,0x00]),
    ('₺', [0x00,0x10,0x58,0x30,0x50,0x30,0x50,0x5C,0x00,0x00]),
    ('₠', [0x00,0x38,0x44,0x40,0x70,0x40,0x44,0x38,0x00,0x00]),
];

/// Accent overlays, by diacritical-mark index, drawn into glyph rows 0-1.
#[rustfmt::skip]
static ACCENTS: [[u8; 2]; 16] = [
    [0x00, 0x00],
    [0x20, 0x10], // grave
    [0x08, 0x10], // acute
    [0x10, 0x28], // circumflex
    [0x34, 0x58], // tilde
    [0x00, 0x7C], // macron
    [0x28, 0x10], // breve
    [0x00, 0x10], // dot above
    [0x28, 0x28], // diaeresis
    [0x00, 0x00], // dot below (not drawn)
    [0x10, 0x28], // ring
    [0x00, 0x00], // cedilla (not drawn)
    [0x00, 0x00], // underline (not drawn)
    [0x12, 0x24], // double acute
    [0x00, 0x00], // ogonek (not drawn)
    [0x28, 0x10], // caron
];

fn widen(rows: &[u8; 10]) -> GlyphRaster {
    let mut out = [0u16; GLYPH_HEIGHT];
    for (i, &r) in rows.iter().enumerate() {
        out[i] = (r as u16) << 2;
    }
    out
}

/// Decomposition map built by inverting the charset combination table.
static DECOMPOSED: LazyLock<HashMap<char, (char, u8)>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for mark in 1..16u8 {
        for base in ('A'..='Z').chain('a'..='z') {
            let combined = diacritical(mark, base);
            if combined != base {
                map.entry(combined).or_insert((base, mark));
            }
        }
    }
    map
});

/// Looks up the glyph for a resolved character, composing accented letters
/// from their base glyph and an accent overlay. Unknown characters render
/// as a solid block.
pub fn glyph(c: char) -> GlyphRaster {
    if ('\u{20}'..'\u{7F}').contains(&c) {
        return widen(&ASCII[(c as usize) - 0x20]);
    }
    if let Some((_, rows)) = SPECIALS.iter().find(|(s, _)| *s == c) {
        return widen(rows);
    }
    if let Some(&(base, mark)) = DECOMPOSED.get(&c) {
        let mut rows = ASCII[(base as usize) - 0x20];
        rows[0] |= ACCENTS[mark as usize][0];
        rows[1] |= ACCENTS[mark as usize][1];
        return widen(&rows);
    }
    widen(&ASCII[0x7F - 0x20])
}

/// G1 block mosaic raster. The six blocks map to code bits 0..=4 and 6;
/// separated graphics leave a 2-pixel gap right and 1-pixel gap below
/// each lit block.
pub fn mosaic(code: u8, separated: bool) -> GlyphRaster {
    let mut out = [0u16; GLYPH_HEIGHT];
    let blocks = (code & 0x1F) | ((code & 0x40) >> 1);
    let col_spans = [(0usize, 6usize), (6, 12)];
    let row_spans = [(0usize, 3usize), (3, 7), (7, 10)];
    for (bi, bit) in [0u8, 1, 2, 3, 4, 5].iter().enumerate() {
        if blocks & (1 << bit) == 0 {
            continue;
        }
        let (x0, x1) = col_spans[bi % 2];
        let (y0, y1) = row_spans[bi / 2];
        let (x1, y1) = if separated { (x1 - 2, y1 - 1) } else { (x1, y1) };
        for row in out.iter_mut().take(y1).skip(y0) {
            for x in x0..x1 {
                *row |= 1 << (11 - x);
            }
        }
    }
    out
}

fn hline(raster: &mut GlyphRaster, y: usize) {
    raster[y] = 0xFFF;
}

fn vline(raster: &mut GlyphRaster, x: usize) {
    for row in raster.iter_mut() {
        *row |= 1 << (11 - x);
    }
}

/// G3 smooth-mosaic atlas. Codes 0x20..=0x3F reuse the block-mosaic
/// shapes; the line-drawing range is approximated with straight segments.
pub static G3: LazyLock<[GlyphRaster; 96]> = LazyLock::new(|| {
    let mut atlas = [[0u16; GLYPH_HEIGHT]; 96];
    for (i, slot) in atlas.iter_mut().enumerate() {
        let code = (i + 0x20) as u8;
        match code {
            0x20..=0x3F => *slot = mosaic(code, false),
            // horizontal/vertical line weights
            0x40..=0x47 => hline(slot, 4 + (code as usize & 0x03) % 5),
            0x48..=0x4F => vline(slot, 5 + (code as usize & 0x03)),
            // corners and junctions: a cross armature with arms knocked out
            0x50..=0x5F => {
                let arms = code & 0x0F;
                if arms & 0x1 != 0 {
                    for x in 0..6 {
                        slot[4] |= 1 << (11 - x);
                    }
                }
                if arms & 0x2 != 0 {
                    for x in 6..12 {
                        slot[4] |= 1 << (11 - x);
                    }
                }
                if arms & 0x4 != 0 {
                    for row in slot.iter_mut().take(5) {
                        *row |= 1 << 6;
                    }
                }
                if arms & 0x8 != 0 {
                    for row in slot.iter_mut().skip(4) {
                        *row |= 1 << 6;
                    }
                }
            }
            // diagonals
            0x60..=0x67 => {
                for y in 0..GLYPH_HEIGHT {
                    let x = y * (GLYPH_WIDTH - 1) / (GLYPH_HEIGHT - 1);
                    slot[y] |= 1 << (11 - x);
                }
            }
            0x68..=0x6F => {
                for y in 0..GLYPH_HEIGHT {
                    let x = (GLYPH_WIDTH - 1) - y * (GLYPH_WIDTH - 1) / (GLYPH_HEIGHT - 1);
                    slot[y] |= 1 << (11 - x);
                }
            }
            // rounded block quadrants: reuse the sextant shapes
            _ => *slot = mosaic(code & 0x7F, false),
        }
    }
    atlas
});

/// A G3 atlas slice.
pub fn g3_glyph(code: u8) -> GlyphRaster {
    if (0x20..=0x7F).contains(&code) {
        G3[(code - 0x20) as usize]
    } else {
        [0; GLYPH_HEIGHT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_glyphs_fit_the_cell() {
        for c in 0x20..0x7Fu8 {
            let g = glyph(c as char);
            for row in g {
                assert_eq!(row & !0xFFF, 0, "glyph {c:#04X} exceeds 12 px");
            }
        }
    }

    #[test]
    fn accented_glyph_composes_base_and_mark() {
        let base = glyph('A');
        let accented = glyph('Á');
        // body rows identical, top rows gain the accent
        assert_eq!(base[3..], accented[3..]);
        assert_ne!(base[..2], accented[..2]);
    }

    #[test]
    fn unknown_char_renders_as_block() {
        assert_eq!(glyph('\u{4E00}'), glyph('\u{7F}'));
    }

    #[test]
    fn full_mosaic_fills_the_cell() {
        let g = mosaic(0x7F, false);
        assert!(g.iter().all(|&row| row == 0xFFF));
    }

    #[test]
    fn empty_mosaic_is_blank() {
        assert_eq!(mosaic(0x20, false), [0u16; GLYPH_HEIGHT]);
    }

    #[test]
    fn separated_mosaic_leaves_gaps() {
        let contiguous = mosaic(0x7F, true);
        // rightmost columns of each half stay clear
        for row in contiguous {
            assert_eq!(row & (1 << (11 - 5)), 0);
            assert_eq!(row & 1, 0);
        }
    }

    #[test]
    fn single_block_addressing() {
        // bit 0 is the top-left sextant
        let g = mosaic(0x21, false);
        assert_ne!(g[0] & (1 << 11), 0);
        assert_eq!(g[9], 0);
    }

    #[test]
    fn g3_atlas_covers_all_codes() {
        for code in 0x20..=0x7Fu8 {
            let _ = g3_glyph(code);
        }
        assert_eq!(g3_glyph(0x1F), [0u16; GLYPH_HEIGHT]);
    }
}
