//! SubPage storage and the three-pass page assembly.
//!
//! A subpage owns the stored packets of one page version. Assembly is
//! re-run on every query: pass 1 fills the 25×40 grid from the Level 1
//! rows, pass 2 applies the page's X/26 enhancement triplets, pass 3
//! invokes the default objects declared by the magazine's MOT.

use crate::constants::{GRID_COLS, GRID_ROWS};

use super::charset::{self, G0Set, NationalSubset, PageExtension};
use super::line::TxtDataField;
use super::service::TxtService;
use super::triplet::Triplet;
use super::{enhance, mot};

/// What a cell displays and where the pixels come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Resolved text character drawn from the built-in font.
    Char(char),
    /// G1 block mosaic.
    Mosaic { code: u8, separated: bool },
    /// G3 smooth mosaic, drawn from the atlas.
    Smooth(u8),
    /// Downloaded character; resolved against the MOT DRCS links at
    /// render time.
    Drcs { global: bool, index: u8 },
}

impl Glyph {
    pub const SPACE: Glyph = Glyph::Char(' ');
}

/// Per-cell effect flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub flash: bool,
    pub conceal: bool,
    pub boxed: bool,
    pub double_width: bool,
    pub double_height: bool,
    pub underline: bool,
    pub invert: bool,
}

/// One character cell: glyph, CLUT colour indices and effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub fg: u8,
    pub bg: u8,
    pub effects: Effects,
}

impl Default for Cell {
    fn default() -> Self {
        Self { glyph: Glyph::SPACE, fg: 7, bg: 0, effects: Effects::default() }
    }
}

/// The assembled 25×40 character grid.
#[derive(Clone)]
pub struct Grid {
    pub cells: [[Cell; GRID_COLS]; GRID_ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self { cells: [[Cell::default(); GRID_COLS]; GRID_ROWS] }
    }
}

impl Grid {
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row][col]
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.cells[row][col]
    }
}

/// Stored packets of one page version, indexed the way they arrive:
/// display rows by packet number, enhancement packets by designation code.
#[derive(Debug, Clone)]
pub struct SubPage {
    subpage_no: u16,
    lines: [Option<TxtDataField>; 26],
    x26: [Option<TxtDataField>; 16],
    x27: [Option<TxtDataField>; 16],
    x28: [Option<TxtDataField>; 16],
}

impl SubPage {
    pub fn new(subpage_no: u16) -> Self {
        Self {
            subpage_no,
            lines: std::array::from_fn(|_| None),
            x26: std::array::from_fn(|_| None),
            x27: std::array::from_fn(|_| None),
            x28: std::array::from_fn(|_| None),
        }
    }

    pub fn subpage_no(&self) -> u16 {
        self.subpage_no
    }

    /// Stores an incoming header. `erase_page` atomically drops every
    /// stored packet first: no state survives a page-version boundary.
    pub fn set_header(&mut self, header: TxtDataField) {
        if header.control_flags().erase_page {
            self.lines = std::array::from_fn(|_| None);
            self.x26 = std::array::from_fn(|_| None);
            self.x27 = std::array::from_fn(|_| None);
            self.x28 = std::array::from_fn(|_| None);
        }
        self.lines[0] = Some(header);
    }

    /// Routes a non-header packet into the right slot.
    pub fn add_line(&mut self, line: TxtDataField) {
        let designation = line.designation() as usize;
        match line.packet_no() {
            row @ 1..=25 => self.lines[row as usize] = Some(line),
            26 => self.x26[designation] = Some(line),
            27 => self.x27[designation] = Some(line),
            28 => self.x28[designation] = Some(line),
            _ => {}
        }
    }

    pub fn header(&self) -> Option<&TxtDataField> {
        self.lines[0].as_ref()
    }

    pub fn line(&self, row: u8) -> Option<&TxtDataField> {
        self.lines.get(row as usize)?.as_ref()
    }

    pub fn x26(&self, designation: u8) -> Option<&TxtDataField> {
        self.x26.get(designation as usize)?.as_ref()
    }

    pub fn x27(&self, designation: u8) -> Option<&TxtDataField> {
        self.x27.get(designation as usize)?.as_ref()
    }

    pub fn x28(&self, designation: u8) -> Option<&TxtDataField> {
        self.x28.get(designation as usize)?.as_ref()
    }

    pub fn stored_lines(&self) -> impl Iterator<Item = &TxtDataField> {
        self.lines
            .iter()
            .chain(self.x26.iter())
            .chain(self.x27.iter())
            .chain(self.x28.iter())
            .flatten()
    }

    /// All X/26 triplets, designation codes ascending, as one stream.
    pub fn x26_triplets(&self) -> Vec<Triplet> {
        let mut out = Vec::new();
        for line in self.x26.iter().flatten() {
            out.extend(line.triplets());
        }
        out
    }

    /// The page's own X/28/0 extension, when transmitted.
    pub fn extension(&self) -> Option<PageExtension> {
        PageExtension::from_triplets(&self.x28(0)?.triplets())
    }

    /// A triplet on an object page, addressed absolutely: lines 3..=25 are
    /// display packets, 26..=41 continue through the X/26 designations.
    pub fn object_triplet(&self, line_no: usize, offset: usize) -> Option<Triplet> {
        let line = match line_no {
            3..=25 => self.line(line_no as u8)?,
            26..=41 => self.x26((line_no - 26) as u8)?,
            _ => return None,
        };
        line.triplets().get(offset).copied()
    }

    /// Resolves the active G0 set: page X/28/0, then the magazine-level
    /// extension, then the header's national-option hint over the service
    /// default.
    pub fn charset(&self, magazine_ext: Option<&PageExtension>) -> (G0Set, NationalSubset) {
        if let Some(ext) = self.extension() {
            return charset::charset_designation(ext.default_charset);
        }
        if let Some(ext) = magazine_ext {
            return charset::charset_designation(ext.default_charset);
        }
        let hint = self.header().map(|h| h.national_option_hint()).unwrap_or(0);
        charset::charset_designation(charset::designation_with_hint(0, hint))
    }

    /// Pass 1: Level 1 fill of the display grid.
    pub fn level1_grid(&self, set: G0Set, subset: NationalSubset) -> Grid {
        let mut grid = Grid::default();
        let mut skip_row = false;
        for row in 0..GRID_ROWS {
            if skip_row {
                // the row under a double-height row shows blank cells with
                // the upper row's colours
                let above = grid.cells[row - 1];
                for col in 0..GRID_COLS {
                    grid.cells[row][col] = Cell {
                        glyph: Glyph::SPACE,
                        fg: above[col].fg,
                        bg: above[col].bg,
                        effects: Effects::default(),
                    };
                }
                skip_row = false;
                continue;
            }
            skip_row = self.decode_row(row, set, subset, &mut grid.cells[row]);
        }
        grid
    }

    /// Decodes one display row; returns true when the row set double
    /// height anywhere.
    fn decode_row(
        &self,
        row: usize,
        set: G0Set,
        subset: NationalSubset,
        cells: &mut [Cell; GRID_COLS],
    ) -> bool {
        let Some(line) = self.lines[row].as_ref() else {
            return false; // missing rows stay 40 default spaces
        };
        let bytes: Vec<u8> = if row == 0 {
            line.header_display_bytes().iter().map(|&b| super::coding::parity_strip(b)).collect()
        } else {
            (0..GRID_COLS).map(|c| line.display_char_at(c)).collect()
        };
        let first_col = if row == 0 { 8 } else { 0 };

        let mut fg = 7u8;
        let mut bg = 0u8;
        let mut mosaic = false;
        let mut separated = false;
        let mut hold = false;
        let mut flash = false;
        let mut conceal = false;
        let mut boxed = false;
        let mut dh = false;
        let mut dw = false;
        let mut held: (u8, bool) = (0x20, false);
        let mut any_double_height = false;

        for (i, &c) in bytes.iter().enumerate() {
            let col = first_col + i;
            if col >= GRID_COLS {
                break;
            }

            // "Set-At" attributes take effect on this very cell
            if c < 0x20 {
                match c {
                    0x09 => flash = false,
                    0x0C => {
                        if dh || dw {
                            held = (0x20, false);
                        }
                        dh = false;
                        dw = false;
                    }
                    0x18 => conceal = true,
                    0x19 => separated = false,
                    0x1A => separated = true,
                    0x1C => bg = 0,
                    0x1D => bg = fg,
                    0x1E => hold = true,
                    _ => {}
                }
            }

            let glyph = if c >= 0x20 {
                if mosaic && !(0x40..0x60).contains(&c) {
                    held = (c, separated);
                    Glyph::Mosaic { code: c, separated }
                } else {
                    Glyph::Char(charset::g0_char(set, subset, c))
                }
            } else if hold && mosaic {
                Glyph::Mosaic { code: held.0, separated: held.1 }
            } else {
                Glyph::SPACE
            };

            cells[col] = Cell {
                glyph,
                fg,
                bg,
                effects: Effects {
                    flash,
                    conceal,
                    boxed,
                    double_width: dw,
                    double_height: dh,
                    ..Effects::default()
                },
            };

            // "Set-After" attributes apply from the next cell on
            if c < 0x20 {
                match c {
                    0x00..=0x07 => {
                        fg = c;
                        if mosaic {
                            held = (0x20, false);
                        }
                        mosaic = false;
                        conceal = false;
                    }
                    0x08 => flash = true,
                    0x0A => boxed = false,
                    0x0B => boxed = true,
                    0x0D => {
                        dh = true;
                        dw = false;
                        any_double_height = true;
                        held = (0x20, false);
                    }
                    0x0E => {
                        dw = true;
                        dh = false;
                        held = (0x20, false);
                    }
                    0x0F => {
                        dh = true;
                        dw = true;
                        any_double_height = true;
                        held = (0x20, false);
                    }
                    0x10..=0x17 => {
                        fg = c - 0x10;
                        mosaic = true;
                        conceal = false;
                    }
                    0x1F => hold = false,
                    _ => {}
                }
            }
        }
        any_double_height
    }
}

/// Full three-pass assembly of a subpage within its service context.
pub fn assemble(svc: &TxtService, magazine: u8, page: u8, sub: &SubPage) -> Grid {
    let magazine_ext = svc.magazine(magazine).extension();
    let (set, subset) = sub.charset(magazine_ext.as_ref());

    // pass 1
    let mut grid = sub.level1_grid(set, subset);

    // pass 2: the concatenated X/26 stream acts as an active object
    let ctx = enhance::EnhanceCtx::new(svc, magazine, page, set, subset, sub);
    let triplets = sub.x26_triplets();
    if !triplets.is_empty() {
        enhance::process(&mut grid, &ctx, &triplets, enhance::ObjectType::Active, 0, 0, 0);
    }

    // pass 3: MOT default objects
    if let Some(mot_page) = svc.mot(magazine) {
        let assoc = mot::object_association(mot_page, page);
        if assoc != 0 {
            enhance::default_objects(&mut grid, &ctx, mot_page, assoc);
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATA_UNIT_TELETEXT;
    use crate::txt::line::testutil::{build_header, build_unit};
    use crate::txt::coding::encode_odd_parity;

    fn line(unit: &[u8]) -> TxtDataField {
        TxtDataField::new(unit, None).unwrap()
    }

    fn plain() -> (G0Set, NationalSubset) {
        (G0Set::Latin, NationalSubset::English)
    }

    /// Builds a display row from raw 7-bit values (control codes allowed).
    fn raw_row(packet: u8, codes: &[u8]) -> TxtDataField {
        let mut payload = [0u8; 40];
        for (i, slot) in payload.iter_mut().enumerate() {
            *slot = encode_odd_parity(codes.get(i).copied().unwrap_or(0x20));
        }
        line(&build_unit(DATA_UNIT_TELETEXT, 1, packet, &payload))
    }

    #[test]
    fn missing_rows_render_as_spaces() {
        let mut sub = SubPage::new(0);
        sub.set_header(line(&build_header(DATA_UNIT_TELETEXT, 1, 0x01, 0, false, "")));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        for row in 1..GRID_ROWS {
            for col in 0..GRID_COLS {
                assert_eq!(*grid.cell(row, col), Cell::default());
            }
        }
    }

    #[test]
    fn header_text_lands_at_column_8() {
        let mut sub = SubPage::new(0);
        sub.set_header(line(&build_header(DATA_UNIT_TELETEXT, 1, 0x01, 0, false, "P100")));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        for col in 0..8 {
            assert_eq!(grid.cell(0, col).glyph, Glyph::SPACE);
        }
        assert_eq!(grid.cell(0, 8).glyph, Glyph::Char('P'));
        assert_eq!(grid.cell(0, 9).glyph, Glyph::Char('1'));
    }

    #[test]
    fn erase_page_drops_stored_rows() {
        let mut sub = SubPage::new(0);
        sub.set_header(line(&build_header(DATA_UNIT_TELETEXT, 1, 0x01, 0, false, "")));
        sub.add_line(raw_row(5, &[b'O', b'L', b'D']));
        assert!(sub.line(5).is_some());
        sub.set_header(line(&build_header(DATA_UNIT_TELETEXT, 1, 0x01, 0, true, "")));
        assert!(sub.line(5).is_none());
        // grid is fully blank outside the header row
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        for row in 1..GRID_ROWS {
            for col in 0..GRID_COLS {
                assert_eq!(*grid.cell(row, col), Cell::default());
            }
        }
    }

    #[test]
    fn set_after_colour_applies_from_next_cell() {
        let mut sub = SubPage::new(0);
        // col 0: alpha red (0x01), col 1: 'A'
        sub.add_line(raw_row(1, &[0x01, b'A']));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(1, 0).fg, 7, "control cell keeps the old colour");
        assert_eq!(grid.cell(1, 1).fg, 1);
        assert_eq!(grid.cell(1, 1).glyph, Glyph::Char('A'));
    }

    #[test]
    fn new_background_is_set_at() {
        let mut sub = SubPage::new(0);
        // alpha yellow, then new background: the 0x1D cell itself is yellow
        sub.add_line(raw_row(1, &[0x03, 0x1D, b'X']));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(1, 1).bg, 3);
        assert_eq!(grid.cell(1, 2).bg, 3);
        assert_eq!(grid.cell(1, 0).bg, 0);
    }

    #[test]
    fn hold_mosaic_re_emits_held_glyph() {
        let mut sub = SubPage::new(0);
        // mosaic red, a sextant, hold, then release: the release cell must
        // still show the held mosaic, not a space
        sub.add_line(raw_row(1, &[0x11, 0x3A, 0x1E, 0x1F]));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(1, 1).glyph, Glyph::Mosaic { code: 0x3A, separated: false });
        assert_eq!(grid.cell(1, 2).glyph, Glyph::Mosaic { code: 0x3A, separated: false });
        assert_eq!(grid.cell(1, 3).glyph, Glyph::Mosaic { code: 0x3A, separated: false });
        // without hold the control cell would be blank
        sub.add_line(raw_row(2, &[0x11, 0x3A, 0x19]));
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(2, 2).glyph, Glyph::SPACE);
    }

    #[test]
    fn capital_letters_blast_through_mosaics() {
        let mut sub = SubPage::new(0);
        sub.add_line(raw_row(1, &[0x11, 0x21, b'A', 0x61]));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(1, 1).glyph, Glyph::Mosaic { code: 0x21, separated: false });
        assert_eq!(grid.cell(1, 2).glyph, Glyph::Char('A'));
        assert_eq!(grid.cell(1, 3).glyph, Glyph::Mosaic { code: 0x61, separated: false });
    }

    #[test]
    fn double_height_blanks_next_row_with_inherited_background() {
        let mut sub = SubPage::new(0);
        sub.add_line(raw_row(2, &[0x02, 0x1D, 0x0D, b'B', b'I', b'G']));
        sub.add_line(raw_row(3, &[b'H', b'I', b'D', b'D', b'E', b'N']));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert!(grid.cell(2, 3).effects.double_height);
        for col in 0..GRID_COLS {
            assert_eq!(grid.cell(3, col).glyph, Glyph::SPACE, "col {col}");
        }
        assert_eq!(grid.cell(3, 3).bg, 2);
        // the row after the hidden one decodes normally again
        sub.add_line(raw_row(4, &[b'O', b'K']));
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(4, 0).glyph, Glyph::Char('O'));
    }

    #[test]
    fn separated_mosaics_are_set_at() {
        let mut sub = SubPage::new(0);
        sub.add_line(raw_row(1, &[0x11, 0x1A, 0x30, 0x19, 0x30]));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert_eq!(grid.cell(1, 2).glyph, Glyph::Mosaic { code: 0x30, separated: true });
        assert_eq!(grid.cell(1, 4).glyph, Glyph::Mosaic { code: 0x30, separated: false });
    }

    #[test]
    fn national_subset_applies_to_level1_text() {
        let mut sub = SubPage::new(0);
        sub.add_line(raw_row(1, &[0x5B]));
        let grid = sub.level1_grid(G0Set::Latin, NationalSubset::German);
        assert_eq!(grid.cell(1, 0).glyph, Glyph::Char('Ä'));
    }

    #[test]
    fn object_triplet_addressing_spans_continuation_lines() {
        let mut sub = SubPage::new(0);
        let mut payload = [0u8; 40];
        payload[0] = crate::txt::coding::encode_hamming_8_4_rev(0);
        payload[1..4].copy_from_slice(&crate::txt::coding::encode_hamming_24_18(0x1ABCD));
        sub.add_line(line(&build_unit(DATA_UNIT_TELETEXT, 1, 26, &payload)));
        assert_eq!(sub.object_triplet(26, 0).unwrap().value(), 0x1ABCD);
        assert!(sub.object_triplet(3, 0).is_none());
        assert!(sub.object_triplet(42, 0).is_none());
    }

    #[test]
    fn conceal_is_set_at() {
        let mut sub = SubPage::new(0);
        sub.add_line(raw_row(1, &[b'A', 0x18, b'B', 0x01, b'C']));
        let (set, subset) = plain();
        let grid = sub.level1_grid(set, subset);
        assert!(!grid.cell(1, 0).effects.conceal);
        assert!(grid.cell(1, 1).effects.conceal);
        assert!(grid.cell(1, 2).effects.conceal);
        // a colour code releases conceal, set-after
        assert!(grid.cell(1, 3).effects.conceal);
        assert!(!grid.cell(1, 4).effects.conceal);
    }
}
