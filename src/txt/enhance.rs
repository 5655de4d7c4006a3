//! The enhancement triplet processor and cross-page object resolution.
//!
//! One exhaustive dispatch covers every defined (address class, mode)
//! combination; reserved combinations are logged and have no effect.
//! Object resolution follows MOT association nibbles into POP/GPOP pages
//! and is depth-guarded: malformed link data may cycle.

use log::{debug, warn};

use crate::constants::{GRID_COLS, GRID_ROWS, MAX_OBJECT_DEPTH};

use super::charset::{self, G0Set, NationalSubset};
use super::mot::{self, ObjectDescriptor};
use super::service::TxtService;
use super::subpage::{Glyph, Grid, SubPage};
use super::triplet::Triplet;

/// Object types as carried in invocation/definition modes (mode & 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Active,
    Adaptive,
    Passive,
}

impl ObjectType {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Active),
            2 => Some(Self::Adaptive),
            3 => Some(Self::Passive),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Active => 1,
            Self::Adaptive => 2,
            Self::Passive => 3,
        }
    }
}

/// Everything the processor needs from outside the triplet stream: the
/// root service for cross-page lookups, the addressed page, the resolved
/// character set and a snapshot of the page's Level 1 control codes (the
/// propagation terminators of active-object colour changes).
pub struct EnhanceCtx<'a> {
    svc: &'a TxtService,
    magazine: u8,
    page: u8,
    set: G0Set,
    subset: NationalSubset,
    sub: &'a SubPage,
    codes: [[u8; GRID_COLS]; GRID_ROWS],
}

impl<'a> EnhanceCtx<'a> {
    pub fn new(
        svc: &'a TxtService,
        magazine: u8,
        page: u8,
        set: G0Set,
        subset: NationalSubset,
        sub: &'a SubPage,
    ) -> Self {
        let mut codes = [[0x20u8; GRID_COLS]; GRID_ROWS];
        for (row, row_codes) in codes.iter_mut().enumerate() {
            let Some(line) = sub.line(row as u8) else { continue };
            if row == 0 {
                for (i, &b) in line.header_display_bytes().iter().enumerate() {
                    row_codes[8 + i] = super::coding::parity_strip(b);
                }
            } else {
                for (col, code) in row_codes.iter_mut().enumerate() {
                    *code = line.display_char_at(col);
                }
            }
        }
        Self { svc, magazine, page, set, subset, sub, codes }
    }

    fn with_object_page(&self, sub: &'a SubPage) -> Self {
        Self {
            svc: self.svc,
            magazine: self.magazine,
            page: self.page,
            set: self.set,
            subset: self.subset,
            sub,
            codes: self.codes,
        }
    }
}

/// Colour/effect state buffered by adaptive and passive objects and
/// applied when the object writes a cell.
#[derive(Default, Clone, Copy)]
struct Pending {
    fg: Option<u8>,
    bg: Option<u8>,
}

fn is_fg_terminator(code: u8) -> bool {
    code <= 0x07 || (0x10..=0x17).contains(&code)
}

fn is_bg_terminator(code: u8) -> bool {
    code == 0x1C || code == 0x1D
}

fn set_fg(grid: &mut Grid, ctx: &EnhanceCtx<'_>, row: usize, col: usize, colour: u8,
          obj_type: ObjectType, pending: &mut Pending) {
    if obj_type != ObjectType::Active {
        pending.fg = Some(colour);
        return;
    }
    grid.cell_mut(row, col).fg = colour;
    for c in col + 1..GRID_COLS {
        if is_fg_terminator(ctx.codes[row][c]) {
            break;
        }
        grid.cell_mut(row, c).fg = colour;
    }
}

fn set_bg(grid: &mut Grid, ctx: &EnhanceCtx<'_>, row: usize, col: usize, colour: u8,
          obj_type: ObjectType, pending: &mut Pending) {
    if obj_type != ObjectType::Active {
        pending.bg = Some(colour);
        return;
    }
    grid.cell_mut(row, col).bg = colour;
    for c in col + 1..GRID_COLS {
        if is_bg_terminator(ctx.codes[row][c]) {
            break;
        }
        grid.cell_mut(row, c).bg = colour;
    }
}

fn write_glyph(grid: &mut Grid, row: usize, col: usize, glyph: Glyph,
               obj_type: ObjectType, pending: &Pending) {
    let cell = grid.cell_mut(row, col);
    cell.glyph = glyph;
    match obj_type {
        ObjectType::Active => {}
        ObjectType::Adaptive => {
            if let Some(fg) = pending.fg {
                cell.fg = fg;
            }
            if let Some(bg) = pending.bg {
                cell.bg = bg;
            }
        }
        ObjectType::Passive => {
            cell.fg = pending.fg.unwrap_or(7);
            cell.bg = pending.bg.unwrap_or(0);
        }
    }
}

/// Runs one triplet list against the grid. `row_off`/`col_off` displace
/// every addressed position (zero for the page's own X/26 stream,
/// the invocation position for objects).
pub fn process(grid: &mut Grid, ctx: &EnhanceCtx<'_>, triplets: &[Triplet],
               obj_type: ObjectType, row_off: usize, col_off: usize, depth: u8) {
    if depth > MAX_OBJECT_DEPTH {
        warn!("object nesting deeper than {MAX_OBJECT_DEPTH}, giving up");
        return;
    }
    let mut active_row = 0usize;
    let mut active_col = 0usize;
    let mut origin: Option<(usize, usize)> = None;
    let mut pending = Pending::default();

    for t in triplets {
        if t.is_row_group() {
            match t.mode() {
                // full screen colour: recolours the still-default background
                0x00 => {
                    if t.data() < 32 {
                        let colour = t.data();
                        for row in grid.cells.iter_mut() {
                            for cell in row.iter_mut() {
                                if cell.bg == 0 {
                                    cell.bg = colour;
                                }
                            }
                        }
                    }
                }
                // full row colour; data bits 5-6 both set extend it down
                0x01 => {
                    let colour = t.data() & 0x1F;
                    let start = t.designated_row() as usize;
                    let end = if t.data() & 0x60 == 0x60 { GRID_ROWS - 1 } else { start };
                    for row in start..=end.min(GRID_ROWS - 1) {
                        for cell in grid.cells[row].iter_mut() {
                            if cell.bg == 0 {
                                cell.bg = colour;
                            }
                        }
                    }
                }
                0x04 => {
                    active_row = t.designated_row() as usize;
                    if t.data() < 40 {
                        active_col = t.data() as usize;
                    }
                }
                0x07 => {
                    active_row = 0;
                    if t.data() < 40 {
                        active_col = t.data() as usize;
                    }
                }
                0x10 => {
                    origin = Some((t.designated_row() as usize, t.data().min(71) as usize));
                }
                0x11..=0x13 => {
                    let (o_row, o_col) = origin.take().unwrap_or((0, 0));
                    invoke_object(
                        grid,
                        ctx,
                        t,
                        row_off + active_row + o_row,
                        col_off + active_col + o_col,
                        depth,
                    );
                }
                0x15..=0x17 => {
                    // definition markers inside a run are a consistency
                    // check only
                    if t.mode() & 0x03 != obj_type.index() {
                        debug!(
                            "object definition type {} inside a type {} run",
                            t.mode() & 0x03,
                            obj_type.index()
                        );
                    }
                }
                0x1F => return, // termination marker: nothing after it counts
                mode => debug!("row triplet mode {mode:#04X} not implemented"),
            }
        } else {
            active_col = t.address() as usize;
            let row = row_off + active_row;
            let col = col_off + active_col;
            if row >= GRID_ROWS || col >= GRID_COLS {
                continue;
            }
            let data = t.data();
            match t.mode() {
                0x00 => {
                    if data < 32 {
                        set_fg(grid, ctx, row, col, data, obj_type, &mut pending);
                    }
                }
                0x03 => {
                    if data < 32 {
                        set_bg(grid, ctx, row, col, data, obj_type, &mut pending);
                    }
                }
                0x01 => {
                    if data >= 0x20 {
                        let glyph = Glyph::Mosaic { code: data, separated: false };
                        write_glyph(grid, row, col, glyph, obj_type, &pending);
                    }
                }
                0x09 => {
                    if data >= 0x20 {
                        let ch = charset::g0_char(ctx.set, ctx.subset, data);
                        write_glyph(grid, row, col, Glyph::Char(ch), obj_type, &pending);
                    }
                }
                0x0B => {
                    if data >= 0x20 {
                        write_glyph(grid, row, col, Glyph::Smooth(data), obj_type, &pending);
                    }
                }
                0x0D => {
                    let glyph = Glyph::Drcs { global: data & 0x40 == 0, index: data & 0x3F };
                    write_glyph(grid, row, col, glyph, obj_type, &pending);
                    // DRCS cells never inherit double-size attributes
                    let effects = &mut grid.cell_mut(row, col).effects;
                    effects.double_width = false;
                    effects.double_height = false;
                }
                0x0F => {
                    if data >= 0x20 {
                        write_glyph(grid, row, col, Glyph::Char(charset::g2_char(data)), obj_type, &pending);
                    }
                }
                0x10 => {
                    if data >= 0x20 {
                        // the one documented substitution: 0x2A renders '@'
                        let ch = if data == 0x2A {
                            '@'
                        } else {
                            charset::g0_char(ctx.set, ctx.subset, data)
                        };
                        write_glyph(grid, row, col, Glyph::Char(ch), obj_type, &pending);
                    }
                }
                mode @ 0x11..=0x1F => {
                    if data >= 0x20 {
                        let base = charset::g0_char(ctx.set, ctx.subset, data);
                        let ch = charset::diacritical(mode - 0x10, base);
                        write_glyph(grid, row, col, Glyph::Char(ch), obj_type, &pending);
                    }
                }
                mode => debug!("column triplet mode {mode:#04X} not implemented"),
            }
        }
    }
}

/// Handles an Object Invocation triplet (modes 0x11..=0x13).
fn invoke_object<'a>(grid: &mut Grid, ctx: &EnhanceCtx<'a>, t: &Triplet,
                     row_off: usize, col_off: usize, depth: u8) {
    let Some(called) = ObjectType::from_index(t.mode() & 0x03) else {
        debug!("object invocation with illegal type 0");
        return;
    };
    let source = (t.address() >> 3) & 0x03;
    match source {
        // local object: a run inside this page's own enhancement stream
        1 => {
            let designation = (t.data() >> 4) & 0x07;
            let triplet_no = (t.data() & 0x0F) as usize;
            let stream = ctx.sub.x26_triplets();
            let start = designation as usize * 13 + triplet_no;
            if start >= stream.len() {
                return;
            }
            let run = collect_run(&stream[start..], called);
            process(grid, ctx, &run, called, row_off, col_off, depth + 1);
        }
        source @ (2 | 3) => {
            let Some(mot_page) = ctx.svc.mot(ctx.magazine) else { return };
            let assoc = mot::object_association(mot_page, ctx.page);
            let links = mot::object_links(mot_page, false);
            let link = if source == 3 {
                // GPOP wanted but not associated with this page
                if assoc & 0x08 == 0 {
                    return;
                }
                links[0]
            } else {
                let idx = (assoc & 0x07) as usize;
                if idx == 0 {
                    return;
                }
                if idx > 3 {
                    debug!("POP association index {idx} out of range");
                    return;
                }
                links[idx]
            };
            let Some(link) = link else { return };
            let s1 = t.data() & 0x0F;
            let Some(object_page) = ctx.svc.object_subpage(link.magazine, link.page, s1) else {
                return; // page not yet seen: no effect
            };
            let Some(desc) =
                link.descriptors.iter().find(|d| d.object_type == called.index()).copied()
            else {
                return;
            };
            resolve_object(grid, ctx, object_page, &desc, called, row_off, col_off, depth + 1);
        }
        _ => debug!("object invocation source 0 is reserved"),
    }
}

/// Collects a run up to (excluding) a termination marker or the next
/// object definition, checking the leading definition marker when present.
fn collect_run(stream: &[Triplet], called: ObjectType) -> Vec<Triplet> {
    let mut run = Vec::new();
    let mut first = true;
    for t in stream {
        if first && t.is_object_definition() {
            if t.mode() & 0x03 != called.index() {
                debug!("object definition type mismatch: wanted {}", called.index());
            }
            first = false;
            continue;
        }
        first = false;
        if t.is_termination() || t.is_object_definition() {
            break;
        }
        run.push(*t);
    }
    run
}

/// Resolves one object via its page's pointer rows and processes the run.
/// Pointers are 9-bit absolute triplet indices counted from line 3,
/// 13 triplets per line, continuing through the X/26 continuation lines
/// 26..=41.
pub fn resolve_object<'a>(grid: &mut Grid, ctx: &EnhanceCtx<'a>, object_page: &'a SubPage,
                          desc: &ObjectDescriptor, called: ObjectType,
                          row_off: usize, col_off: usize, depth: u8) {
    if depth > MAX_OBJECT_DEPTH {
        warn!("object nesting deeper than {MAX_OBJECT_DEPTH}, giving up");
        return;
    }
    let Some(pointer_line) = object_page.line(desc.pointer_row) else { return };
    if pointer_line.function_byte() & 0x01 == 0 {
        debug!("row {} of the object page is not a pointer row", desc.pointer_row);
        return;
    }
    let triplets = pointer_line.triplets();
    let Some(pointer) = triplets.get(desc.triplet_offset as usize) else { return };
    let index = if desc.pointer_position == 0 {
        pointer.value() & 0x1FF
    } else {
        (pointer.value() >> 9) & 0x1FF
    };
    if index == 511 {
        return; // "no object" sentinel
    }

    let mut line_no = 3 + (index as usize) / 13;
    let mut offset = (index as usize) % 13;
    let mut run = Vec::new();
    let mut first = true;
    while let Some(t) = object_page.object_triplet(line_no, offset) {
        if first && t.is_object_definition() {
            if t.mode() & 0x03 != called.index() {
                debug!("object definition type mismatch: wanted {}", called.index());
            }
            first = false;
        } else {
            first = false;
            if t.is_termination() || t.is_object_definition() {
                break;
            }
            run.push(t);
        }
        offset += 1;
        if offset == 13 {
            offset = 0;
            line_no += 1;
            if line_no > 41 {
                break;
            }
        }
    }
    let object_ctx = ctx.with_object_page(object_page);
    process(grid, &object_ctx, &run, called, row_off, col_off, depth);
}

/// Pass 3: invokes the default objects the MOT associates with the page.
pub fn default_objects<'a>(grid: &mut Grid, ctx: &EnhanceCtx<'a>, mot_page: &SubPage, assoc: u8) {
    let links = mot::object_links(mot_page, false);
    let mut wanted = Vec::new();
    if assoc & 0x08 != 0 {
        wanted.push(links[0]);
    }
    let idx = (assoc & 0x07) as usize;
    if (1..=3).contains(&idx) {
        wanted.push(links[idx]);
    } else if idx > 3 {
        debug!("POP association index {idx} out of range");
    }
    for link in wanted.into_iter().flatten() {
        for desc in link.descriptors {
            let Some(called) = ObjectType::from_index(desc.object_type) else { continue };
            let Some(object_page) = ctx.svc.object_subpage(link.magazine, link.page, 0) else {
                continue;
            };
            resolve_object(grid, ctx, object_page, &desc, called, 0, 0, 1);
        }
    }
}
