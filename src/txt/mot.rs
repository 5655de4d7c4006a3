//! Magazine Organization Table / Magazine Inventory Page decoding.
//!
//! The MOT (page 0xFE) maps every page of its magazine to object and DRCS
//! association nibbles and carries the link records naming the POP/GPOP
//! and DRCS pages those associations refer to. The MIP (page 0xFD) uses
//! the same addressing with page-function codes as values.

use super::coding::hamming_8_4_rev;
use super::subpage::SubPage;

/// Default-object pointer metadata inside an object link record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// 0 = none, 1 = active, 2 = adaptive, 3 = passive.
    pub object_type: u8,
    /// Which 9-bit half of the pointer triplet holds the pointer.
    pub pointer_position: u8,
    /// Pointer triplet index within the pointer row, 0..=12.
    pub triplet_offset: u8,
    /// Pointer row of the object page (X/1 or X/2).
    pub pointer_row: u8,
}

/// One 10-byte object link record (GPOP or POP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLink {
    pub magazine: u8,
    pub page: u8,
    pub subpage_count: u8,
    pub descriptors: [ObjectDescriptor; 2],
}

/// One 4-byte DRCS link record (GDRCS or DRCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrcsLink {
    pub magazine: u8,
    pub page: u8,
    pub subpage_count: u8,
}

fn nibble(sub: &SubPage, row: u8, idx: usize) -> Option<u8> {
    let line = sub.line(row)?;
    let b = *line.payload().get(idx)?;
    let n = hamming_8_4_rev(b);
    if n == super::coding::UNCORRECTABLE { None } else { Some(n) }
}

/// Association-table lookup: rows 1..=13 carry 20 byte-pairs each.
fn association_pair(sub: &SubPage, page: u8) -> Option<(u8, u8)> {
    let row = 1 + page / 20;
    let idx = (page % 20) as usize * 2;
    Some((nibble(sub, row, idx)?, nibble(sub, row, idx + 1)?))
}

/// The 4-bit object association for a page: bit 3 = GPOP wanted, low
/// bits = POP link index (0 = none). Returns 0 when the table is absent.
pub fn object_association(mot: &SubPage, page: u8) -> u8 {
    association_pair(mot, page).map(|(obj, _)| obj).unwrap_or(0)
}

/// The 4-bit DRCS association for a page (same split as objects).
pub fn drcs_association(mot: &SubPage, page: u8) -> u8 {
    association_pair(mot, page).map(|(_, drcs)| drcs).unwrap_or(0)
}

fn object_descriptor(sub: &SubPage, row: u8, base: usize) -> ObjectDescriptor {
    let n0 = nibble(sub, row, base).unwrap_or(0);
    ObjectDescriptor {
        object_type: n0 & 0x03,
        pointer_position: (n0 >> 2) & 0x01,
        triplet_offset: nibble(sub, row, base + 1).unwrap_or(0).min(12),
        pointer_row: nibble(sub, row, base + 2).unwrap_or(1).clamp(1, 2),
    }
}

fn object_link_at(sub: &SubPage, row: u8, base: usize) -> Option<ObjectLink> {
    let mag = nibble(sub, row, base)? & 0x07;
    let tens = nibble(sub, row, base + 1)?;
    let units = nibble(sub, row, base + 2)?;
    let page = (tens << 4) | units;
    if page == 0xFF {
        return None; // link slot not in use
    }
    Some(ObjectLink {
        magazine: mag,
        page,
        subpage_count: nibble(sub, row, base + 3)?,
        descriptors: [
            object_descriptor(sub, row, base + 4),
            object_descriptor(sub, row, base + 7),
        ],
    })
}

/// Object link records: slot 0 = GPOP, 1..=3 = POP. Row 19 carries the
/// level-2.5 set, row 20 the level-3.5 set.
pub fn object_links(mot: &SubPage, level35: bool) -> [Option<ObjectLink>; 4] {
    let row = if level35 { 20 } else { 19 };
    let mut out = [None; 4];
    for (slot, entry) in out.iter_mut().enumerate() {
        *entry = object_link_at(mot, row, slot * 10);
    }
    out
}

/// DRCS link records: slot 0 = GDRCS, 1..=7 = DRCS. Row 21 carries the
/// level-2.5 set, row 22 the level-3.5 set.
pub fn drcs_links(mot: &SubPage, level35: bool) -> [Option<DrcsLink>; 8] {
    let row = if level35 { 22 } else { 21 };
    let mut out = [None; 8];
    for (slot, entry) in out.iter_mut().enumerate() {
        let base = slot * 4;
        *entry = (|| {
            let mag = nibble(mot, row, base)? & 0x07;
            let tens = nibble(mot, row, base + 1)?;
            let units = nibble(mot, row, base + 2)?;
            let page = (tens << 4) | units;
            if page == 0xFF {
                return None;
            }
            Some(DrcsLink {
                magazine: mag,
                page,
                subpage_count: nibble(mot, row, base + 3)?,
            })
        })();
    }
    out
}

/// Trailing enhancement-page-count summary from row 23
/// (object pages, DRCS pages). Decoded for the report tree only.
pub fn enhancement_page_counts(mot: &SubPage) -> Option<(u8, u8)> {
    Some((nibble(mot, 23, 0)?, nibble(mot, 23, 1)?))
}

/// MIP page-function code for a page, when the MIP carries one.
pub fn page_function(mip: &SubPage, page: u8) -> Option<u8> {
    association_pair(mip, page).map(|(lo, hi)| (hi << 4) | lo)
}

/// Display name for a MIP page-function code.
pub fn page_function_name(code: u8) -> &'static str {
    match code {
        0x00 => "page not in transmission",
        0x01 => "single normal page",
        0x02..=0x4F => "normal page, multiple subpages",
        0x50..=0x51 => "normal page",
        0x70 => "subtitle page",
        0x71..=0x77 => "subtitle page",
        0x78 => "subtitle index page",
        0x79 => "warning message page",
        0x7A => "current TV programme information",
        0x7B => "current programme index",
        0x7C => "programme schedule page",
        0x7D => "now and next TV programmes",
        0x7E => "index page",
        0x7F => "not intended for display",
        0x80 => "page transmitted but not part of the service",
        0x81..=0xCF => "normal page, multiple subpages",
        0xE0 => "page format CA data",
        0xE1 => "page format CA data",
        0xE2 => "EPG data",
        0xE3 => "TOP BTT page",
        0xE4 => "TOP AIT page",
        0xE5 => "GPOP page",
        0xE6 => "POP page",
        0xE7 => "GDRCS page",
        0xE8 => "DRCS page",
        0xF9 => "MOT page",
        0xFD => "MIP page",
        _ => "reserved",
    }
}
