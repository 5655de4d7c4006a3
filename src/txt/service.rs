//! The decoded service: magazines, pages, subpages and service packets.
//!
//! `TxtService` is the single root aggregate. Incoming lines are routed
//! down the hierarchy by magazine and the per-magazine "current page"
//! cursor; all cross-page references (MOT, POP, DRCS) resolve through
//! explicit lookups on this root instead of back-pointers.

use std::collections::BTreeMap;

use log::trace;

use crate::constants::MOT_PAGE;

use super::charset::PageExtension;
use super::line::TxtDataField;
use super::render::PageImage;
use super::subpage::{self, Grid, SubPage};

/// Where a page's "current subpage" cursor points.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Keyed(u16),
    Subtitle(usize),
}

/// One page: keyed subpages for rolling pages, arrival-ordered versions
/// for subtitle streams.
#[derive(Debug, Clone, Default)]
pub struct Page {
    subpages: BTreeMap<u16, SubPage>,
    subtitle_versions: Vec<SubPage>,
    cursor: Option<Cursor>,
}

impl Page {
    fn set_header(&mut self, header: TxtDataField) {
        if header.is_subtitle() {
            let mut sub = SubPage::new(header.sub_page_no());
            sub.set_header(header);
            self.subtitle_versions.push(sub);
            self.cursor = Some(Cursor::Subtitle(self.subtitle_versions.len() - 1));
        } else {
            let no = header.sub_page_no();
            let sub = self.subpages.entry(no).or_insert_with(|| SubPage::new(no));
            sub.set_header(header);
            self.cursor = Some(Cursor::Keyed(no));
        }
    }

    fn add_line(&mut self, line: TxtDataField) {
        match self.cursor {
            Some(Cursor::Keyed(no)) => {
                if let Some(sub) = self.subpages.get_mut(&no) {
                    sub.add_line(line);
                }
            }
            Some(Cursor::Subtitle(idx)) => {
                if let Some(sub) = self.subtitle_versions.get_mut(idx) {
                    sub.add_line(line);
                }
            }
            None => trace!("display row before any header, dropped"),
        }
    }

    pub fn subpage(&self, subpage_no: u16) -> Option<&SubPage> {
        self.subpages.get(&subpage_no)
    }

    pub fn subpages(&self) -> impl Iterator<Item = &SubPage> {
        self.subpages.values()
    }

    pub fn subtitle_versions(&self) -> &[SubPage] {
        &self.subtitle_versions
    }

    pub fn first_subpage(&self) -> Option<&SubPage> {
        self.subpages.values().next().or_else(|| self.subtitle_versions.first())
    }

    pub fn current_subpage(&self) -> Option<&SubPage> {
        match self.cursor? {
            Cursor::Keyed(no) => self.subpages.get(&no),
            Cursor::Subtitle(idx) => self.subtitle_versions.get(idx),
        }
    }
}

/// One magazine: its pages, the current-page cursor and the magazine-wide
/// Y=29 enhancement packets.
#[derive(Debug, Clone, Default)]
pub struct Magazine {
    pages: BTreeMap<u8, Page>,
    current_page: Option<u8>,
    x29: [Option<TxtDataField>; 16],
}

impl Magazine {
    fn add_field(&mut self, line: TxtDataField) {
        match line.packet_no() {
            0 => {
                let page_no = line.page_no();
                if page_no == 0xFF {
                    // time filling header: keeps the data channel alive
                    // without addressing a page
                    self.current_page = None;
                    return;
                }
                self.current_page = Some(page_no);
                self.pages.entry(page_no).or_default().set_header(line);
            }
            29 => {
                let designation = line.designation() as usize;
                self.x29[designation] = Some(line)
            }
            1..=28 => {
                if let Some(page_no) = self.current_page
                    && let Some(page) = self.pages.get_mut(&page_no)
                {
                    page.add_line(line);
                } else {
                    trace!("row {} before any header, dropped", line.packet_no());
                }
            }
            _ => {}
        }
    }

    pub fn page(&self, page_no: u8) -> Option<&Page> {
        self.pages.get(&page_no)
    }

    pub fn pages(&self) -> impl Iterator<Item = (u8, &Page)> {
        self.pages.iter().map(|(&no, page)| (no, page))
    }

    pub fn x29(&self, designation: u8) -> Option<&TxtDataField> {
        self.x29.get(designation as usize)?.as_ref()
    }

    /// Magazine-level M/29/0 extension, the fallback below page X/28/0.
    pub fn extension(&self) -> Option<PageExtension> {
        PageExtension::from_triplets(&self.x29(0)?.triplets())
    }
}

/// The root aggregate: eight magazines plus the de-duplicated service
/// packets (Y=30/31, stored per designation with occurrence counts).
#[derive(Debug, Clone, Default)]
pub struct TxtService {
    magazines: [Magazine; 8],
    service_lines: [Vec<(TxtDataField, u32)>; 32],
}

impl TxtService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry point for the PES layer: one raw 46-byte data unit.
    pub fn add_data_unit(&mut self, unit: &[u8], pts: Option<u64>) {
        if let Some(line) = TxtDataField::new(unit, pts) {
            self.add_field(line);
        }
    }

    pub fn add_field(&mut self, line: TxtDataField) {
        match line.packet_no() {
            30 | 31 => {
                let idx = ((line.packet_no() - 30) * 16 + line.designation()) as usize;
                let list = &mut self.service_lines[idx];
                if let Some((_, count)) = list.iter_mut().find(|(stored, _)| *stored == line) {
                    *count += 1;
                } else {
                    list.push((line, 1));
                }
            }
            _ => self.magazines[line.magazine() as usize].add_field(line),
        }
    }

    pub fn magazine(&self, magazine: u8) -> &Magazine {
        &self.magazines[(magazine & 0x07) as usize]
    }

    pub fn magazines(&self) -> impl Iterator<Item = (u8, &Magazine)> {
        self.magazines.iter().enumerate().map(|(no, m)| (no as u8, m))
    }

    pub fn page(&self, magazine: u8, page: u8) -> Option<&Page> {
        self.magazine(magazine).page(page)
    }

    pub fn subpage(&self, magazine: u8, page: u8, subpage: u16) -> Option<&SubPage> {
        self.page(magazine, page)?.subpage(subpage)
    }

    /// The magazine's MOT page, when transmitted.
    pub fn mot(&self, magazine: u8) -> Option<&SubPage> {
        self.page(magazine, MOT_PAGE)?.first_subpage()
    }

    /// Object/DRCS page lookup by the S1 sub-page digit, falling back to
    /// the first stored subpage.
    pub fn object_subpage(&self, magazine: u8, page: u8, s1: u8) -> Option<&SubPage> {
        let page = self.page(magazine, page)?;
        page.subpage(s1 as u16)
            .or_else(|| page.subpages().find(|s| (s.subpage_no() & 0x0F) as u8 == s1))
            .or_else(|| page.first_subpage())
    }

    /// Service packets of row 30 or 31 for one designation, with counts.
    pub fn service_lines(&self, row: u8, designation: u8) -> &[(TxtDataField, u32)] {
        let idx = ((row.clamp(30, 31) - 30) * 16 + (designation & 0x0F)) as usize;
        &self.service_lines[idx]
    }

    /// Assembles the display grid for one subpage (all three passes).
    pub fn grid(&self, magazine: u8, page: u8, sub: &SubPage) -> Grid {
        subpage::assemble(self, magazine, page, sub)
    }

    /// Renders one subpage to pixels.
    pub fn render(&self, magazine: u8, page: u8, sub: &SubPage) -> PageImage {
        super::render::render_subpage(self, magazine, page, sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DATA_UNIT_SUBTITLE, DATA_UNIT_TELETEXT};
    use crate::txt::coding::{
        encode_hamming_8_4_rev, encode_hamming_24_18, encode_odd_parity,
    };
    use crate::txt::line::testutil::{build_header, build_row, build_unit};
    use crate::txt::subpage::{Cell, Glyph};
    use crate::constants::{GRID_COLS, GRID_ROWS};

    fn feed(svc: &mut TxtService, unit: &[u8]) {
        svc.add_data_unit(unit, None);
    }

    fn triplet_value(address: u8, mode: u8, data: u8) -> u32 {
        (address as u32) | ((mode as u32) << 6) | ((data as u32) << 11)
    }

    const TERMINATION: (u8, u8, u8) = (63, 0x1F, 0);

    /// Builds an enhancement packet (X/26 etc) from (address, mode, data)
    /// triples; the rest of the packet is left after a termination marker.
    fn enhancement_packet(packet: u8, designation: u8, triplets: &[(u8, u8, u8)]) -> Vec<u8> {
        let mut payload = [0u8; 40];
        payload[0] = encode_hamming_8_4_rev(designation);
        for i in 0..13 {
            let (a, m, d) = triplets.get(i).copied().unwrap_or(TERMINATION);
            let enc = encode_hamming_24_18(triplet_value(a, m, d));
            payload[1 + i * 3..4 + i * 3].copy_from_slice(&enc);
        }
        build_unit(DATA_UNIT_TELETEXT, 1, packet, &payload)
    }

    /// Builds a MOT packet whose payload carries raw Hamming nibbles.
    fn nibble_packet(packet: u8, nibbles: &[u8]) -> Vec<u8> {
        let mut payload = [0u8; 40];
        for (i, &n) in nibbles.iter().enumerate().take(40) {
            payload[i] = encode_hamming_8_4_rev(n);
        }
        build_unit(DATA_UNIT_TELETEXT, 1, packet, &payload)
    }

    #[test]
    fn routing_follows_the_current_page_cursor() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x10, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_TELETEXT, 1, 3, "FIRST"));
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x11, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_TELETEXT, 1, 3, "SECOND"));

        let first = svc.page(1, 0x10).unwrap().current_subpage().unwrap();
        assert_eq!(first.line(3).unwrap().display_char_at(0), b'F');
        let second = svc.page(1, 0x11).unwrap().current_subpage().unwrap();
        assert_eq!(second.line(3).unwrap().display_char_at(0), b'S');
    }

    #[test]
    fn subtitle_headers_append_versions() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_SUBTITLE, 2, 0x88, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_SUBTITLE, 2, 20, "ONE"));
        feed(&mut svc, &build_header(DATA_UNIT_SUBTITLE, 2, 0x88, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_SUBTITLE, 2, 20, "TWO"));
        let page = svc.page(2, 0x88).unwrap();
        assert_eq!(page.subtitle_versions().len(), 2);
        assert_eq!(page.subtitle_versions()[0].line(20).unwrap().display_char_at(0), b'O');
        assert_eq!(page.subtitle_versions()[1].line(20).unwrap().display_char_at(0), b'T');
    }

    #[test]
    fn service_packets_deduplicate_with_counts() {
        let mut svc = TxtService::new();
        let mut payload = [0u8; 40];
        payload[0] = encode_hamming_8_4_rev(0);
        for slot in payload[1..].iter_mut() {
            *slot = encode_odd_parity(b'X');
        }
        let unit = build_unit(DATA_UNIT_TELETEXT, 0, 30, &payload);
        feed(&mut svc, &unit);
        feed(&mut svc, &unit);
        let mut other = payload;
        other[5] = encode_odd_parity(b'Y');
        feed(&mut svc, &build_unit(DATA_UNIT_TELETEXT, 0, 30, &other));

        let stored = svc.service_lines(30, 0);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].1, 2);
        assert_eq!(stored[1].1, 1);
    }

    #[test]
    fn scenario_a_erased_page_renders_blank() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x01, 0x0000, true, "HEADER"));
        let sub = svc.page(1, 0x01).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x01, sub);
        assert_eq!(grid.cell(0, 8).glyph, Glyph::Char('H'));
        for col in 14..GRID_COLS {
            assert_eq!(grid.cell(0, col).glyph, Glyph::SPACE);
        }
        for row in 1..GRID_ROWS {
            for col in 0..GRID_COLS {
                assert_eq!(*grid.cell(row, col), Cell::default());
            }
        }
    }

    #[test]
    fn scenario_b_active_colour_propagates() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x20, 0, false, ""));
        // set active position row 3, then fg colour 2 at column 5
        feed(
            &mut svc,
            &enhancement_packet(26, 0, &[(43, 0x04, 0), (5, 0x00, 2)]),
        );
        let sub = svc.page(1, 0x20).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x20, sub);
        assert_eq!(grid.cell(3, 4).fg, 7);
        for col in 5..GRID_COLS {
            assert_eq!(grid.cell(3, col).fg, 2, "col {col}");
        }
        assert_eq!(grid.cell(4, 5).fg, 7);
    }

    #[test]
    fn active_colour_stops_at_level1_colour_codes() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x21, 0, false, ""));
        // row 3 has an alpha-yellow spacing attribute at column 10
        let mut codes = [0x20u8; 40];
        codes[10] = 0x03;
        let mut payload = [0u8; 40];
        for (i, slot) in payload.iter_mut().enumerate() {
            *slot = encode_odd_parity(codes[i]);
        }
        feed(&mut svc, &build_unit(DATA_UNIT_TELETEXT, 1, 3, &payload));
        feed(
            &mut svc,
            &enhancement_packet(26, 0, &[(43, 0x04, 0), (5, 0x00, 2)]),
        );
        let sub = svc.page(1, 0x21).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x21, sub);
        assert_eq!(grid.cell(3, 9).fg, 2);
        assert_eq!(grid.cell(3, 10).fg, 7);
        assert_eq!(grid.cell(3, 11).fg, 3);
    }

    #[test]
    fn termination_marker_nullifies_later_triplets() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x22, 0, false, ""));
        feed(
            &mut svc,
            &enhancement_packet(
                26,
                0,
                &[(43, 0x04, 0), (5, 0x00, 2), (63, 0x1F, 0), (8, 0x00, 4)],
            ),
        );
        let sub = svc.page(1, 0x22).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x22, sub);
        assert_eq!(grid.cell(3, 5).fg, 2);
        // the post-termination triplet must have no effect anywhere
        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                assert_ne!(grid.cell(row, col).fg, 4);
            }
        }
    }

    #[test]
    fn x26_writes_characters_over_level1() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x23, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_TELETEXT, 1, 2, "AAAA"));
        // G0 char 'Z' at row 2 col 1, and e-acute via diacritics at col 2
        feed(
            &mut svc,
            &enhancement_packet(
                26,
                0,
                &[(42, 0x04, 0), (1, 0x10, b'Z'), (2, 0x12, b'e')],
            ),
        );
        let sub = svc.page(1, 0x23).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x23, sub);
        assert_eq!(grid.cell(2, 0).glyph, Glyph::Char('A'));
        assert_eq!(grid.cell(2, 1).glyph, Glyph::Char('Z'));
        assert_eq!(grid.cell(2, 2).glyph, Glyph::Char('é'));
    }

    #[test]
    fn scenario_d_gpop_without_association_is_a_no_op() {
        let mut svc = TxtService::new();
        // a MOT exists but associates nothing with page 0x24
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0xFE, 0, false, ""));
        feed(&mut svc, &nibble_packet(2, &[0u8; 40]));
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x24, 0, false, ""));
        feed(
            &mut svc,
            &enhancement_packet(26, 0, &[(43, 0x04, 0), (56, 0x11, 0)]),
        );
        let sub = svc.page(1, 0x24).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x24, sub);
        for row in 1..GRID_ROWS {
            for col in 0..GRID_COLS {
                assert_eq!(*grid.cell(row, col), Cell::default());
            }
        }
    }

    /// Full GPOP resolution: MOT association, link record, pointer row,
    /// object run.
    #[test]
    fn gpop_object_invocation_draws_on_the_grid() {
        let mut svc = TxtService::new();

        // MOT: page 0x20 (32 decimal) -> row 2, pair 12; GPOP association
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0xFE, 0, false, ""));
        let mut assoc = [0u8; 40];
        assoc[24] = 0x8;
        feed(&mut svc, &nibble_packet(2, &assoc));
        // GPOP link: magazine 1, page 0x2F, descriptor 1 active/slot 0/
        // triplet 0/row 1
        let mut links = [0u8; 40];
        links[0] = 1; // magazine
        links[1] = 0x2; // page tens
        links[2] = 0xF; // page units
        links[3] = 1; // subpage count
        links[4] = 0x01; // active, pointer position 0
        links[5] = 0; // triplet offset
        links[6] = 1; // pointer row
        feed(&mut svc, &nibble_packet(19, &links));

        // the GPOP page: pointer row X/1 (function byte odd) whose first
        // pointer addresses triplet index 0 = line 3 offset 0
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x2F, 0, false, ""));
        let mut ptr_payload = [0u8; 40];
        ptr_payload[0] = encode_hamming_8_4_rev(1);
        ptr_payload[1..4].copy_from_slice(&encode_hamming_24_18(511 << 9));
        for i in 1..13 {
            ptr_payload[1 + i * 3..4 + i * 3]
                .copy_from_slice(&encode_hamming_24_18((511 << 9) | 511));
        }
        feed(&mut svc, &build_unit(DATA_UNIT_TELETEXT, 1, 1, &ptr_payload));
        // the object run on line 3: definition marker, char 'A' at col 2,
        // termination
        feed(
            &mut svc,
            &enhancement_packet(3, 0, &[(40, 0x15, 0), (2, 0x10, b'A')]),
        );

        // the display page invokes the object at row 5
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x20, 0, false, ""));
        feed(
            &mut svc,
            &enhancement_packet(26, 0, &[(45, 0x04, 0), (56, 0x11, 0)]),
        );

        let sub = svc.page(1, 0x20).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x20, sub);
        assert_eq!(grid.cell(5, 2).glyph, Glyph::Char('A'));
    }

    #[test]
    fn magazine_extension_selects_the_charset() {
        let mut svc = TxtService::new();
        // M/29/0 declaring charset designation 0x01 (German)
        let mut payload = [0u8; 40];
        payload[0] = encode_hamming_8_4_rev(0);
        let t0 = 0x01u32 << 7;
        payload[1..4].copy_from_slice(&encode_hamming_24_18(t0));
        for i in 1..13 {
            payload[1 + i * 3..4 + i * 3].copy_from_slice(&encode_hamming_24_18(0));
        }
        feed(&mut svc, &build_unit(DATA_UNIT_TELETEXT, 1, 29, &payload));

        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x25, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_TELETEXT, 1, 1, "\x5B"));
        let sub = svc.page(1, 0x25).unwrap().current_subpage().unwrap();
        let grid = svc.grid(1, 0x25, sub);
        assert_eq!(grid.cell(1, 0).glyph, Glyph::Char('Ä'));
    }

    #[test]
    fn time_filling_header_clears_the_cursor() {
        let mut svc = TxtService::new();
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0x10, 0, false, ""));
        feed(&mut svc, &build_header(DATA_UNIT_TELETEXT, 1, 0xFF, 0, false, ""));
        feed(&mut svc, &build_row(DATA_UNIT_TELETEXT, 1, 3, "LOST"));
        let page = svc.page(1, 0x10).unwrap();
        assert!(page.current_subpage().unwrap().line(3).is_none());
        assert!(svc.page(1, 0xFF).is_none());
    }
}
