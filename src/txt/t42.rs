//! `.t42` export: 42 bytes per stored line, in the community bit order.

use std::io::Write;

use super::service::Page;
use super::subpage::SubPage;

/// Writes a subpage's stored lines: header first, then display rows,
/// then the X/26..X/28 enhancement packets in designation order.
pub fn write_subpage<W: Write>(sub: &SubPage, out: &mut W) -> std::io::Result<()> {
    for line in sub.stored_lines() {
        out.write_all(&line.t42_bytes())?;
    }
    Ok(())
}

/// Writes every subpage of a page, keyed subpages before subtitle
/// versions.
pub fn write_page<W: Write>(page: &Page, out: &mut W) -> std::io::Result<()> {
    for sub in page.subpages() {
        write_subpage(sub, out)?;
    }
    for sub in page.subtitle_versions() {
        write_subpage(sub, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATA_UNIT_TELETEXT;
    use crate::txt::TxtService;
    use crate::txt::coding::REVERSE_BITS;
    use crate::txt::line::testutil::{build_header, build_row};

    #[test]
    fn t42_stream_is_42_bytes_per_line_in_reversed_bit_order() {
        let mut svc = TxtService::new();
        let header = build_header(DATA_UNIT_TELETEXT, 1, 0x50, 0, false, "HDR");
        let row = build_row(DATA_UNIT_TELETEXT, 1, 1, "BODY");
        svc.add_data_unit(&header, None);
        svc.add_data_unit(&row, None);

        let sub = svc.page(1, 0x50).unwrap().current_subpage().unwrap();
        let mut out = Vec::new();
        write_subpage(sub, &mut out).unwrap();
        assert_eq!(out.len(), 84);
        for (i, &b) in out[..42].iter().enumerate() {
            assert_eq!(b, REVERSE_BITS[header[4 + i] as usize]);
        }
        for (i, &b) in out[42..].iter().enumerate() {
            assert_eq!(b, REVERSE_BITS[row[4 + i] as usize]);
        }
    }
}
