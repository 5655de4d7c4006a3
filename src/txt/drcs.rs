//! Downloadable character set (DRCS) decoding.
//!
//! A DRCS page's X/28/3 packet declares a 4-bit downloading mode for each
//! of the 48 character slots; mode 0 characters are 12×10 1bpp rasters
//! carried on the paired display rows. Other modes are an acknowledged
//! gap: they are logged and render nothing.

use log::warn;

use super::coding::REVERSE_BITS;
use super::font::{GLYPH_HEIGHT, GlyphRaster};
use super::subpage::SubPage;

/// Unpacks the 48 downloading-mode nibbles from triplets 2..=12 of the
/// X/28/3 packet, accumulating the 18-bit values LSB-first and assembling
/// each nibble in reverse bit order.
pub fn modes(sub: &SubPage) -> Option<[u8; 48]> {
    let packet = sub.x28(3)?;
    let triplets = packet.triplets();
    if triplets.len() < 13 {
        return None;
    }
    let mut bits = Vec::with_capacity(11 * 18);
    for t in &triplets[2..13] {
        let v = t.value();
        for i in 0..18 {
            bits.push(((v >> i) & 1) as u8);
        }
    }
    let mut out = [0u8; 48];
    for (slot, mode) in out.iter_mut().enumerate() {
        let off = slot * 4;
        *mode = (bits[off] << 3) | (bits[off + 1] << 2) | (bits[off + 2] << 1) | bits[off + 3];
    }
    Some(out)
}

/// Repacks 6-bit pattern groups into a byte stream (6+2, 4+4, 2+6).
fn repack(sixes: &[u8; 20]) -> [u8; 15] {
    let mut out = [0u8; 15];
    let mut o = 0;
    for chunk in sixes.chunks_exact(4) {
        out[o] = (chunk[0] << 2) | (chunk[1] >> 4);
        out[o + 1] = ((chunk[1] & 0x0F) << 4) | (chunk[2] >> 2);
        out[o + 2] = ((chunk[2] & 0x03) << 6) | chunk[3];
        o += 3;
    }
    out
}

/// Decodes one DRCS glyph raster. Slot pairs share a display row: even
/// slots take bytes 0..20, odd slots bytes 20..40. Only mode 0 decodes;
/// any other declared mode returns `None` after logging the gap.
pub fn glyph(sub: &SubPage, slot: usize) -> Option<GlyphRaster> {
    if slot >= 48 {
        return None;
    }
    let mode = modes(sub)?[slot];
    if mode != 0 {
        warn!("DRCS downloading mode {mode} not implemented (slot {slot})");
        return None;
    }
    let row = 1 + (slot / 2) as u8;
    let line = sub.line(row)?;
    let payload = line.payload();
    let base = if slot % 2 == 0 { 0 } else { 20 };

    let mut sixes = [0u8; 20];
    for (i, six) in sixes.iter_mut().enumerate() {
        *six = REVERSE_BITS[payload[base + i] as usize] & 0x3F;
    }
    let packed = repack(&sixes);

    let mut raster = [0u16; GLYPH_HEIGHT];
    for (y, out_row) in raster.iter_mut().enumerate() {
        for x in 0..12 {
            let bit_index = y * 12 + x;
            let bit = (packed[bit_index / 8] >> (7 - bit_index % 8)) & 1;
            if bit != 0 {
                *out_row |= 1 << (11 - x);
            }
        }
    }
    Some(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATA_UNIT_TELETEXT;
    use crate::txt::coding::{encode_hamming_8_4_rev, encode_hamming_24_18};
    use crate::txt::line::TxtDataField;
    use crate::txt::line::testutil::{build_header, build_unit};

    /// Builds a DRCS subpage whose X/28/3 packet declares the given modes
    /// and whose display row 1 carries `pattern` bytes.
    fn drcs_subpage(mode_nibbles: &[u8; 48], pattern: &[u8; 40]) -> SubPage {
        let mut sub = SubPage::new(0);
        let header = build_header(DATA_UNIT_TELETEXT, 2, 0x40, 0, false, "");
        sub.set_header(TxtDataField::new(&header, None).unwrap());

        // pack the 48 nibbles into the triplet bit stream, inverse of modes()
        let mut bits = vec![0u8; 11 * 18];
        for (slot, &mode) in mode_nibbles.iter().enumerate() {
            let off = slot * 4;
            bits[off] = (mode >> 3) & 1;
            bits[off + 1] = (mode >> 2) & 1;
            bits[off + 2] = (mode >> 1) & 1;
            bits[off + 3] = mode & 1;
        }
        let mut payload = [0u8; 40];
        payload[0] = encode_hamming_8_4_rev(3);
        for t in 0..13usize {
            let mut value = 0u32;
            if t >= 2 {
                for i in 0..18 {
                    value |= (bits[(t - 2) * 18 + i] as u32) << i;
                }
            }
            payload[1 + t * 3..4 + t * 3].copy_from_slice(&encode_hamming_24_18(value));
        }
        let unit = build_unit(DATA_UNIT_TELETEXT, 2, 28, &payload);
        sub.add_line(TxtDataField::new(&unit, None).unwrap());

        let unit = build_unit(DATA_UNIT_TELETEXT, 2, 1, pattern);
        sub.add_line(TxtDataField::new(&unit, None).unwrap());
        sub
    }

    /// Reference decode: slice the mode nibble of `slot` directly out of
    /// the triplet values without the shared accumulator.
    fn reference_mode(sub: &SubPage, slot: usize) -> u8 {
        let triplets = sub.x28(3).unwrap().triplets();
        let mut nibble = 0u8;
        for i in 0..4 {
            let abs = slot * 4 + i;
            let t = 2 + abs / 18;
            let bit = (triplets[t].value() >> (abs % 18)) & 1;
            nibble |= (bit as u8) << (3 - i);
        }
        nibble
    }

    #[test]
    fn accumulator_matches_reference_decode() {
        let mut declared = [0u8; 48];
        for (i, m) in declared.iter_mut().enumerate() {
            *m = (i as u8 * 5 + 3) & 0x0F;
        }
        let sub = drcs_subpage(&declared, &[0u8; 40]);
        let unpacked = modes(&sub).unwrap();
        assert_eq!(unpacked, declared);
        for slot in 0..48 {
            assert_eq!(unpacked[slot], reference_mode(&sub, slot), "slot {slot}");
        }
    }

    #[test]
    fn all_zero_pattern_gives_uniform_raster() {
        // first 20 bytes of row 1 all 0x00 -> glyph 0 is uniformly clear
        let sub = drcs_subpage(&[0u8; 48], &[0u8; 40]);
        let raster = glyph(&sub, 0).unwrap();
        assert_eq!(raster, [0u16; GLYPH_HEIGHT]);
    }

    #[test]
    fn set_bits_reach_the_raster() {
        let mut pattern = [0u8; 40];
        // first 6-bit group all ones: leftmost 6 pixels of row 0
        pattern[0] = REVERSE_BITS[0x3F];
        let sub = drcs_subpage(&[0u8; 48], &pattern);
        let raster = glyph(&sub, 0).unwrap();
        assert_eq!(raster[0], 0b1111_1100_0000);
        assert_eq!(raster[1], 0);
    }

    #[test]
    fn odd_slot_reads_the_second_half() {
        let mut pattern = [0u8; 40];
        pattern[20] = REVERSE_BITS[0x3F];
        let sub = drcs_subpage(&[0u8; 48], &pattern);
        assert_eq!(glyph(&sub, 0).unwrap(), [0u16; GLYPH_HEIGHT]);
        assert_eq!(glyph(&sub, 1).unwrap()[0], 0b1111_1100_0000);
    }

    #[test]
    fn non_zero_mode_is_an_acknowledged_gap() {
        let mut declared = [0u8; 48];
        declared[0] = 1;
        let sub = drcs_subpage(&declared, &[0u8; 40]);
        assert!(glyph(&sub, 0).is_none());
        assert!(glyph(&sub, 1).is_some());
    }
}
