//! PES assembly and EBU data unit extraction (EN 301 775).
//!
//! Teletext PES packets arrive on private_stream_1 with a data identifier
//! in 0x10..=0x1F followed by fixed 46-byte data units.

use bytes::{Bytes, BytesMut};
use std::collections::HashMap;

use crate::constants::{
    DATA_UNIT_INVERTED, DATA_UNIT_LEN, DATA_UNIT_OTHER, DATA_UNIT_STUFFING, DATA_UNIT_SUBTITLE,
    DATA_UNIT_TELETEXT, PES_START_CODE, PES_STREAM_ID_PRIVATE_1,
};

/// Accumulates TS payloads per PID until the next payload_unit_start
/// completes a PES packet.
#[derive(Default)]
pub struct PesAssembler {
    buffers: HashMap<u16, BytesMut>,
}

impl PesAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one TS payload; returns the previously accumulated PES packet
    /// when this payload starts a new one.
    pub fn push(&mut self, pid: u16, payload_unit_start: bool, payload: &[u8]) -> Option<Bytes> {
        let buffer = self.buffers.entry(pid).or_default();
        if payload_unit_start {
            let complete = if buffer.is_empty() { None } else { Some(buffer.split().freeze()) };
            buffer.extend_from_slice(payload);
            complete
        } else {
            if !buffer.is_empty() {
                buffer.extend_from_slice(payload);
            }
            None
        }
    }

    /// Flushes any partial packet still buffered for a PID (end of input).
    pub fn flush(&mut self, pid: u16) -> Option<Bytes> {
        let buffer = self.buffers.get_mut(&pid)?;
        if buffer.is_empty() { None } else { Some(buffer.split().freeze()) }
    }

    pub fn pids(&self) -> Vec<u16> {
        self.buffers.keys().copied().collect()
    }
}

/// One extracted teletext data unit: the raw 46 bytes plus the PES PTS.
pub struct DataUnit<'a> {
    pub unit: &'a [u8],
    pub pts: Option<u64>,
}

/// Extracts the 33-bit PTS from a PES header when flagged present.
pub fn parse_pts(pes: &[u8]) -> Option<u64> {
    if pes.len() < 14 {
        return None;
    }
    let pts_dts_flags = (pes[7] & 0xC0) >> 6;
    if pts_dts_flags & 0b10 == 0 {
        return None;
    }
    let p = &pes[9..14];
    Some(
        ((p[0] as u64 & 0x0E) << 29)
            | ((p[1] as u64) << 22)
            | (((p[2] as u64 & 0xFE) >> 1) << 15)
            | ((p[3] as u64) << 7)
            | ((p[4] as u64) >> 1),
    )
}

/// Walks the data units of a teletext PES packet. Non-teletext packets
/// and unknown data unit ids yield nothing; stuffing is skipped.
pub fn teletext_data_units(pes: &[u8]) -> Vec<DataUnit<'_>> {
    let mut out = Vec::new();
    if pes.len() < 9 || pes[..3] != PES_START_CODE {
        return out;
    }
    if pes[3] != PES_STREAM_ID_PRIVATE_1 {
        return out;
    }
    let header_len = 9 + pes[8] as usize;
    if header_len >= pes.len() {
        return out;
    }
    let pts = parse_pts(pes);
    let payload = &pes[header_len..];
    if payload.is_empty() || !(0x10..=0x1F).contains(&payload[0]) {
        return out; // not EBU data
    }

    let mut idx = 1;
    while idx + 2 <= payload.len() {
        let unit_id = payload[idx];
        let len = payload[idx + 1] as usize;
        let total = 2 + len;
        if idx + total > payload.len() {
            break;
        }
        match unit_id {
            DATA_UNIT_TELETEXT | DATA_UNIT_SUBTITLE | DATA_UNIT_INVERTED | DATA_UNIT_OTHER
                if total >= DATA_UNIT_LEN =>
            {
                out.push(DataUnit { unit: &payload[idx..idx + DATA_UNIT_LEN], pts });
            }
            DATA_UNIT_STUFFING => {}
            _ => {}
        }
        idx += total;
    }
    out
}


#[cfg(test)]
mod tests {
    use super::testutil::build_pes;
    use super::*;
    use crate::constants::DATA_UNIT_TELETEXT;
    use crate::txt::line::testutil::build_row;

    #[test]
    fn assembler_completes_on_next_unit_start() {
        let mut asm = PesAssembler::new();
        assert!(asm.push(0x100, true, &[1, 2, 3]).is_none());
        assert!(asm.push(0x100, false, &[4, 5]).is_none());
        let complete = asm.push(0x100, true, &[9]).unwrap();
        assert_eq!(&complete[..], &[1, 2, 3, 4, 5]);
        assert_eq!(&asm.flush(0x100).unwrap()[..], &[9]);
    }

    #[test]
    fn payload_before_first_unit_start_is_dropped() {
        let mut asm = PesAssembler::new();
        assert!(asm.push(0x100, false, &[1, 2]).is_none());
        assert!(asm.flush(0x100).is_none());
    }

    #[test]
    fn extracts_units_and_pts() {
        let unit = build_row(DATA_UNIT_TELETEXT, 1, 5, "TEXT");
        let pes = build_pes(Some(0x1_2345_6789 & 0x1_FFFF_FFFF), &[&unit]);
        let units = teletext_data_units(&pes);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit, &unit[..]);
        assert_eq!(units[0].pts, Some(0x1_2345_6789 & 0x1_FFFF_FFFF));
    }

    #[test]
    fn stuffing_units_are_skipped() {
        let unit = build_row(DATA_UNIT_TELETEXT, 1, 5, "TEXT");
        let stuffing = vec![0xFFu8; 46];
        let mut stuffing_unit = stuffing.clone();
        stuffing_unit[1] = 0x2C;
        let pes = build_pes(None, &[&stuffing_unit, &unit]);
        let units = teletext_data_units(&pes);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].pts, None);
    }

    #[test]
    fn non_private_streams_yield_nothing() {
        let mut pes = build_pes(None, &[]);
        pes[3] = 0xE0;
        assert!(teletext_data_units(&pes).is_empty());
    }
}
