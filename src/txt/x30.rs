//! Broadcast service data packets (8/30 formats 1 and 2).
//!
//! Format 1 carries the initial page, network id, time offset and the
//! 20-character status display. Format 2 carries PDC programme labels.
//! PDC fields use the standard-order Hamming 8/4 convention, unlike the
//! bit-mirrored magazine/page/control fields.

use super::coding::{REVERSE_BITS, UNCORRECTABLE, hamming_8_4, hamming_8_4_rev, parity_strip};
use super::line::TxtDataField;

/// Decoded 8/30 format 1 fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastServiceData {
    pub designation: u8,
    pub initial_page: u8,
    pub initial_magazine: u8,
    pub initial_subpage: u16,
    pub network_id: u16,
    pub status_display: String,
}

/// Decoded 8/30 format 2 PDC label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdcLabel {
    pub label_channel: u8,
    pub country: u8,
    pub network: u8,
    pub day: u8,
    pub month: u8,
    pub hour: u8,
    pub minute: u8,
}

fn initial_page_fields(payload: &[u8]) -> (u8, u8, u16) {
    let units = hamming_8_4_rev(payload[1]) & 0x0F;
    let tens = hamming_8_4_rev(payload[2]) & 0x0F;
    let s1 = (hamming_8_4_rev(payload[3]) & 0x0F) as u16;
    let n4 = hamming_8_4_rev(payload[4]);
    let s3 = (hamming_8_4_rev(payload[5]) & 0x0F) as u16;
    let n6 = hamming_8_4_rev(payload[6]);
    let subpage = s1 | (((n4 & 0x07) as u16) << 4) | (s3 << 7) | (((n6 & 0x03) as u16) << 11);
    // magazine bits ride in the spare subpage bits
    let magazine = ((n4 >> 3) & 0x01) | ((n6 >> 2) & 0x03) << 1;
    let page = (tens << 4) | units;
    (page, magazine, subpage)
}

/// Decodes an 8/30 format 1 packet (designation 0 or 1).
pub fn broadcast_service_data(line: &TxtDataField) -> Option<BroadcastServiceData> {
    if line.packet_no() != 30 {
        return None;
    }
    let designation = line.designation();
    if designation > 1 {
        return None;
    }
    let payload = line.payload();
    let (initial_page, initial_magazine, initial_subpage) = initial_page_fields(payload);
    let network_id = ((REVERSE_BITS[payload[7] as usize] as u16) << 8)
        | REVERSE_BITS[payload[8] as usize] as u16;
    let status_display: String =
        payload[20..40].iter().map(|&b| parity_strip(b) as char).collect();
    Some(BroadcastServiceData {
        designation,
        initial_page,
        initial_magazine,
        initial_subpage,
        network_id,
        status_display,
    })
}

/// Decodes an 8/30 format 2 packet (designation 2 or 3) into its PDC
/// label. These nibbles use the standard Hamming bit order.
pub fn pdc_label(line: &TxtDataField) -> Option<PdcLabel> {
    if line.packet_no() != 30 || !(2..=3).contains(&line.designation()) {
        return None;
    }
    let payload = line.payload();
    let n: Vec<u8> = payload[9..22].iter().map(|&b| hamming_8_4(b)).collect();
    if n.iter().any(|&v| v == UNCORRECTABLE) {
        return None; // unreadable label: consumers show nothing
    }
    Some(PdcLabel {
        label_channel: n[0] & 0x03,
        country: (n[1] << 4) | n[2],
        network: (n[3] << 4) | n[4],
        day: (n[5] << 1) | (n[6] >> 3),
        month: ((n[6] & 0x07) << 1) | (n[7] >> 3),
        hour: ((n[7] & 0x07) << 2) | (n[8] >> 2),
        minute: ((n[8] & 0x03) << 4) | n[9],
    })
}
