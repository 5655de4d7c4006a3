//! TS packet processing: PAT/PMT tracking, teletext PID selection and
//! PES hand-off into the teletext service.

use std::collections::HashMap;

use log::{debug, info};

use crate::constants::{STREAM_TYPE_PRIVATE_PES, TS_PACKET_SIZE, TS_SYNC_BYTE};
use crate::pes::{PesAssembler, teletext_data_units};
use crate::psi::{PatSection, PmtSection, TeletextDescriptor, parse_pat, parse_pmt};
use crate::txt::TxtService;

/// What the PMT told us about one teletext elementary stream.
#[derive(Clone, Debug)]
pub struct TeletextStream {
    pub program_number: u16,
    pub descriptors: Vec<TeletextDescriptor>,
    pub pes_packets: u64,
    pub data_units: u64,
}

pub struct PacketProcessor {
    pub pat_map: HashMap<u16, PatSection>,
    pub pmt_map: HashMap<u16, PmtSection>,
    pub teletext_pids: HashMap<u16, TeletextStream>,
    pes: PesAssembler,
    pub service: TxtService,
}

impl PacketProcessor {
    pub fn new() -> Self {
        Self {
            pat_map: HashMap::new(),
            pmt_map: HashMap::new(),
            teletext_pids: HashMap::new(),
            pes: PesAssembler::new(),
            service: TxtService::new(),
        }
    }

    /// Process a single TS packet.
    pub fn process_packet(&mut self, chunk: &[u8]) {
        if chunk.len() < TS_PACKET_SIZE || chunk[0] != TS_SYNC_BYTE {
            return;
        }

        let pid = (((chunk[1] & 0x1F) as u16) << 8) | (chunk[2] as u16);
        let payload_unit_start = chunk[1] & 0x40 != 0;
        let adaption_field_ctrl = (chunk[3] & 0x30) >> 4;
        let mut payload_offset = 4usize;

        if adaption_field_ctrl == 2 || adaption_field_ctrl == 0 {
            return; // no payload
        }
        if adaption_field_ctrl == 3 {
            let adap_len = chunk[4] as usize;
            payload_offset += 1 + adap_len;
            if payload_offset >= TS_PACKET_SIZE {
                return;
            }
        }
        let payload = &chunk[payload_offset..];

        // PAT
        if pid == 0x0000 && payload_unit_start {
            if let Ok(pat) = parse_pat(payload) {
                for entry in &pat.programs {
                    self.pat_map.insert(entry.program_number, pat.clone());
                }
            }
            return;
        }

        // PMT
        if payload_unit_start
            && self.pat_map.values().any(|p| p.programs.iter().any(|e| e.pmt_pid == pid))
        {
            match parse_pmt(payload) {
                Ok(pmt) => {
                    self.register_teletext_streams(&pmt);
                    self.pmt_map.insert(pid, pmt);
                }
                Err(e) => debug!("PMT on PID {pid:#06X} rejected: {e}"),
            }
            // a PMT PID cannot also carry teletext
            return;
        }

        // teletext PES
        if self.teletext_pids.contains_key(&pid)
            && let Some(pes) = self.pes.push(pid, payload_unit_start, payload)
        {
            self.feed_pes(pid, &pes);
        }
    }

    fn register_teletext_streams(&mut self, pmt: &PmtSection) {
        for stream in &pmt.streams {
            if stream.stream_type != STREAM_TYPE_PRIVATE_PES || stream.teletext.is_empty() {
                continue;
            }
            self.teletext_pids.entry(stream.elementary_pid).or_insert_with(|| {
                info!(
                    "teletext stream on PID {:#06X} ({})",
                    stream.elementary_pid,
                    stream
                        .teletext
                        .iter()
                        .map(|d| d.language_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                TeletextStream {
                    program_number: pmt.program_number,
                    descriptors: stream.teletext.clone(),
                    pes_packets: 0,
                    data_units: 0,
                }
            });
        }
    }

    fn feed_pes(&mut self, pid: u16, pes: &[u8]) {
        let units = teletext_data_units(pes);
        if let Some(stream) = self.teletext_pids.get_mut(&pid) {
            stream.pes_packets += 1;
            stream.data_units += units.len() as u64;
        }
        for du in units {
            self.service.add_data_unit(du.unit, du.pts);
        }
    }

    /// Completes any PES packet still buffered at end of input.
    pub fn finish(&mut self) {
        let pids: Vec<u16> = self.pes.pids();
        for pid in pids {
            if !self.teletext_pids.contains_key(&pid) {
                continue;
            }
            if let Some(pes) = self.pes.flush(pid) {
                self.feed_pes(pid, &pes);
            }
        }
    }
}

impl Default for PacketProcessor {
    fn default() -> Self {
        Self::new()
    }
}
