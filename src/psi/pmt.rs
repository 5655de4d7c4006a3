//! Program Map Table, with the ES descriptor scan that locates teletext
//! streams (teletext descriptor 0x56 / VBI teletext descriptor 0x46).

use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::constants::{DESC_TELETEXT, DESC_VBI_TELETEXT};

use super::section::Section;

#[derive(Clone, Debug)]
pub struct PmtSection {
    pub version: u8,
    pub program_number: u16,
    pub pcr_pid: u16,
    pub streams: Vec<StreamInfo>,
}

#[derive(Clone, Debug)]
pub struct StreamInfo {
    pub stream_type: u8,
    pub elementary_pid: u16,
    pub teletext: Vec<TeletextDescriptor>,
}

/// One entry of a teletext/VBI-teletext descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeletextDescriptor {
    pub language: [u8; 3],
    /// 1 = initial page, 2 = subtitles, 5 = hearing impaired subtitles
    pub teletext_type: u8,
    pub magazine: u8,
    pub page: u8,
}

impl TeletextDescriptor {
    pub fn language_str(&self) -> String {
        self.language.iter().map(|&b| b as char).collect()
    }
}

pub fn parse_pmt(payload: &[u8]) -> anyhow::Result<PmtSection> {
    let sec = Section::new(payload)?;
    if sec.table_id != 0x02 {
        anyhow::bail!("not PMT");
    }
    let b = sec.body;
    if b.len() < 4 {
        anyhow::bail!("short PMT body");
    }

    let pcr_pid = ((b[0] & 0x1F) as u16) << 8 | b[1] as u16;
    let prog_info_len = ((b[2] & 0x0F) as usize) << 8 | b[3] as usize;
    let mut idx = 4 + prog_info_len;

    let mut streams = Vec::new();
    while idx + 5 <= b.len() {
        let stype = b[idx];
        let pid = ((b[idx + 1] & 0x1F) as u16) << 8 | b[idx + 2] as u16;
        let eslen = ((b[idx + 3] & 0x0F) as usize) << 8 | b[idx + 4] as usize;
        idx += 5;
        let desc_end = (idx + eslen).min(b.len());
        let teletext = parse_es_descriptors(&b[idx..desc_end]);
        streams.push(StreamInfo { stream_type: stype, elementary_pid: pid, teletext });
        idx = desc_end;
    }

    Ok(PmtSection {
        version: sec.version,
        program_number: sec.table_id_extension,
        pcr_pid,
        streams,
    })
}

fn parse_es_descriptors(mut descriptors: &[u8]) -> Vec<TeletextDescriptor> {
    let mut out = Vec::new();
    while descriptors.len() >= 2 {
        let tag = descriptors[0];
        let len = descriptors[1] as usize;
        if descriptors.len() < 2 + len {
            break;
        }
        if tag == DESC_TELETEXT || tag == DESC_VBI_TELETEXT {
            out.extend(parse_teletext_descriptor(&descriptors[2..2 + len]));
        }
        descriptors = &descriptors[2 + len..];
    }
    out
}

/// Five bytes per entry: ISO 639 language, 5-bit type, 3-bit magazine,
/// page number as a hex digit pair.
fn parse_teletext_descriptor(data: &[u8]) -> Vec<TeletextDescriptor> {
    let mut out = Vec::new();
    for entry in data.chunks_exact(5) {
        let mut br = BitReader::endian(entry, BigEndian);
        let parsed: Option<TeletextDescriptor> = (|| {
            let mut language = [0u8; 3];
            for l in language.iter_mut() {
                *l = br.read::<8, u8>().ok()?;
            }
            let teletext_type = br.read::<5, u8>().ok()?;
            let magazine = br.read::<3, u8>().ok()?;
            let page = br.read::<8, u8>().ok()?;
            Some(TeletextDescriptor { language, teletext_type, magazine, page })
        })();
        if let Some(d) = parsed {
            out.push(d);
        }
    }
    out
}
