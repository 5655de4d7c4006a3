//! Generic PSI section framing with CRC-32/MPEG-2 validation.

use crc::{Crc, CRC_32_MPEG_2};

const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// A validated PSI section: header fields plus the body without the
/// section header and CRC.
pub struct Section<'a> {
    pub table_id: u8,
    pub version: u8,
    pub current_next: bool,
    pub table_id_extension: u16,
    pub body: &'a [u8],
}

impl<'a> Section<'a> {
    pub fn new(payload: &'a [u8]) -> anyhow::Result<Self> {
        if payload.is_empty() {
            anyhow::bail!("no payload");
        }
        let pointer = payload[0] as usize;
        let start = 1 + pointer;
        if payload.len() < start + 8 {
            anyhow::bail!("short section");
        }

        let table_id = payload[start];
        let section_len = ((payload[start + 1] & 0x0F) as usize) << 8 | payload[start + 2] as usize;
        let end = start + 3 + section_len;
        if end > payload.len() {
            anyhow::bail!("truncated section");
        }

        let calc = CRC.checksum(&payload[start..end - 4]);
        let crc = u32::from_be_bytes(payload[end - 4..end].try_into()?);
        if calc != crc {
            anyhow::bail!("CRC mismatch");
        }

        Ok(Self {
            table_id,
            version: (payload[start + 5] & 0x3E) >> 1,
            current_next: payload[start + 5] & 0x01 != 0,
            table_id_extension: u16::from_be_bytes(payload[start + 3..start + 5].try_into()?),
            body: &payload[start + 8..end - 4],
        })
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::CRC;

    /// Wraps a table body into a pointer-prefixed section with a valid CRC.
    pub fn build_section(table_id: u8, table_id_extension: u16, body: &[u8]) -> Vec<u8> {
        let section_len = 5 + body.len() + 4;
        let mut out = vec![0u8]; // pointer field
        out.push(table_id);
        out.push(0xB0 | ((section_len >> 8) as u8 & 0x0F));
        out.push(section_len as u8);
        out.extend_from_slice(&table_id_extension.to_be_bytes());
        out.push(0xC1); // version 0, current
        out.push(0); // section number
        out.push(0); // last section number
        out.extend_from_slice(body);
        let crc = CRC.checksum(&out[1..]);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }
}
