//! Trimmed PSI layer: PAT and PMT, just enough to locate the teletext
//! elementary streams of a transport stream.

mod pat;
mod pmt;
pub(crate) mod section;

pub use pat::{PatEntry, PatSection, parse_pat};
pub use pmt::{PmtSection, StreamInfo, TeletextDescriptor, parse_pmt};
