//! Constants for MPEG-TS ingest and EBU EN 300 706 teletext processing

/// MPEG-TS packet constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;

/// PES packet constants
pub const PES_START_CODE: [u8; 3] = [0x00, 0x00, 0x01];
pub const PES_STREAM_ID_PRIVATE_1: u8 = 0xBD;

/// PMT stream/descriptor tags that carry teletext
pub const STREAM_TYPE_PRIVATE_PES: u8 = 0x06;
pub const DESC_VBI_TELETEXT: u8 = 0x46;
pub const DESC_TELETEXT: u8 = 0x56;

/// EN 301 775 data unit ids
pub const DATA_UNIT_TELETEXT: u8 = 0x02;      // EBU teletext non-subtitle
pub const DATA_UNIT_SUBTITLE: u8 = 0x03;      // EBU teletext subtitle
pub const DATA_UNIT_INVERTED: u8 = 0xC0;      // inverted teletext
pub const DATA_UNIT_OTHER: u8 = 0xC1;
pub const DATA_UNIT_STUFFING: u8 = 0xFF;

/// Fixed data unit sizes: 44-byte data field, 46 bytes with id + length
pub const DATA_FIELD_LEN: usize = 44;
pub const DATA_UNIT_LEN: usize = 46;

/// Magazine-local lookup pages
pub const MOT_PAGE: u8 = 0xFE; // Magazine Organization Table
pub const MIP_PAGE: u8 = 0xFD; // Magazine Inventory Page

/// Display grid geometry
pub const GRID_ROWS: usize = 25;
pub const GRID_COLS: usize = 40;
pub const CELL_WIDTH: usize = 15;
pub const CELL_HEIGHT: usize = 19;

/// Cross-page object resolution is depth-guarded; malformed MOT/POP data
/// may cycle, so resolution gives up past this many nested invocations.
pub const MAX_OBJECT_DEPTH: u8 = 8;

/// 90 kHz PTS clock
pub const PTS_CLOCK_HZ: u64 = 90_000;
