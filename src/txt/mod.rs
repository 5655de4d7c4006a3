//! EBU EN 300 706 teletext decoding and page assembly.
//!
//! The entry point is [`TxtService`]: feed it raw data units in arrival
//! order (`add_data_unit`), then query pages, rendered bitmaps, the report
//! tree or `.t42` dumps. Queries are pure reads over current state and are
//! recomputed on every call.

pub mod charset;
pub mod coding;
pub mod drcs;
pub mod enhance;
pub mod font;
pub mod line;
pub mod mot;
pub mod render;
pub mod service;
pub mod subpage;
pub mod t42;
pub mod triplet;
pub mod x30;

pub use line::TxtDataField;
pub use render::PageImage;
pub use service::{Magazine, Page, TxtService};
pub use subpage::{Cell, Glyph, Grid, SubPage};
pub use triplet::Triplet;

use thiserror::Error;

/// Failures on the export surface. Decoding itself never fails; corrupted
/// input degrades to sentinel values and blank cells.
#[derive(Debug, Error)]
pub enum TxtError {
    #[error("no such page {magazine}/{page:02X}")]
    PageMissing { magazine: u8, page: u8 },
    #[error("image encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
