// src/lib.rs
pub mod inspector {
    use std::net::SocketAddr;
    use std::path::PathBuf;

    pub struct Options {
        /// UDP source; mutually exclusive with `input`.
        pub addr: Option<SocketAddr>,
        /// Recorded transport stream file.
        pub input: Option<PathBuf>,
        pub refresh_secs: u64,
        /// Where to write rendered page PNGs.
        pub pages_dir: Option<PathBuf>,
        /// Where to write `.t42` line dumps.
        pub t42_dir: Option<PathBuf>,
        pub magazine: Option<u8>,
        pub page: Option<u8>,
    }

    /// Async entry-point; returns at end of file input, or runs until
    /// stopped for UDP input.
    pub async fn run(opts: Options) -> anyhow::Result<()> {
        crate::core::run(opts).await
    }
}

pub mod constants;
pub mod pes;
pub mod processor;
pub mod psi;
pub mod report;
pub mod txt;

mod core;
