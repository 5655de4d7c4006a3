use clap::Parser;
use teletext_inspector::inspector::{Options, run};

#[derive(Parser)]
struct Opt {
    /// UDP socket to bind + listen (IPv4)
    #[clap(long, conflicts_with = "input")]
    addr: Option<String>,

    /// Recorded transport stream file
    #[clap(long)]
    input: Option<std::path::PathBuf>,

    /// Refresh interval for the JSON snapshot (UDP mode)
    #[clap(long, default_value_t = 2)]
    refresh: u64,

    /// Directory for rendered page PNGs
    #[clap(long)]
    pages_dir: Option<std::path::PathBuf>,

    /// Directory for .t42 line dumps
    #[clap(long)]
    t42_dir: Option<std::path::PathBuf>,

    /// Only dump this magazine (1-8)
    #[clap(long)]
    magazine: Option<u8>,

    /// Only dump this page number (hex digit pair, e.g. 0x64)
    #[clap(long)]
    page: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let page = opt
        .page
        .map(|p| u8::from_str_radix(p.trim_start_matches("0x"), 16))
        .transpose()?;

    run(Options {
        addr: opt.addr.map(|a| a.parse()).transpose()?,
        input: opt.input,
        refresh_secs: opt.refresh,
        pages_dir: opt.pages_dir,
        t42_dir: opt.t42_dir,
        magazine: opt.magazine,
        page,
    })
    .await
}
