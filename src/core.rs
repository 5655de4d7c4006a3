//! Ingest loop: UDP multicast/unicast or a recorded `.ts` file, driving
//! the packet processor and writing the requested outputs.

use std::fs;
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::{Duration, Instant};

use log::{info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::constants::TS_PACKET_SIZE;
use crate::inspector::Options;
use crate::processor::PacketProcessor;
use crate::report::Reporter;
use crate::txt::t42;

pub async fn run(opts: Options) -> anyhow::Result<()> {
    let mut processor = PacketProcessor::new();

    if let Some(path) = &opts.input {
        run_file(&mut processor, path)?;
        processor.finish();
        finish_outputs(&processor, &opts)?;
        return Ok(());
    }

    let Some(addr) = opts.addr else {
        anyhow::bail!("either --input or --addr is required");
    };
    let socket = create_udp_socket(addr)?;
    let sock = UdpSocket::from_std(socket.into())?;

    let mut buf = [0u8; 2048];
    let mut last_print = Instant::now();
    loop {
        let n = sock.recv(&mut buf).await?;
        for chunk in buf[..n].chunks_exact(TS_PACKET_SIZE) {
            processor.process_packet(chunk);
        }

        if last_print.elapsed() >= Duration::from_secs(opts.refresh_secs) {
            println!("{}", Reporter::generate_json_report(&processor));
            if let Err(e) = dump_pages(&processor, &opts) {
                warn!("page dump failed: {e}");
            }
            last_print = Instant::now();
        }
    }
}

fn run_file(processor: &mut PacketProcessor, path: &Path) -> anyhow::Result<()> {
    let mut file = fs::File::open(path)?;
    let mut buf = vec![0u8; TS_PACKET_SIZE * 1024];
    let mut pending = Vec::new();
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&buf[..n]);
        let usable = pending.len() - pending.len() % TS_PACKET_SIZE;
        for chunk in pending[..usable].chunks_exact(TS_PACKET_SIZE) {
            processor.process_packet(chunk);
        }
        pending.drain(..usable);
    }
    Ok(())
}

fn finish_outputs(processor: &PacketProcessor, opts: &Options) -> anyhow::Result<()> {
    println!("{}", Reporter::generate_json_report(processor));
    dump_pages(processor, opts)?;
    Ok(())
}

/// Writes one PNG per decoded subpage and one `.t42` per page into the
/// requested directories.
fn dump_pages(processor: &PacketProcessor, opts: &Options) -> anyhow::Result<()> {
    let svc = &processor.service;
    for (mag_no, magazine) in svc.magazines() {
        if opts.magazine.is_some_and(|m| m & 0x07 != mag_no) {
            continue;
        }
        let display_no = if mag_no == 0 { 8 } else { mag_no };
        for (page_no, page) in magazine.pages() {
            if opts.page.is_some_and(|p| p != page_no) {
                continue;
            }
            if let Some(dir) = &opts.pages_dir {
                fs::create_dir_all(dir)?;
                for sub in page.subpages() {
                    let img = svc.render(mag_no, page_no, sub);
                    let name =
                        format!("P{display_no}{page_no:02X}-{:04X}.png", sub.subpage_no());
                    img.save_png(&dir.join(name))?;
                }
                for (i, sub) in page.subtitle_versions().iter().enumerate() {
                    let img = svc.render(mag_no, page_no, sub);
                    let name = format!("P{display_no}{page_no:02X}-sub{i:04}.png");
                    img.save_png(&dir.join(name))?;
                }
            }
            if let Some(dir) = &opts.t42_dir {
                fs::create_dir_all(dir)?;
                let name = format!("P{display_no}{page_no:02X}.t42");
                let mut file = fs::File::create(dir.join(name))?;
                t42::write_page(page, &mut file)?;
            }
        }
    }
    if opts.pages_dir.is_some() || opts.t42_dir.is_some() {
        info!("page dumps written");
    }
    Ok(())
}

/// Join multicast / bind unicast socket helper
fn create_udp_socket(addr: SocketAddr) -> anyhow::Result<Socket> {
    let ip = match addr.ip() {
        IpAddr::V4(v4) => v4,
        _ => anyhow::bail!("only IPv4 is supported"),
    };

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;

    if ip.is_multicast() {
        let iface = Ipv4Addr::UNSPECIFIED; // default interface
        socket.join_multicast_v4(&ip, &iface)?;
    }
    socket.set_nonblocking(true)?;
    Ok(socket)
}
