// SPDX-License-Identifier: Apache-2.0 OR MIT

//! zipc-shm-inspect - Inspect ZIPC shared memory channels
//!
//! Displays the control block (`init_flag`, `head`, `tail`) of named ZIPC
//! channels under `/dev/shm`, independent of the `zipc` crate itself (it
//! re-derives the wire offsets here, the same way the teacher's
//! `hdds-shm-viewer` re-derives its control-block layout rather than
//! depending on the runtime crate).

use clap::Parser;
use colored::*;
use std::ffi::CString;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

const OFFSET_INIT_FLAG: usize = 0;
const OFFSET_HEAD: usize = 8;
const OFFSET_TAIL: usize = 72;
const CONTROL_BLOCK_SIZE: usize = 128;

/// Inspect ZIPC shared memory channels
#[derive(Parser, Debug)]
#[command(name = "zipc-shm-inspect")]
#[command(version = "0.1.0")]
#[command(about = "Inspect ZIPC shared memory channels")]
struct Args {
    /// Number of slots in the ring, for occupancy reporting
    #[arg(short = 'q', long)]
    queue_size: Option<u32>,

    /// Show detailed control-block fields
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Output format: pretty, json
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Show only summary statistics
    #[arg(short, long)]
    summary: bool,

    /// Specific channel name to inspect (with or without the leading '/')
    #[arg()]
    channel: Option<String>,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown format: {s}")),
        }
    }
}

#[derive(Debug)]
struct ChannelInfo {
    name: String,
    file_size: u64,
    control: Option<ControlInfo>,
    error: Option<String>,
}

#[derive(Debug)]
struct ControlInfo {
    init_flag: u32,
    head: u32,
    tail: u32,
}

impl ControlInfo {
    fn pending_count(&self) -> u32 {
        self.tail.wrapping_sub(self.head)
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let shm_dir = Path::new("/dev/shm");

    if !shm_dir.exists() {
        return Err("shared memory directory /dev/shm not found".into());
    }

    let channels = if let Some(ref name) = args.channel {
        vec![inspect_channel(name)]
    } else {
        scan_channels(shm_dir)?
    };

    match args.format {
        OutputFormat::Pretty => print_pretty(&channels, args),
        OutputFormat::Json => print_json(&channels),
    }

    Ok(())
}

fn scan_channels(shm_dir: &Path) -> Result<Vec<ChannelInfo>, Box<dyn std::error::Error>> {
    let mut channels = Vec::new();

    for entry in fs::read_dir(shm_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if (file_size as usize) < CONTROL_BLOCK_SIZE {
            continue; // too small to be a ZIPC region
        }

        channels.push(inspect_channel(name));
    }

    channels.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(channels)
}

fn inspect_channel(name: &str) -> ChannelInfo {
    let shm_name = if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{name}")
    };
    let display_name = name.trim_start_matches('/').to_string();

    let file_path = format!("/dev/shm/{display_name}");
    let file_size = fs::metadata(&file_path).map(|m| m.len()).unwrap_or(0);

    match open_and_read_control(&shm_name) {
        Ok(control) => ChannelInfo {
            name: display_name,
            file_size,
            control: Some(control),
            error: None,
        },
        Err(e) => ChannelInfo {
            name: display_name,
            file_size,
            control: None,
            error: Some(e.to_string()),
        },
    }
}

fn open_and_read_control(shm_name: &str) -> Result<ControlInfo, Box<dyn std::error::Error>> {
    let c_name = CString::new(shm_name)?;

    // SAFETY: c_name is NUL-terminated; O_RDONLY never mutates the segment.
    let fd = unsafe { libc::shm_open(c_name.as_ptr(), libc::O_RDONLY, 0) };
    if fd < 0 {
        return Err("failed to open segment".into());
    }

    // SAFETY: fd is open for reading; PROT_READ matches. Only the
    // control-block prefix is mapped, the slot array is irrelevant here.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            CONTROL_BLOCK_SIZE,
            libc::PROT_READ,
            libc::MAP_SHARED,
            fd,
            0,
        )
    };

    // SAFETY: fd is valid and no longer needed once mapped.
    unsafe { libc::close(fd) };

    if ptr == libc::MAP_FAILED {
        return Err("failed to map segment".into());
    }

    // SAFETY: ptr is a valid mapping of at least CONTROL_BLOCK_SIZE bytes;
    // the offsets below are all within that range and 4-byte aligned.
    let (init_flag, head, tail) = unsafe {
        let base = ptr.cast::<u8>();
        let init_flag = (*(base.add(OFFSET_INIT_FLAG).cast::<AtomicU32>())).load(Ordering::Relaxed);
        let head = (*(base.add(OFFSET_HEAD).cast::<AtomicU32>())).load(Ordering::Relaxed);
        let tail = (*(base.add(OFFSET_TAIL).cast::<AtomicU32>())).load(Ordering::Relaxed);
        (init_flag, head, tail)
    };

    // SAFETY: ptr/CONTROL_BLOCK_SIZE match the successful mmap above.
    unsafe { libc::munmap(ptr, CONTROL_BLOCK_SIZE) };

    Ok(ControlInfo { init_flag, head, tail })
}

fn print_pretty(channels: &[ChannelInfo], args: &Args) {
    if channels.is_empty() {
        println!("{}", "No ZIPC shared memory channels found".yellow());
        return;
    }

    if args.summary {
        print_summary(channels);
        return;
    }

    println!();
    println!("{}", "=== ZIPC Shared Memory Channels ===".bold());
    println!();

    let mut total_size: u64 = 0;

    for ch in channels {
        total_size += ch.file_size;

        println!("  {} ({})", ch.name.cyan(), format_size(ch.file_size));

        if let Some(ref ctrl) = ch.control {
            let init_badge = if ctrl.init_flag == 1 {
                "INITIALIZED".green()
            } else {
                "PENDING".yellow()
            };

            if args.verbose {
                println!("      Status: [{init_badge}]");
                println!("      head={}  tail={}", ctrl.head, ctrl.tail);
                if let Some(queue_size) = args.queue_size {
                    let pending = ctrl.pending_count();
                    let pct = (pending as f64 / queue_size as f64) * 100.0;
                    println!("      Fill: {pending}/{queue_size} ({pct:.1}%)");
                }
            } else {
                println!(
                    "      [{init_badge}] head={}, tail={}, pending={}",
                    ctrl.head,
                    ctrl.tail,
                    ctrl.pending_count()
                );
            }
        }

        if let Some(ref err) = ch.error {
            println!("      {}: {}", "Error".red(), err);
        }

        println!();
    }

    println!("{}", "--- Summary ---".dimmed());
    println!("  Channels: {}", channels.len());
    println!("  Total size: {}", format_size(total_size));
    println!();
}

fn print_summary(channels: &[ChannelInfo]) {
    let mut total_size: u64 = 0;
    let mut initialized = 0;
    let mut total_pending: u64 = 0;

    for ch in channels {
        total_size += ch.file_size;
        if let Some(ref ctrl) = ch.control {
            if ctrl.init_flag == 1 {
                initialized += 1;
            }
            total_pending += u64::from(ctrl.pending_count());
        }
    }

    println!(
        "channels={} initialized={} size={} pending={}",
        channels.len(),
        initialized,
        total_size,
        total_pending
    );
}

fn print_json(channels: &[ChannelInfo]) {
    print!("{{\"channels\":[");

    for (i, ch) in channels.iter().enumerate() {
        if i > 0 {
            print!(",");
        }

        print!("{{\"name\":\"{}\",\"size\":{}", ch.name, ch.file_size);

        if let Some(ref ctrl) = ch.control {
            print!(
                ",\"control\":{{\"init_flag\":{},\"head\":{},\"tail\":{},\"pending\":{}}}",
                ctrl.init_flag,
                ctrl.head,
                ctrl.tail,
                ctrl.pending_count()
            );
        }

        if let Some(ref err) = ch.error {
            print!(",\"error\":\"{}\"", err.replace('"', "\\\""));
        }

        print!("}}");
    }

    println!("]}}");
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
