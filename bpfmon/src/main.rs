//! # bpfmon - Main Entry Point
//!
//! Supports two operational modes:
//! - **Static analysis** (`prog`, `map`, `report`, `graph`): inspect the object given with `--asset`
//! - **Runtime monitoring** (`start`): log every `bpf(2)` call on the host until Ctrl+C

use anyhow::{Context, Result};
use aya::maps::RingBuf;
use bpfmon_common::EVENTS_MAP;
use clap::Parser;
use log::{info, LevelFilter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bpfmon::analysis::{write_graph, Indexes, ProgramQuery, Reporter};
use bpfmon::cli::{Args, Command};
use bpfmon::domain::MonitorError;
use bpfmon::elf::load_collection_spec;
use bpfmon::model::CollectionSpec;
use bpfmon::monitor::{
    allowed_binaries, attach_probes, boot_time, display_summary, init_ebpf_logger, load_probe,
    register_allowed_binaries, EventProcessor, EventWriter,
};
use bpfmon::preflight::run_preflight_checks;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

/// Ring buffer polling interval
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    let args = Args::parse();
    init_logging(args.log_level);

    std::process::exit(match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn init_logging(level: LevelFilter) {
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

/// Exit code from the outermost message only; causes deeper in the chain
/// (an unreadable asset, say) don't imply missing privileges
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("operation not permitted") {
        EXIT_NOPERM
    } else if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run(args: Args) -> Result<()> {
    let asset = args.asset.as_deref();
    let mut out = io::stdout().lock();

    match args.command {
        Command::Prog { section, helper, map, dump } => {
            let (spec, indexes) = load_asset(asset)?;
            let query = ProgramQuery { section, helper, map, dump_bytecode: dump };
            Reporter::new(&spec, &indexes).show_programs(&mut out, &query)?;
        }
        Command::Map { section } => {
            let (spec, indexes) = load_asset(asset)?;
            Reporter::new(&spec, &indexes).show_maps(&mut out, section.as_deref())?;
        }
        Command::Report => {
            let (spec, indexes) = load_asset(asset)?;
            Reporter::new(&spec, &indexes).show_summary(&mut out)?;
        }
        Command::Graph { output } => {
            let (spec, indexes) = load_asset(asset)?;
            let title = asset.map(|a| a.display().to_string()).unwrap_or_default();
            let path = write_graph(&title, &spec, &indexes, output.as_deref())?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Start { probe, allowed_processes, output_dir, duration } => {
            start(&probe, &allowed_processes, output_dir.as_deref(), duration)?;
        }
    }
    Ok(())
}

/// Parse the asset and index it
fn load_asset(asset: Option<&Path>) -> Result<(CollectionSpec, Indexes)> {
    let asset = asset.context("Missing required argument: --asset <ELF>")?;
    let spec = load_collection_spec(asset)
        .with_context(|| format!("couldn't parse asset {}", asset.display()))?;
    let indexes = Indexes::build(&spec.programs, &spec.maps);
    Ok((spec, indexes))
}

#[tokio::main]
async fn start(
    probe: &Path,
    allowed_processes: &[PathBuf],
    output_dir: Option<&Path>,
    duration: u64,
) -> Result<()> {
    // Run pre-flight checks before anything else
    run_preflight_checks(probe)?;

    let boot = boot_time().context("Failed to compute boot time")?;

    // ── Load the monitor and configure the allow-list ──────────────────
    let mut bpf = load_probe(probe, !allowed_processes.is_empty())?;
    init_ebpf_logger(&mut bpf);

    let own_executable = std::env::current_exe().context("Failed to resolve own executable")?;
    register_allowed_binaries(&mut bpf, &allowed_binaries(allowed_processes, &own_executable))?;

    // ── Attach (bpf syscall probes last) ────────────────────────────────
    let attached = attach_probes(&mut bpf)?;
    info!("Attached {attached} probes");

    let mut ring_buf = RingBuf::try_from(
        bpf.take_map(EVENTS_MAP).ok_or(MonitorError::MapNotFound(EVENTS_MAP))?,
    )?;

    // ── Event log writer ────────────────────────────────────────────────
    let (writer, event_tx) = match output_dir {
        Some(dir) => {
            let (writer, tx) = EventWriter::spawn(dir)
                .with_context(|| format!("Failed to open event log in {}", dir.display()))?;
            (Some(writer), Some(tx))
        }
        None => (None, None),
    };

    let mut processor = EventProcessor::new(boot, event_tx);

    // Setup Ctrl+C handler
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Track start time for duration limit
    let monitoring_start = Instant::now();
    let duration_limit = (duration > 0).then(|| Duration::from_secs(duration));

    // Track why we exited the loop
    let mut exit_reason = "interrupted";

    info!("bpfmon is now running ...");

    // Main event processing loop
    loop {
        if let Some(limit) = duration_limit {
            if monitoring_start.elapsed() >= limit {
                exit_reason = "duration limit reached";
                break;
            }
        }

        while let Some(item) = ring_buf.next() {
            processor.process_record(&item);
        }

        tokio::select! {
            () = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    info!("shutting down ...");

    // Dropping the processor closes the channel so the writer can finish
    let stats = processor.into_stats();
    if let Some(writer) = writer {
        let path = writer.path().to_path_buf();
        let written = writer.finish().context("Failed to write event log")?;
        info!("saved {written} events to {}", path.display());
    }

    display_summary(&stats, exit_reason, monitoring_start.elapsed());
    Ok(())
}
