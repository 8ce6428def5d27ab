//! CLI argument definitions

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use crate::model::HelperFunc;

#[derive(Parser, Debug)]
#[command(
    name = "bpfmon",
    version,
    about = "Inspect eBPF objects and monitor bpf(2) activity",
    after_help = "\
EXAMPLES:
    bpfmon -a probe.o prog --helper BpfMapLookupElem    Programs calling a helper
    bpfmon -a probe.o report                            Object-wide summary
    bpfmon -a probe.o graph --output probe.dot          Program/map graph
    sudo bpfmon start --probe monitor.o                 Watch bpf(2) calls"
)]
pub struct Args {
    /// Path to the eBPF object to analyze
    #[arg(short, long, global = true, value_name = "ELF")]
    pub asset: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show programs of the object
    Prog {
        /// Only this program section
        #[arg(short, long)]
        section: Option<String>,

        /// Only programs calling this helper (e.g. BpfMapLookupElem)
        #[arg(long, value_parser = parse_helper)]
        helper: Option<HelperFunc>,

        /// Only programs referencing this map
        #[arg(long)]
        map: Option<String>,

        /// Dump program bytecode
        #[arg(short, long)]
        dump: bool,
    },

    /// Show maps of the object
    Map {
        /// Only this map (name or section)
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Summarize program types, helpers and map types
    Report,

    /// Generate a Graphviz description of programs and maps
    Graph {
        /// Write here instead of a new file in the temp directory
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Monitor bpf(2) calls on this host (requires root)
    Start {
        /// Compiled kernel monitor object
        #[arg(long, value_name = "ELF")]
        probe: PathBuf,

        /// Executables allowed to call bpf(2); enables protection when given
        #[arg(long = "allowed-processes", value_name = "PATH")]
        allowed_processes: Vec<PathBuf>,

        /// Directory for events.json
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Stop after N seconds (0 = unlimited)
        #[arg(long, default_value = "0")]
        duration: u64,
    },
}

/// Resolve a helper name against the kernel helper table
///
/// # Errors
/// Returns an error naming the helper when it is unknown
pub fn parse_helper(name: &str) -> Result<HelperFunc, String> {
    HelperFunc::from_name(name).ok_or_else(|| format!("unknown eBPF helper {name}"))
}
