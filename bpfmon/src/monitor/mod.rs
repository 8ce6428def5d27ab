//! Runtime monitoring of `bpf(2)`
//!
//! - Boot-time reference for event timestamps
//! - Probe loading, allow-list setup and attachment
//! - Event processing and statistics
//! - NDJSON event log on a writer thread
//! - Summary display

pub mod clock;
pub mod event_display;
pub mod event_processor;
pub mod output;
pub mod probes;

pub use clock::boot_time;
pub use event_display::display_summary;
pub use event_processor::{EventProcessor, MonitorStats};
pub use output::EventWriter;
pub use probes::{
    allowed_binaries, attach_probes, init_ebpf_logger, load_probe, register_allowed_binaries,
};
