//! # Event Processing
//!
//! Consumes raw records from the `EVENTS` ring buffer, decodes them and routes
//! the resulting events.
//!
//! ## Outputs
//!
//! - **Log**: every event at `info` level, through its `Display`
//! - **File**: forwarded to the NDJSON writer thread when an output
//!   directory is configured
//! - **Stats**: per-command counters and the names of loaded programs and
//!   created maps, printed on shutdown

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Sender, TrySendError};
use log::{info, warn};

use crate::model::{BpfCmd, Event};

/// Counters accumulated over one monitoring session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Records decoded successfully
    pub event_count: usize,
    /// Records dropped because they could not be decoded
    pub decode_errors: usize,
    /// Events not written because the writer thread fell behind
    pub dropped: usize,
    pub commands: BTreeMap<BpfCmd, usize>,
    /// Programs seen in `BPF_PROG_LOAD`
    pub loaded_programs: BTreeSet<String>,
    /// Maps seen in `BPF_MAP_CREATE`
    pub created_maps: BTreeSet<String>,
}

/// Encapsulates event processing logic and state
pub struct EventProcessor {
    boot_time: DateTime<Utc>,
    pub stats: MonitorStats,
    event_tx: Option<Sender<Event>>,
}

impl EventProcessor {
    /// Create a new event processor
    ///
    /// `boot_time` anchors the records' relative timestamps.
    #[must_use]
    pub fn new(boot_time: DateTime<Utc>, event_tx: Option<Sender<Event>>) -> Self {
        Self { boot_time, stats: MonitorStats::default(), event_tx }
    }

    /// Process a single raw record
    ///
    /// Undecodable records are logged, counted and dropped.
    pub fn process_record(&mut self, data: &[u8]) -> Option<Event> {
        let event = match Event::decode(data, self.boot_time) {
            Ok((event, _)) => event,
            Err(e) => {
                warn!("Dropping record: {e}");
                self.stats.decode_errors += 1;
                return None;
            }
        };

        self.record(&event);
        info!("{event}");

        if let Some(tx) = &self.event_tx {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => self.stats.dropped += 1,
                Err(TrySendError::Disconnected(_)) => {
                    warn!("Event writer stopped, no longer writing events");
                    self.event_tx = None;
                }
            }
        }
        Some(event)
    }

    /// Finish processing, releasing the writer channel
    #[must_use]
    pub fn into_stats(self) -> MonitorStats {
        self.stats
    }

    fn record(&mut self, event: &Event) {
        let stats = &mut self.stats;
        stats.event_count += 1;
        *stats.commands.entry(event.command).or_default() += 1;

        match event.command {
            BpfCmd::PROG_LOAD => {
                if let Some(program) = &event.program {
                    stats.loaded_programs.insert(display_name(&program.name, program.id));
                }
            }
            BpfCmd::MAP_CREATE => {
                if let Some(map) = &event.map {
                    stats.created_maps.insert(display_name(&map.name, map.id));
                }
            }
            _ => {}
        }
    }
}

/// Object name, or `#<id>` for anonymous objects
fn display_name(name: &str, id: u32) -> String {
    if name.is_empty() {
        format!("#{id}")
    } else {
        name.to_string()
    }
}
