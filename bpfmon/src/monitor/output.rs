//! Newline-delimited JSON event log
//!
//! Serialization and file I/O run on a dedicated thread so the ring buffer
//! drain loop never waits on the disk. Events reach it over a bounded
//! `crossbeam-channel`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info};

use crate::domain::MonitorError;
use crate::model::Event;

/// Name of the event log inside the output directory
pub const EVENTS_FILE: &str = "events.json";

/// Events buffered between the drain loop and the writer thread
pub const CHANNEL_CAPACITY: usize = 1000;

/// Handle on the writer thread
pub struct EventWriter {
    path: PathBuf,
    handle: JoinHandle<Result<usize, MonitorError>>,
}

impl EventWriter {
    /// Create `<output_dir>/events.json` and start the writer thread.
    ///
    /// The thread runs until every clone of the returned sender is dropped.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be created
    pub fn spawn(output_dir: &Path) -> Result<(Self, Sender<Event>), MonitorError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(EVENTS_FILE);
        let file = File::create(&path)?;

        let (tx, rx) = bounded(CHANNEL_CAPACITY);
        let handle = thread::Builder::new()
            .name("event-writer".to_string())
            .spawn(move || write_events(&rx, BufWriter::new(file)))?;

        info!("Writing events to {}", path.display());
        Ok((Self { path, handle }, tx))
    }

    /// Path of the event log
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the thread to drain the channel. Returns the number of events
    /// written.
    ///
    /// Every sender must have been dropped first, otherwise this blocks.
    ///
    /// # Errors
    /// Returns the error that stopped the thread, if any
    pub fn finish(self) -> Result<usize, MonitorError> {
        self.handle.join().map_err(|_| MonitorError::WriterPanicked)?
    }
}

/// Write every received event as one JSON line
///
/// # Errors
/// Returns an error on the first failed serialization or write
pub fn write_events<W: Write>(rx: &Receiver<Event>, mut out: W) -> Result<usize, MonitorError> {
    let mut written = 0;
    for event in rx {
        serde_json::to_writer(&mut out, &event)?;
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    debug!("event writer done, {written} events");
    Ok(written)
}
