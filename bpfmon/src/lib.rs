//! # bpfmon - eBPF Object Inspector and `bpf(2)` Monitor
//!
//! bpfmon answers two questions for people auditing kernel bytecode: what does
//! an eBPF object contain, and who is loading bytecode on this host right now.
//!
//! ## Architecture Overview
//!
//! ```text
//!   static analysis                          runtime monitoring
//!   ───────────────                          ──────────────────
//!   ELF object (-a)                          kernel monitor object (--probe)
//!        │                                          │ attached by aya
//!        ▼                                          ▼
//!   ┌──────────┐                             ┌──────────────┐
//!   │   elf    │ CollectionSpec              │   monitor    │ raw 96-byte records
//!   └────┬─────┘                             └──────┬───────┘
//!        ▼                                          ▼
//!   ┌──────────┐                             ┌──────────────┐
//!   │ analysis │ Indexes                     │ model::event │ Event
//!   └────┬─────┘                             └──────┬───────┘
//!        ▼                                          ▼
//!   reports / DOT graph                      log + events.json + summary
//! ```
//!
//! ## Module Structure
//!
//! - [`model`]: kernel enums, instructions, program/map specs and events
//! - [`elf`]: reads an eBPF ELF object into a [`model::CollectionSpec`]
//! - [`analysis`]: cross-reference indexes, text reports and the DOT graph
//! - [`monitor`]: probe loading, record processing and the NDJSON writer
//! - [`preflight`]: privilege, kernel and probe checks before `start`
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: error types and identifier aliases
//!
//! ## Typical Usage
//!
//! ```bash
//! # Programs that call a helper and reference a map
//! bpfmon -a probe.o prog --helper BpfMapLookupElem --map events
//!
//! # Summary of program types, helpers and maps
//! bpfmon -a probe.o report
//!
//! # Watch bpf(2) calls, allowing only bpftool to load programs
//! sudo bpfmon start --probe monitor.o --allowed-processes /usr/sbin/bpftool
//! ```

// Expose modules for testing
pub mod analysis;
pub mod cli;
pub mod domain;
pub mod elf;
pub mod model;
pub mod monitor;
pub mod preflight;
