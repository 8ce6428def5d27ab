//! Data model shared by the static indexer and the event decoder
//!
//! - [`kernel_enums`]: numbered kernel enums (commands, helpers, map, program
//!   and attach types)
//! - [`insn`]: eBPF instructions
//! - [`spec`]: program/map specifications produced by the ELF loader
//! - [`event`]: runtime events decoded from the kernel monitor's records

pub mod event;
pub mod insn;
pub mod kernel_enums;
pub mod spec;

pub use event::{Event, MapDescriptor, ProgramDescriptor};
pub use insn::Instruction;
pub use kernel_enums::{AttachType, BpfCmd, HelperFunc, MapType, ProgramType};
pub use spec::{ByteOrder, CollectionSpec, MapSpec, ProgramSpec};
