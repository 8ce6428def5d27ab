//! # Probe Loading and Attachment
//!
//! Loads the kernel monitor object and attaches its programs to kernel hook
//! points.
//!
//! ## Functions
//!
//! - [`load_probe()`] - Load the monitor object, configuring `PROTECT_BPF`
//! - [`register_allowed_binaries()`] - Fill the `ALLOWED_BINARIES` map
//! - [`attach_probes()`] - Attach every program of [`PROBES`]
//!
//! ## Attachment Points
//!
//! - **Tracepoints**: `sched/sched_process_{exec,fork,exit}` (process tree)
//! - **Kprobes**: `security_bpf*`, `check_helper_call` (object details)
//! - **Tracepoints**: `syscalls/sys_{enter,exit}_bpf` (the `bpf(2)` calls)

use std::path::{Path, PathBuf};

use aya::{
    maps::HashMap,
    programs::{KProbe, ProgramError, TracePoint},
    Ebpf, EbpfLoader,
};
use aya_log::EbpfLogger;
use bpfmon_common::{AllowedBinary, ALLOWED_BINARIES_MAP, PROTECT_BPF_GLOBAL};
use log::{debug, info, warn};

use crate::domain::MonitorError;

/// Kernel hook a probe program attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    TracePoint { category: &'static str, name: &'static str },
    KProbe { function: &'static str },
}

/// A program of the monitor object and where it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub program: &'static str,
    pub hook: Hook,
}

const fn tracepoint(program: &'static str, category: &'static str, name: &'static str) -> Probe {
    Probe { program, hook: Hook::TracePoint { category, name } }
}

const fn kprobe(program: &'static str, function: &'static str) -> Probe {
    Probe { program, hook: Hook::KProbe { function } }
}

/// Every probe, in attach order.
///
/// The `bpf(2)` syscall probes come last: once they are live the monitor
/// starts filtering `bpf()` callers, and loading the remaining programs would
/// race with it.
pub const PROBES: &[Probe] = &[
    tracepoint("sched_process_exec", "sched", "sched_process_exec"),
    tracepoint("sched_process_fork", "sched", "sched_process_fork"),
    tracepoint("sched_process_exit", "sched", "sched_process_exit"),
    kprobe("security_bpf", "security_bpf"),
    kprobe("security_bpf_map", "security_bpf_map"),
    kprobe("security_bpf_prog", "security_bpf_prog"),
    kprobe("check_helper_call", "check_helper_call"),
    tracepoint("sys_enter_bpf", "syscalls", "sys_enter_bpf"),
    tracepoint("sys_exit_bpf", "syscalls", "sys_exit_bpf"),
];

/// Load the monitor object at `path`
///
/// `protect` sets the object's `PROTECT_BPF` global, which makes the kernel
/// side deny `bpf()` to binaries outside `ALLOWED_BINARIES`.
///
/// # Errors
/// Returns an error if the object cannot be read or loaded
pub fn load_probe(path: &Path, protect: bool) -> Result<Ebpf, MonitorError> {
    let protect_bpf = u32::from(protect);
    EbpfLoader::new()
        .set_global(PROTECT_BPF_GLOBAL, &protect_bpf, false)
        .load_file(path)
        .map_err(|e| MonitorError::ProbeLoadFailed {
            path: path.display().to_string(),
            error: e.to_string(),
        })
}

/// Initialize eBPF logger
pub fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        // Objects without log statements have nothing to forward
        debug!("eBPF logger not initialized: {e}");
    }
}

/// Allow-list entries: each configured path plus the monitor's own binary
#[must_use]
pub fn allowed_binaries(allowed: &[PathBuf], own_executable: &Path) -> Vec<AllowedBinary> {
    allowed
        .iter()
        .map(PathBuf::as_path)
        .chain(std::iter::once(own_executable))
        .map(|path| AllowedBinary::new(path.as_os_str().as_encoded_bytes()))
        .collect()
}

/// Register allowed binaries in the `ALLOWED_BINARIES` eBPF map
///
/// # Errors
/// Returns an error if the map is missing or an insert fails
pub fn register_allowed_binaries(
    bpf: &mut Ebpf,
    entries: &[AllowedBinary],
) -> Result<usize, MonitorError> {
    let mut map: HashMap<_, AllowedBinary, u32> = HashMap::try_from(
        bpf.map_mut(ALLOWED_BINARIES_MAP).ok_or(MonitorError::MapNotFound(ALLOWED_BINARIES_MAP))?,
    )?;

    for entry in entries {
        map.insert(entry, 1, 0)?;
    }

    info!("✓ Registered {} allowed binaries", entries.len());
    Ok(entries.len())
}

/// Attach every program of [`PROBES`] found in the object
///
/// Missing programs and programs the kernel rejects are skipped with a
/// warning. Returns the number attached.
///
/// # Errors
/// Returns [`MonitorError::NothingAttached`] if no program could be attached
pub fn attach_probes(bpf: &mut Ebpf) -> Result<usize, MonitorError> {
    let mut attached = 0;
    for probe in PROBES {
        match attach_probe(bpf, probe) {
            Ok(true) => {
                info!("✓ Attached {}", describe(probe));
                attached += 1;
            }
            Ok(false) => warn!("⚠️  {} program not found, skipping", probe.program),
            Err(e) => warn!("⚠️  Could not attach {}: {e}", describe(probe)),
        }
    }

    if attached == 0 {
        return Err(MonitorError::NothingAttached);
    }
    Ok(attached)
}

fn attach_probe(bpf: &mut Ebpf, probe: &Probe) -> Result<bool, ProgramError> {
    let Some(program) = bpf.program_mut(probe.program) else {
        return Ok(false);
    };

    match probe.hook {
        Hook::TracePoint { category, name } => {
            let program: &mut TracePoint = program.try_into()?;
            program.load()?;
            program.attach(category, name)?;
        }
        Hook::KProbe { function } => {
            // kretprobes share the KProbe type, aya reads the kind from the section
            let program: &mut KProbe = program.try_into()?;
            program.load()?;
            program.attach(function, 0)?;
        }
    }
    Ok(true)
}

fn describe(probe: &Probe) -> String {
    match probe.hook {
        Hook::TracePoint { category, name } => format!("tracepoint: {category}/{name}"),
        Hook::KProbe { function } => format!("kprobe: {function}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syscall_probes_attach_last() {
        let syscall = |p: &Probe| matches!(p.hook, Hook::TracePoint { category: "syscalls", .. });
        let first_syscall = PROBES.iter().position(syscall).unwrap();
        assert!(PROBES[first_syscall..].iter().all(syscall));
        assert_eq!(PROBES.len() - first_syscall, 2);
    }

    #[test]
    fn test_program_names_are_unique() {
        for (i, probe) in PROBES.iter().enumerate() {
            assert!(PROBES[i + 1..].iter().all(|p| p.program != probe.program));
        }
    }

    #[test]
    fn test_allowed_binaries_include_own_executable() {
        let allowed = vec![PathBuf::from("/usr/sbin/bpftool")];
        let entries = allowed_binaries(&allowed, Path::new("/usr/local/bin/bpfmon"));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], AllowedBinary::new(b"/usr/sbin/bpftool"));
        assert_eq!(entries[1], AllowedBinary::new(b"/usr/local/bin/bpfmon"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(&PROBES[0]), "tracepoint: sched/sched_process_exec");
        assert_eq!(describe(&kprobe("security_bpf", "security_bpf")), "kprobe: security_bpf");
    }
}
