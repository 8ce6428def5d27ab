//! Pre-flight checks for `bpfmon start`
//!
//! Validates system requirements before attempting to load the probe object.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use log::warn;
use object::{Architecture, Object};
use std::path::Path;

/// Minimum kernel version: ring buffer maps appeared in 5.8
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Run all pre-flight checks before loading the probe
pub fn run_preflight_checks(probe_path: &Path) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_probe_object(probe_path)?;
    Ok(())
}

/// Whether the process runs with root privileges
#[must_use]
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    if is_root() {
        return Ok(());
    }
    bail!(
        "Permission denied: bpfmon requires root privileges to load its probes.\n\n\
         Run with: sudo bpfmon start ..."
    );
}

/// Major and minor numbers of a kernel release string such as `6.1.0-arch1-1`
#[must_use]
pub fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor: String = parts.next()?.chars().take_while(char::is_ascii_digit).collect();
    Some((major, minor.parse().ok()?))
}

/// Check if the kernel version is sufficient for ring buffers
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // "Linux version 5.15.0-generic ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    let Some((major, minor)) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        warn!("Could not parse kernel release {release:?}, skipping version check");
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {}.{} is too old.\n\n\
             bpfmon requires Linux {}.{} or newer for eBPF ring buffer support.\n\
             Current kernel: {}",
            major,
            minor,
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
            release
        );
    }

    Ok(())
}

/// Check that the probe object exists and looks like eBPF bytecode
fn check_probe_object(probe_path: &Path) -> Result<()> {
    if !probe_path.exists() {
        bail!(
            "Probe object not found: {}\n\n\
             Make sure --probe points to the compiled monitor object.",
            probe_path.display()
        );
    }
    if !probe_path.is_file() {
        bail!(
            "Not a file: {}\n\n\
             --probe must point to an ELF object, not a directory.",
            probe_path.display()
        );
    }

    let data = std::fs::read(probe_path)
        .with_context(|| format!("Failed to read probe object: {}", probe_path.display()))?;
    match object::File::parse(&*data) {
        Ok(obj) if obj.architecture() == Architecture::Bpf => Ok(()),
        Ok(obj) => bail!(
            "{} is not an eBPF object (architecture {:?})",
            probe_path.display(),
            obj.architecture()
        ),
        Err(e) => bail!("{} is not a valid ELF object: {e}", probe_path.display()),
    }
}
