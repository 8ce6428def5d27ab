//! Boot-time reference for event timestamps
//!
//! The kernel stamps records with `bpf_ktime_get_ns()`, nanoseconds on the
//! monotonic clock. Adding that offset to the wall-clock time of boot gives an
//! absolute timestamp.

#![allow(unsafe_code)] // clock_gettime() requires unsafe

use std::io;

use chrono::{DateTime, TimeDelta, Utc};

/// Time elapsed on the monotonic clock since boot
pub fn monotonic_now() -> io::Result<TimeDelta> {
    let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
    // SAFETY: ts is a valid, writable timespec
    if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) } != 0 {
        return Err(io::Error::last_os_error());
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::useless_conversion)]
    let nanos = ts.tv_nsec as u32;
    TimeDelta::new(i64::from(ts.tv_sec), nanos)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "monotonic clock out of range"))
}

/// Wall-clock time at which the host booted
pub fn boot_time() -> io::Result<DateTime<Utc>> {
    let uptime = monotonic_now()?;
    Utc::now()
        .checked_sub_signed(uptime)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "boot time out of range"))
}
