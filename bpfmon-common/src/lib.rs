//! # Shared Wire Schema (eBPF ↔ Userspace)
//!
//! Describes the fixed-size record the kernel-side monitor writes for every
//! `bpf(2)` invocation, plus the map names and key types both sides agree on.
//!
//! The record is described as a table of `(offset, width, kind)` fields rather
//! than as an overlaid `#[repr(C)]` struct: userspace decodes each field with an
//! explicit read, so padding and byte order never depend on the compiler's
//! layout of a Rust type.
//!
//! ## Record Layout (96 bytes, host byte order)
//!
//! ```text
//! offset  width  block    field
//! ──────  ─────  ───────  ──────────────────────────────────────────────
//!      0      8  header   nanoseconds since boot (bpf_ktime_get_ns)
//!      8      4  header   bpf(2) command
//!     12      4  header   padding
//!     16      4  map      map id (0 = no map)
//!     20      4  map      map type
//!     24     16  map      map name (NUL padded)
//!     40      4  prog     program id (0 = no program)
//!     44      4  prog     program type
//!     48      4  prog     expected attach type (0 = unset)
//!     52      4  prog     padding
//!     56     24  prog     helper bitmask, 3 x u64 (bit N = helper N)
//!     80     16  prog     program name (NUL padded)
//! ```

#![no_std]

// ============================================================================
// Field Schema
// ============================================================================

/// Semantic kind of a wire field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned 64-bit integer
    U64,
    /// Unsigned 32-bit integer
    U32,
    /// Bytes the decoder must skip
    Padding,
    /// Three consecutive `u64` words forming a 192-bit helper set
    HelperMask,
    /// Fixed-width name, trailing NUL bytes trimmed
    Name,
}

/// One field of a wire block, relative to the start of that block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

impl Field {
    const fn new(offset: usize, width: usize, kind: FieldKind) -> Self {
        Self { offset, width, kind }
    }

    /// First byte past this field
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Width of the fixed name fields (kernel `BPF_OBJ_NAME_LEN`)
pub const OBJ_NAME_LEN: usize = 16;

/// Number of `u64` words in the helper bitmask
pub const HELPER_MASK_WORDS: usize = 3;

/// Number of helper ids the bitmask can describe
pub const HELPER_MASK_BITS: usize = HELPER_MASK_WORDS * 64;

/// Event header: timestamp and command
pub mod header {
    use super::{Field, FieldKind};

    pub const TIMESTAMP_NS: Field = Field::new(0, 8, FieldKind::U64);
    pub const COMMAND: Field = Field::new(8, 4, FieldKind::U32);
    pub const PADDING: Field = Field::new(12, 4, FieldKind::Padding);

    pub const SIZE: usize = 16;
    pub const FIELDS: [Field; 3] = [TIMESTAMP_NS, COMMAND, PADDING];
}

/// Embedded map descriptor
pub mod map_block {
    use super::{Field, FieldKind, OBJ_NAME_LEN};

    pub const ID: Field = Field::new(0, 4, FieldKind::U32);
    pub const MAP_TYPE: Field = Field::new(4, 4, FieldKind::U32);
    pub const NAME: Field = Field::new(8, OBJ_NAME_LEN, FieldKind::Name);

    pub const SIZE: usize = 24;
    pub const FIELDS: [Field; 3] = [ID, MAP_TYPE, NAME];
}

/// Embedded program descriptor
pub mod prog_block {
    use super::{Field, FieldKind, HELPER_MASK_WORDS, OBJ_NAME_LEN};

    pub const ID: Field = Field::new(0, 4, FieldKind::U32);
    pub const PROG_TYPE: Field = Field::new(4, 4, FieldKind::U32);
    pub const ATTACH_TYPE: Field = Field::new(8, 4, FieldKind::U32);
    pub const PADDING: Field = Field::new(12, 4, FieldKind::Padding);
    pub const HELPERS: Field = Field::new(16, HELPER_MASK_WORDS * 8, FieldKind::HelperMask);
    pub const NAME: Field = Field::new(40, OBJ_NAME_LEN, FieldKind::Name);

    pub const SIZE: usize = 56;
    pub const FIELDS: [Field; 6] = [ID, PROG_TYPE, ATTACH_TYPE, PADDING, HELPERS, NAME];
}

/// Offset of the map block inside a record
pub const MAP_BLOCK_OFFSET: usize = header::SIZE;

/// Offset of the program block inside a record
pub const PROG_BLOCK_OFFSET: usize = MAP_BLOCK_OFFSET + map_block::SIZE;

/// Total size of one record
pub const EVENT_SIZE: usize = PROG_BLOCK_OFFSET + prog_block::SIZE;

// ============================================================================
// Shared Map and Global Names
// ============================================================================

/// Ring buffer carrying one record per `bpf(2)` invocation
pub const EVENTS_MAP: &str = "EVENTS";

/// Hash map of executables allowed to call `bpf(2)`
///
/// Key: [`AllowedBinary`], value: `u32` (1 = allowed)
pub const ALLOWED_BINARIES_MAP: &str = "ALLOWED_BINARIES";

/// Global switch: when 1, callers outside the allow-list get `-EPERM`
pub const PROTECT_BPF_GLOBAL: &str = "PROTECT_BPF";

/// Maximum executable path length stored in the allow-list
pub const PATH_MAX_LEN: usize = 350;

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Allow-list key: an executable path, NUL padded to [`PATH_MAX_LEN`]
///
/// Paths longer than [`PATH_MAX_LEN`] are truncated.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedBinary {
    pub path: [u8; PATH_MAX_LEN],
}

impl AllowedBinary {
    /// Build a key from raw path bytes
    #[must_use]
    pub fn new(path: &[u8]) -> Self {
        let mut buf = [0u8; PATH_MAX_LEN];
        let len = path.len().min(PATH_MAX_LEN);
        buf[..len].copy_from_slice(&path[..len]);
        Self { path: buf }
    }
}

#[cfg(feature = "user")]
use aya::Pod;

// The allow-list key crosses the kernel boundary as plain bytes
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for AllowedBinary {}
