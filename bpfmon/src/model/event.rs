//! # Runtime Event Decoding
//!
//! Turns one raw record from the kernel monitor's ring buffer into an
//! [`Event`]. The record layout lives in [`bpfmon_common`]; every field is read
//! at its schema offset in host byte order, so nothing here depends on how a
//! Rust struct would be laid out.
//!
//! Decoding is all-or-nothing: the record length is checked before any field
//! is read, and the returned event owns all its data (the input buffer can be
//! reused as soon as [`Event::decode`] returns).

use std::fmt;

use bpfmon_common::{
    header, map_block, prog_block, Field, EVENT_SIZE, HELPER_MASK_BITS, HELPER_MASK_WORDS,
    MAP_BLOCK_OFFSET, PROG_BLOCK_OFFSET,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::{AttachType, BpfCmd, HelperFunc, MapType, ProgramType};
use crate::domain::DecodeError;

/// One `bpf(2)` invocation observed by the kernel monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub command: BpfCmd,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramDescriptor>,
}

/// Map touched by the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapDescriptor {
    pub id: u32,
    #[serde(rename = "type")]
    pub map_type: MapType,
    pub name: String,
}

/// Program touched by the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramDescriptor {
    pub id: u32,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    #[serde(skip_serializing_if = "AttachType::is_none")]
    pub attach_type: AttachType,
    /// Helpers the verifier saw the program call, in ascending id order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub helpers: Vec<HelperFunc>,
    pub name: String,
}

/// Read-only view over one block of a record
struct Block<'a> {
    bytes: &'a [u8],
}

impl<'a> Block<'a> {
    fn new(record: &'a [u8], offset: usize, size: usize) -> Self {
        Self { bytes: &record[offset..offset + size] }
    }

    fn array<const N: usize>(&self, field: Field, at: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[field.offset + at..field.offset + at + N]);
        out
    }

    fn u32(&self, field: Field) -> u32 {
        u32::from_ne_bytes(self.array(field, 0))
    }

    fn u64(&self, field: Field) -> u64 {
        u64::from_ne_bytes(self.array(field, 0))
    }

    fn helper_mask(&self, field: Field) -> [u64; HELPER_MASK_WORDS] {
        let mut words = [0u64; HELPER_MASK_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u64::from_ne_bytes(self.array(field, i * 8));
        }
        words
    }

    fn name(&self, field: Field) -> String {
        trim_name(&self.bytes[field.offset..field.end()])
    }
}

/// Decode a fixed-width name field, dropping trailing NUL bytes
fn trim_name(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Unpack the 192-bit helper set into helper ids, ascending
///
/// Bit `n` of the set lives in word `n / 64` at position `n % 64`.
#[must_use]
pub fn parse_helpers(words: [u64; HELPER_MASK_WORDS]) -> Vec<HelperFunc> {
    let mut helpers = Vec::new();
    for bit in 0..HELPER_MASK_BITS {
        if words[bit / 64] & (1u64 << (bit % 64)) != 0 {
            #[allow(clippy::cast_possible_truncation)]
            helpers.push(HelperFunc(bit as u32));
        }
    }
    helpers
}

impl Event {
    /// Decode one record
    ///
    /// `boot_time` is the wall-clock time of boot; the record carries
    /// nanoseconds since then. Returns the event and the number of bytes
    /// consumed, which is always [`EVENT_SIZE`].
    ///
    /// # Errors
    /// Returns [`DecodeError::MalformedInput`] if `data` is shorter than a record
    pub fn decode(data: &[u8], boot_time: DateTime<Utc>) -> Result<(Self, usize), DecodeError> {
        if data.len() < EVENT_SIZE {
            return Err(DecodeError::MalformedInput { needed: EVENT_SIZE, available: data.len() });
        }

        let head = Block::new(data, 0, header::SIZE);
        let offset_ns = head.u64(header::TIMESTAMP_NS);
        let timestamp = i64::try_from(offset_ns)
            .ok()
            .and_then(|ns| boot_time.checked_add_signed(TimeDelta::nanoseconds(ns)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let command = BpfCmd(head.u32(header::COMMAND));

        let map = MapDescriptor::decode(&Block::new(data, MAP_BLOCK_OFFSET, map_block::SIZE));
        let program =
            ProgramDescriptor::decode(&Block::new(data, PROG_BLOCK_OFFSET, prog_block::SIZE));

        Ok((Self { timestamp, command, map, program }, EVENT_SIZE))
    }
}

impl MapDescriptor {
    /// `None` when the map id is 0 (no map involved)
    fn decode(block: &Block<'_>) -> Option<Self> {
        let id = block.u32(map_block::ID);
        if id == 0 {
            return None;
        }
        Some(Self {
            id,
            map_type: MapType(block.u32(map_block::MAP_TYPE)),
            name: block.name(map_block::NAME),
        })
    }
}

impl ProgramDescriptor {
    /// `None` when the program id is 0 (no program involved)
    fn decode(block: &Block<'_>) -> Option<Self> {
        let id = block.u32(prog_block::ID);
        if id == 0 {
            return None;
        }
        let program_type = ProgramType(block.u32(prog_block::PROG_TYPE));
        Some(Self {
            id,
            program_type,
            attach_type: AttachType::resolve(program_type, block.u32(prog_block::ATTACH_TYPE)),
            helpers: parse_helpers(block.helper_mask(prog_block::HELPERS)),
            name: block.name(prog_block::NAME),
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd:{}", self.command)?;
        if let Some(map) = &self.map {
            write!(f, " map:{map}")?;
        }
        if let Some(program) = &self.program {
            write!(f, " prog:{program}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MapDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{} name:{} type:{}", self.id, self.name, self.map_type)
    }
}

impl fmt::Display for ProgramDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id:{} name:{} type:{} attach_type:{}",
            self.id, self.name, self.program_type, self.attach_type.0
        )?;
        f.write_str(" helpers:[")?;
        for (i, helper) in self.helpers.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{helper}")?;
        }
        f.write_str("]")
    }
}
