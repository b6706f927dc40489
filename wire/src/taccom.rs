//! Taccom container header layout.

use crate::bytes::{read_array, read_u32, write_u32};
use crate::error::{ensure_len, DecodeError, Record, WireResult};

/// Magic string opening a Taccom container.
pub const TACCOM_MAGIC: [u8; 10] = *b"NCC1701AD9";

/// Maximum number of attachment slots.
pub const TACCOM_MAX_FILES: usize = 40;

/// Size of an attachment name field.
pub const TACCOM_NAME_SIZE: usize = 12;

/// Size of one attachment slot descriptor.
pub const TACCOM_SLOT_SIZE: usize = TACCOM_NAME_SIZE + 4 + 4;

/// Taccom header size in bytes (818 total).
pub const TACCOM_HEADER_SIZE: usize =
    TACCOM_MAGIC.len() + 4 + 4 + TACCOM_MAX_FILES * TACCOM_SLOT_SIZE;

/// One attachment descriptor. Addresses are 1-based file positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaccomSlot {
    pub name: [u8; TACCOM_NAME_SIZE],
    pub address: u32,
    pub length: u32,
}

impl TaccomSlot {
    /// Returns `true` if the slot is unused (all-zero name).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.iter().all(|&b| b == 0)
    }

    /// Name bytes up to the first NUL.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TACCOM_NAME_SIZE);
        &self.name[..end]
    }
}

/// Taccom container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaccomHeader {
    /// 1-based position of the turn body.
    pub turn_address: u32,
    /// Size of the turn body including its trailers.
    pub turn_size: u32,
    pub slots: [TaccomSlot; TACCOM_MAX_FILES],
}

impl Default for TaccomHeader {
    fn default() -> Self {
        Self {
            turn_address: 0,
            turn_size: 0,
            slots: [TaccomSlot::default(); TACCOM_MAX_FILES],
        }
    }
}

impl TaccomHeader {
    /// Returns `true` if `buf` starts with the Taccom magic.
    #[must_use]
    pub fn probe(buf: &[u8]) -> bool {
        buf.starts_with(&TACCOM_MAGIC)
    }

    /// Decodes a Taccom header from the start of `buf`.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        ensure_len(buf, TACCOM_HEADER_SIZE, Record::TaccomHeader)?;
        if !Self::probe(buf) {
            return Err(DecodeError::InvalidMagic {
                record: Record::TaccomHeader,
            });
        }
        let mut header = Self {
            turn_address: read_u32(buf, 10),
            turn_size: read_u32(buf, 14),
            ..Self::default()
        };
        for (i, slot) in header.slots.iter_mut().enumerate() {
            let base = 18 + i * TACCOM_SLOT_SIZE;
            slot.name = read_array(buf, base);
            slot.address = read_u32(buf, base + TACCOM_NAME_SIZE);
            slot.length = read_u32(buf, base + TACCOM_NAME_SIZE + 4);
        }
        Ok(header)
    }

    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; TACCOM_HEADER_SIZE];
        out[..10].copy_from_slice(&TACCOM_MAGIC);
        write_u32(&mut out, 10, self.turn_address);
        write_u32(&mut out, 14, self.turn_size);
        for (i, slot) in self.slots.iter().enumerate() {
            let base = 18 + i * TACCOM_SLOT_SIZE;
            out[base..base + TACCOM_NAME_SIZE].copy_from_slice(&slot.name);
            write_u32(&mut out, base + TACCOM_NAME_SIZE, slot.address);
            write_u32(&mut out, base + TACCOM_NAME_SIZE + 4, slot.length);
        }
        out
    }

    /// Number of used attachment slots.
    #[must_use]
    pub fn num_files(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }
}
