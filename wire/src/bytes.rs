//! Little-endian field access over byte slices.
//!
//! Callers guarantee that the addressed range is in bounds; these helpers
//! panic on out-of-range access like ordinary slice indexing.

/// Reads a `u16` at `offset`.
#[must_use]
pub fn read_u16(buf: &[u8], offset: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&buf[offset..offset + 2]);
    u16::from_le_bytes(raw)
}

/// Reads an `i16` at `offset`.
#[must_use]
pub fn read_i16(buf: &[u8], offset: usize) -> i16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&buf[offset..offset + 2]);
    i16::from_le_bytes(raw)
}

/// Reads a `u32` at `offset`.
#[must_use]
pub fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

/// Writes a `u16` at `offset`.
pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Writes a `u32` at `offset`.
pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Copies a fixed-size array out of `buf` at `offset`.
pub(crate) fn read_array<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}
