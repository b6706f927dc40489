//! Turn checksum.

/// Multiplier applied to the timestamp checksum.
pub const TIME_CHECKSUM_FACTOR: u32 = 3;

/// Constant added to every turn checksum.
pub const TURN_CHECKSUM_BIAS: u32 = 13;

/// Sum of all bytes plus `seed`, modulo 2^32.
#[must_use]
pub fn byte_sum(bytes: &[u8], seed: u32) -> u32 {
    bytes
        .iter()
        .fold(seed, |acc, &b| acc.wrapping_add(u32::from(b)))
}

/// Checksum stored in the DOS trailer.
///
/// `body` is the turn body (header, address table, command records).
#[must_use]
pub fn turn_checksum(body: &[u8], time_checksum: u16) -> u32 {
    byte_sum(body, 0)
        .wrapping_add(TIME_CHECKSUM_FACTOR.wrapping_mul(u32::from(time_checksum)))
        .wrapping_add(TURN_CHECKSUM_BIAS)
}
