//! Per-command encoding and decoding.
//!
//! A command record is `code: u16 | id: u16 | payload`. These functions
//! do not bounds-check; [`crate::TurnFile`] validates every record before
//! handing its offset out.

use wire::{read_u16, write_u16};

use crate::table::{lookup, other};

/// Size of the code and id fields preceding every payload.
pub const COMMAND_HEADER_SIZE: usize = 4;

/// Reads the command code of the record at `offset`.
#[must_use]
pub fn decode_code(buf: &[u8], offset: usize) -> u16 {
    read_u16(buf, offset)
}

/// Reads the object id of the record at `offset`.
#[must_use]
pub fn decode_id(buf: &[u8], offset: usize) -> u16 {
    read_u16(buf, offset + 2)
}

/// Computes the total record length (header included) of a command.
///
/// - `SendMessage`: the id field holds the payload length.
/// - `SendBack`: a `u16` at record offset 6 holds the payload length; the
///   caller must have checked that 8 bytes are available. A length too
///   short to cover that field is treated as unknown.
/// - Fixed commands: table size.
/// - Unknown or undefined codes: `None`.
#[must_use]
pub fn compute_length(code: u16, buf: &[u8], offset: usize) -> Option<usize> {
    match code {
        other::SEND_MESSAGE => Some(usize::from(decode_id(buf, offset)) + COMMAND_HEADER_SIZE),
        other::SEND_BACK => {
            let size = usize::from(read_u16(buf, offset + 6));
            (size >= 4).then_some(size + COMMAND_HEADER_SIZE)
        }
        _ => lookup(code)?
            .fixed_size
            .map(|size| size + COMMAND_HEADER_SIZE),
    }
}

/// Encodes a command record: code, id, then the payload verbatim.
#[must_use]
pub fn encode_command(code: u16, id: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; COMMAND_HEADER_SIZE + payload.len()];
    write_u16(&mut out, 0, code);
    write_u16(&mut out, 2, id);
    out[COMMAND_HEADER_SIZE..].copy_from_slice(payload);
    out
}

/// Payload length a command with this code and payload must have, if the
/// command's length can be determined from `payload` alone.
///
/// Used to validate commands before they are added to a turn.
#[must_use]
pub fn expected_payload_len(code: u16, id: u16, payload: &[u8]) -> Option<usize> {
    match code {
        other::SEND_MESSAGE => Some(usize::from(id)),
        other::SEND_BACK => {
            if payload.len() < 4 {
                Some(4)
            } else {
                Some(usize::from(read_u16(payload, 2)))
            }
        }
        _ => lookup(code)?.fixed_size,
    }
}
