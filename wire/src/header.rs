//! Turn header layout and the opaque game timestamp.

use crate::bytes::{read_array, read_i16, read_u16, read_u32, write_u16, write_u32};
use crate::error::{ensure_len, Record, WireResult};

/// Size of the raw timestamp in bytes.
pub const TIMESTAMP_SIZE: usize = 18;

/// Turn header size in bytes (30 total).
pub const TURN_HEADER_SIZE: usize = 2 + TIMESTAMP_SIZE + 2 + 4 + 4;

/// Opaque game timestamp as written by the host ("MM-DD-YYYYHH:MM:SS").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp([u8; TIMESTAMP_SIZE]);

impl Timestamp {
    /// Creates a timestamp from its raw bytes.
    #[must_use]
    pub const fn from_raw(raw: [u8; TIMESTAMP_SIZE]) -> Self {
        Self(raw)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn raw(&self) -> &[u8; TIMESTAMP_SIZE] {
        &self.0
    }

    /// Byte sum of the timestamp, as stored in the turn header.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        self.0
            .iter()
            .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
    }

    /// Returns the timestamp as text if it is printable ASCII.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if self.0.iter().all(|b| (0x20..0x7F).contains(b)) {
            std::str::from_utf8(&self.0).ok()
        } else {
            None
        }
    }
}

/// Turn header.
///
/// | off | size | field            |
/// |-----|------|------------------|
/// | 0   | 2    | player id        |
/// | 2   | 18   | timestamp        |
/// | 20  | 2    | timestamp checksum |
/// | 22  | 4    | command count    |
/// | 26  | 4    | unused           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnHeader {
    pub player_id: i16,
    pub timestamp: Timestamp,
    pub time_checksum: u16,
    pub num_commands: u32,
    pub unused: u32,
}

impl TurnHeader {
    /// Creates a header with a matching timestamp checksum.
    #[must_use]
    pub fn new(player_id: i16, timestamp: Timestamp, num_commands: u32) -> Self {
        Self {
            player_id,
            timestamp,
            time_checksum: timestamp.checksum(),
            num_commands,
            unused: 0,
        }
    }

    /// Decodes a header from the start of `buf`.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        ensure_len(buf, TURN_HEADER_SIZE, Record::TurnHeader)?;
        Ok(Self {
            player_id: read_i16(buf, 0),
            timestamp: Timestamp(read_array(buf, 2)),
            time_checksum: read_u16(buf, 20),
            num_commands: read_u32(buf, 22),
            unused: read_u32(buf, 26),
        })
    }

    /// Encodes the header.
    #[must_use]
    pub fn encode(&self) -> [u8; TURN_HEADER_SIZE] {
        let mut out = [0u8; TURN_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.player_id.to_le_bytes());
        out[2..20].copy_from_slice(self.timestamp.raw());
        write_u16(&mut out, 20, self.time_checksum);
        write_u32(&mut out, 22, self.num_commands);
        write_u32(&mut out, 26, self.unused);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> Timestamp {
        Timestamp::from_raw(*b"04-12-202312:00:07")
    }

    #[test]
    fn header_size_is_correct() {
        // player(2) + timestamp(18) + time_checksum(2) + num_commands(4) + unused(4)
        assert_eq!(TURN_HEADER_SIZE, 30);
    }

    #[test]
    fn timestamp_checksum_is_byte_sum() {
        let ts = Timestamp::from_raw([1; TIMESTAMP_SIZE]);
        assert_eq!(ts.checksum(), 18);
        let ts = Timestamp::from_raw([0xFF; TIMESTAMP_SIZE]);
        assert_eq!(ts.checksum(), 18 * 0xFF);
    }

    #[test]
    fn timestamp_text_only_when_printable() {
        assert_eq!(stamp().as_text(), Some("04-12-202312:00:07"));
        assert_eq!(Timestamp::default().as_text(), None);
    }

    #[test]
    fn header_new_fills_checksum() {
        let header = TurnHeader::new(3, stamp(), 0);
        assert_eq!(header.time_checksum, stamp().checksum());
        assert_eq!(header.unused, 0);
    }

    #[test]
    fn header_field_offsets() {
        let header = TurnHeader {
            player_id: -2,
            timestamp: stamp(),
            time_checksum: 0xA1B2,
            num_commands: 0x0102_0304,
            unused: 0xCAFE_F00D,
        };
        let raw = header.encode();
        assert_eq!(&raw[0..2], &[0xFE, 0xFF]);
        assert_eq!(&raw[2..20], stamp().raw());
        assert_eq!(&raw[20..22], &[0xB2, 0xA1]);
        assert_eq!(&raw[22..26], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&raw[26..30], &[0x0D, 0xF0, 0xFE, 0xCA]);
        assert_eq!(TurnHeader::decode(&raw).unwrap(), header);
    }

    #[test]
    fn header_decode_rejects_short_input() {
        let err = TurnHeader::decode(&[0u8; 29]).unwrap_err();
        assert!(matches!(
            err,
            crate::DecodeError::Truncated {
                record: Record::TurnHeader,
                needed: 30,
                available: 29
            }
        ));
    }

    #[test]
    fn header_const_sized_timestamp() {
        const TS: Timestamp = Timestamp::from_raw([b'0'; TIMESTAMP_SIZE]);
        assert_eq!(TS.raw().len(), TIMESTAMP_SIZE);
    }
}
