//! Byte layouts of the turn file format.
//!
//! This crate defines the fixed-size records of a turn file: the turn
//! header, the DOS and Windows trailers, and the optional Taccom container
//! header. It knows nothing about commands or checksums, only where each
//! field lives.
//!
//! # Design Principles
//!
//! - **Bit-exact layout** - Every record is an explicit encode/decode pair over
//!   byte offsets; in-memory struct layout is never written to disk.
//! - **Little-endian** - All multi-byte integers are little-endian.
//! - **Bounded decoding** - Decoders check input length before reading.

mod bytes;
mod error;
mod header;
mod limits;
mod taccom;
mod trailer;

pub use bytes::{read_i16, read_u16, read_u32, write_u16, write_u32};
pub use error::{DecodeError, Record, WireResult};
pub use header::{Timestamp, TurnHeader, TIMESTAMP_SIZE, TURN_HEADER_SIZE};
pub use limits::Limits;
pub use taccom::{
    TaccomHeader, TaccomSlot, TACCOM_HEADER_SIZE, TACCOM_MAGIC, TACCOM_MAX_FILES,
    TACCOM_NAME_SIZE, TACCOM_SLOT_SIZE,
};
pub use trailer::{
    DosTrailer, EncodedString, WindowsTrailer, DOS_SIGNATURE, DOS_TRAILER_SIZE, KEY_WORDS,
    PLAYER_SECRET_SIZE, REG_STRING_COUNT, REG_STRING_SIZE, WINDOWS_MAGIC, WINDOWS_PADDING_SIZE,
    WINDOWS_TRAILER_SIZE,
};
