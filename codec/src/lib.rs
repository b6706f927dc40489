//! Turn file codec.
//!
//! This is the main crate that ties the `wire` record layouts together into
//! a complete turn file: the command stream, the turn checksum, the
//! registration trailers and the optional Taccom container.
//!
//! # Features
//!
//! - Full and header-only parsing from any `Read + Seek` stream
//! - Command authoring, deletion and canonical sorting
//! - Turn checksum computed over the rebuilt body
//! - Registration key obfuscation and turn-number recovery
//! - Taccom attachments
//!
//! # Design Principles
//!
//! - **Correctness first** - Every address and length is bounds-checked on
//!   parse; malformed input is an error, never a panic.
//! - **Single rebuild point** - Mutations mark the turn dirty and
//!   [`TurnFile::update`] rebuilds buffer, offsets and checksum together.
//! - **Deterministic** - Same inputs produce the same bytes, including the
//!   obfuscated registration fields.

mod charset;
mod checksum;
mod command;
mod compare;
mod error;
mod registration;
mod table;
mod taccom;
mod turn;
mod types;

pub use charset::{Charset, Latin1Charset};
pub use checksum::{byte_sum, turn_checksum, TIME_CHECKSUM_FACTOR, TURN_CHECKSUM_BIAS};
pub use command::{
    compute_length, decode_code, decode_id, encode_command, expected_payload_len,
    COMMAND_HEADER_SIZE,
};
pub use compare::{compare_commands, sort_offsets};
pub use error::{LimitKind, Region, TurnError, TurnResult};
pub use registration::{
    decode_registration_line, encode_registration, try_recover_turn_number, EncodedRegistration,
    KeyLine, Prng, RegistrationKey, StaticRegistrationKey, WindowsFields, MAGIC_NUMBERS,
};
pub use table::{
    base, command_name, command_type, lookup, other, planet, ship, CommandInfo, CommandType,
    NUM_COMMAND_CODES,
};
pub use taccom::{is_taccom, probe as probe_taccom, Attachment, TaccomContainer};
pub use turn::{TurnFile, DEFAULT_VERSION};
pub use types::{ParseMode, TurnFeatures, TurnState};
pub use wire::{Limits, Timestamp};
