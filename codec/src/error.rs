//! Error types for turn file operations.

use std::fmt;
use std::io;

/// Result type for turn file operations.
pub type TurnResult<T> = Result<T, TurnError>;

/// Errors raised while parsing, mutating or writing a turn file.
///
/// Format errors only occur while constructing a [`crate::TurnFile`] from a
/// stream; misuse errors reject an operation without changing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Record layout error.
    Wire(wire::DecodeError),

    /// Stream I/O failed.
    Io { kind: io::ErrorKind, message: String },

    /// Input is shorter than the structures it claims to contain.
    Truncated { needed: usize, available: usize },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// An address/length pair points outside the file.
    OutOfBounds {
        region: Region,
        address: u64,
        length: u64,
        file_len: usize,
    },

    /// Two command records share bytes.
    OverlappingCommands { first: usize, second: usize },

    /// `write` called before `update`.
    WriteWhileDirty,

    /// Operation needs a fully parsed turn.
    HeaderOnly,

    /// All attachment slots are in use.
    ContainerFull,

    /// Command index out of range.
    NoSuchCommand { index: usize, count: usize },

    /// Attachment slot is empty or out of range.
    NoSuchFile { slot: usize },

    /// Attachment name is empty, too long or contains NUL.
    InvalidFileName,

    /// Command code has no known length.
    UnknownCommand { code: u16 },

    /// Payload does not have the size the command requires.
    PayloadSize {
        code: u16,
        expected: usize,
        actual: usize,
    },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    Commands,
    FileBytes,
    AttachmentBytes,
}

/// Part of a turn file referenced by an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    TurnBody,
    Attachment { slot: usize },
    Command { index: usize },
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "layout error: {e}"),
            Self::Io { kind, message } => write!(f, "i/o error ({kind:?}): {message}"),
            Self::Truncated { needed, available } => {
                write!(f, "file truncated: need {needed} bytes, have {available}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::OutOfBounds {
                region,
                address,
                length,
                file_len,
            } => {
                write!(
                    f,
                    "{region} at {address} ({length} bytes) exceeds file of {file_len} bytes"
                )
            }
            Self::OverlappingCommands { first, second } => {
                write!(f, "commands {first} and {second} overlap")
            }
            Self::WriteWhileDirty => write!(f, "turn modified since last update"),
            Self::HeaderOnly => write!(f, "turn was parsed header-only"),
            Self::ContainerFull => write!(f, "no free attachment slot"),
            Self::NoSuchCommand { index, count } => {
                write!(f, "command index {index} out of range ({count} commands)")
            }
            Self::NoSuchFile { slot } => write!(f, "no attachment in slot {slot}"),
            Self::InvalidFileName => write!(f, "invalid attachment name"),
            Self::UnknownCommand { code } => write!(f, "unknown command code {code}"),
            Self::PayloadSize {
                code,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "command {code} needs {expected} payload bytes, got {actual}"
                )
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Commands => "command count",
            Self::FileBytes => "file bytes",
            Self::AttachmentBytes => "attachment bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnBody => write!(f, "turn body"),
            Self::Attachment { slot } => write!(f, "attachment {slot}"),
            Self::Command { index } => write!(f, "command {index}"),
        }
    }
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wire::DecodeError> for TurnError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<io::Error> for TurnError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
