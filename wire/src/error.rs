//! Error types for record layout decoding.

use std::fmt;

/// Result type for record layout operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Fixed-size records known to the layout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    TurnHeader,
    DosTrailer,
    WindowsTrailer,
    TaccomHeader,
    Command,
}

/// Errors raised while decoding a fixed-size record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Input is too small to contain the record.
    Truncated {
        record: Record,
        needed: usize,
        available: usize,
    },

    /// Record signature does not match.
    InvalidMagic { record: Record },

    /// Windows trailer sub-version is not two ASCII digits.
    InvalidVersion { found: [u8; 2] },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TurnHeader => "turn header",
            Self::DosTrailer => "DOS trailer",
            Self::WindowsTrailer => "Windows trailer",
            Self::TaccomHeader => "Taccom header",
            Self::Command => "command record",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                record,
                needed,
                available,
            } => {
                write!(
                    f,
                    "truncated {record}: need {needed} bytes, have {available}"
                )
            }
            Self::InvalidMagic { record } => write!(f, "invalid {record} signature"),
            Self::InvalidVersion { found } => {
                write!(
                    f,
                    "invalid Windows trailer version bytes: 0x{:02X} 0x{:02X}",
                    found[0], found[1]
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Checks that `buf` holds at least `needed` bytes for `record`.
pub(crate) fn ensure_len(buf: &[u8], needed: usize, record: Record) -> WireResult<()> {
    if buf.len() < needed {
        return Err(DecodeError::Truncated {
            record,
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}
