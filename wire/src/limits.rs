//! Configurable limits for bounded turn file parsing.

/// Limits enforced while parsing and assembling turn files.
///
/// These limits bound memory usage on hostile input. The command ceiling is
/// checked against the header before the address table is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of commands in one turn.
    pub max_commands: usize,

    /// Maximum size of a complete turn file (container included).
    pub max_file_bytes: usize,

    /// Maximum size of a single Taccom attachment.
    pub max_attachment_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Real turns stay far below this; the host rejects larger ones
            max_commands: 10_000,

            max_file_bytes: 16 * 1024 * 1024,
            max_attachment_bytes: 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_commands: 256,
            max_file_bytes: 64 * 1024,
            max_attachment_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_commands: usize::MAX,
            max_file_bytes: usize::MAX,
            max_attachment_bytes: usize::MAX,
        }
    }
}
