//! Core types for the turn codec.

use std::ops::BitOr;

/// Optional parts of a turn file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TurnFeatures(u8);

impl TurnFeatures {
    /// Windows trailer present.
    pub const WINPLAN: u8 = 1 << 0;

    /// Turn wrapped in a Taccom container.
    pub const TACCOM: u8 = 1 << 1;

    /// Creates features from a raw value. Unknown bits are dropped.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw & (Self::WINPLAN | Self::TACCOM))
    }

    /// Returns the raw feature bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// No optional parts.
    #[must_use]
    pub const fn none() -> Self {
        Self(0)
    }

    /// Windows trailer only.
    #[must_use]
    pub const fn winplan() -> Self {
        Self(Self::WINPLAN)
    }

    /// Taccom container only.
    #[must_use]
    pub const fn taccom() -> Self {
        Self(Self::TACCOM)
    }

    /// Returns `true` if the Windows trailer is enabled.
    #[must_use]
    pub const fn has_winplan(self) -> bool {
        self.0 & Self::WINPLAN != 0
    }

    /// Returns `true` if the Taccom container is enabled.
    #[must_use]
    pub const fn has_taccom(self) -> bool {
        self.0 & Self::TACCOM != 0
    }
}

impl BitOr for TurnFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Consistency state of a [`crate::TurnFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Newly authored, never rebuilt.
    Fresh,
    /// Buffer, offsets and checksum agree; safe to write.
    Clean,
    /// Modified since the last rebuild.
    Dirty,
}

/// How much of a turn file to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Header, commands, trailers and attachments.
    #[default]
    Full,
    /// Header (and Taccom container) only; the result is read-only.
    HeaderOnly,
}
