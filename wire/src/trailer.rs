//! DOS and Windows ("Winplan") trailer layouts.

use crate::bytes::{read_array, read_u32, write_u32};
use crate::error::{ensure_len, DecodeError, Record, WireResult};

/// Number of 32-bit words in the registration key.
pub const KEY_WORDS: usize = 11;

/// Size of the player secret ("templock") in bytes.
pub const PLAYER_SECRET_SIZE: usize = 11;

/// Signature written into new DOS trailers ("TRN\x1A" on disk).
///
/// Placeholder value. The host's signature constant must replace it before
/// files written here are accepted by host software.
pub const DOS_SIGNATURE: u32 = 0x1A4E_5254;

/// DOS trailer size in bytes (63 total).
pub const DOS_TRAILER_SIZE: usize = 4 + 4 * KEY_WORDS + PLAYER_SECRET_SIZE + 4;

/// Magic prefix of the Windows trailer; two ASCII version digits follow.
pub const WINDOWS_MAGIC: [u8; 6] = *b"VER3.5";

/// Length of one encoded registration string.
pub const REG_STRING_SIZE: usize = 20;

/// Number of encoded registration strings in the Windows trailer.
pub const REG_STRING_COUNT: usize = 4;

/// Trailing unused bytes of the Windows trailer.
pub const WINDOWS_PADDING_SIZE: usize = 80;

const WINDOWS_PADDING_OFFSET: usize = 16 + REG_STRING_COUNT * 2 * REG_STRING_SIZE;

/// Windows trailer size in bytes (256 total).
pub const WINDOWS_TRAILER_SIZE: usize =
    WINDOWS_MAGIC.len() + 2 + 8 + REG_STRING_COUNT * 2 * REG_STRING_SIZE + WINDOWS_PADDING_SIZE;

/// Trailer following the turn body in every turn file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DosTrailer {
    /// Turn checksum.
    pub checksum: u32,
    /// Registration key words.
    pub registration_key: [u32; KEY_WORDS],
    /// Player secret.
    pub player_secret: [u8; PLAYER_SECRET_SIZE],
    /// Signature; [`DOS_SIGNATURE`] for files written by this crate.
    pub signature: u32,
}

impl Default for DosTrailer {
    fn default() -> Self {
        Self {
            checksum: 0,
            registration_key: [0; KEY_WORDS],
            player_secret: [0; PLAYER_SECRET_SIZE],
            signature: DOS_SIGNATURE,
        }
    }
}

impl DosTrailer {
    /// Decodes a DOS trailer from the start of `buf`.
    ///
    /// The signature is not validated; files from other clients carry
    /// their own value there.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        ensure_len(buf, DOS_TRAILER_SIZE, Record::DosTrailer)?;
        let mut registration_key = [0u32; KEY_WORDS];
        for (i, word) in registration_key.iter_mut().enumerate() {
            *word = read_u32(buf, 4 + 4 * i);
        }
        Ok(Self {
            checksum: read_u32(buf, 0),
            registration_key,
            player_secret: read_array(buf, 48),
            signature: read_u32(buf, 59),
        })
    }

    /// Encodes the trailer.
    #[must_use]
    pub fn encode(&self) -> [u8; DOS_TRAILER_SIZE] {
        let mut out = [0u8; DOS_TRAILER_SIZE];
        write_u32(&mut out, 0, self.checksum);
        for (i, word) in self.registration_key.iter().enumerate() {
            write_u32(&mut out, 4 + 4 * i, *word);
        }
        out[48..59].copy_from_slice(&self.player_secret);
        write_u32(&mut out, 59, self.signature);
        out
    }
}

/// A registration string stored as cipher text plus its random pad.
///
/// `plain[i] == cipher[i] ^ pad[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodedString {
    pub cipher: [u8; REG_STRING_SIZE],
    pub pad: [u8; REG_STRING_SIZE],
}

impl EncodedString {
    /// Recovers the plain bytes.
    #[must_use]
    pub fn plain(&self) -> [u8; REG_STRING_SIZE] {
        let mut out = [0u8; REG_STRING_SIZE];
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.cipher[i] ^ self.pad[i];
        }
        out
    }
}

/// Optional trailer written by the Windows client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowsTrailer {
    /// Two-digit sub-version (`VER3.5xx`).
    pub version: u8,
    /// Turn-number fingerprint words.
    pub vph_key: [u32; 2],
    /// Encoded registration strings.
    pub reg_strings: [EncodedString; REG_STRING_COUNT],
    /// Unused tail, kept verbatim so parsed trailers re-emit unchanged.
    /// Split in 20-byte rows; zero on new trailers.
    pub padding: [[u8; REG_STRING_SIZE]; WINDOWS_PADDING_SIZE / REG_STRING_SIZE],
}

impl WindowsTrailer {
    /// Creates an empty trailer for the given sub-version.
    #[must_use]
    pub fn new(version: u8) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Returns `true` if `buf` starts with the Windows trailer magic.
    #[must_use]
    pub fn probe(buf: &[u8]) -> bool {
        buf.starts_with(&WINDOWS_MAGIC)
    }

    /// Decodes a Windows trailer from the start of `buf`.
    pub fn decode(buf: &[u8]) -> WireResult<Self> {
        ensure_len(buf, WINDOWS_TRAILER_SIZE, Record::WindowsTrailer)?;
        if !Self::probe(buf) {
            return Err(DecodeError::InvalidMagic {
                record: Record::WindowsTrailer,
            });
        }
        let digits: [u8; 2] = read_array(buf, 6);
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::InvalidVersion { found: digits });
        }
        let version = (digits[0] - b'0') * 10 + (digits[1] - b'0');

        let mut reg_strings = [EncodedString::default(); REG_STRING_COUNT];
        for (i, slot) in reg_strings.iter_mut().enumerate() {
            let base = 16 + i * 2 * REG_STRING_SIZE;
            slot.cipher = read_array(buf, base);
            slot.pad = read_array(buf, base + REG_STRING_SIZE);
        }

        let mut padding = [[0u8; REG_STRING_SIZE]; WINDOWS_PADDING_SIZE / REG_STRING_SIZE];
        for (i, row) in padding.iter_mut().enumerate() {
            *row = read_array(buf, WINDOWS_PADDING_OFFSET + i * REG_STRING_SIZE);
        }

        Ok(Self {
            version,
            vph_key: [read_u32(buf, 8), read_u32(buf, 12)],
            reg_strings,
            padding,
        })
    }

    /// Encodes the trailer. Versions above 99 are clamped.
    #[must_use]
    pub fn encode(&self) -> [u8; WINDOWS_TRAILER_SIZE] {
        let mut out = [0u8; WINDOWS_TRAILER_SIZE];
        let version = self.version.min(99);
        out[..6].copy_from_slice(&WINDOWS_MAGIC);
        out[6] = b'0' + version / 10;
        out[7] = b'0' + version % 10;
        write_u32(&mut out, 8, self.vph_key[0]);
        write_u32(&mut out, 12, self.vph_key[1]);
        for (i, slot) in self.reg_strings.iter().enumerate() {
            let base = 16 + i * 2 * REG_STRING_SIZE;
            out[base..base + REG_STRING_SIZE].copy_from_slice(&slot.cipher);
            out[base + REG_STRING_SIZE..base + 2 * REG_STRING_SIZE].copy_from_slice(&slot.pad);
        }
        for (i, row) in self.padding.iter().enumerate() {
            let base = WINDOWS_PADDING_OFFSET + i * REG_STRING_SIZE;
            out[base..base + REG_STRING_SIZE].copy_from_slice(row);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailer_sizes_are_correct() {
        // checksum(4) + key(44) + secret(11) + signature(4)
        assert_eq!(DOS_TRAILER_SIZE, 63);
        // magic(6) + version(2) + vph(8) + strings(160) + padding(80)
        assert_eq!(WINDOWS_TRAILER_SIZE, 256);
    }

    #[test]
    fn dos_signature_bytes() {
        assert_eq!(&DOS_SIGNATURE.to_le_bytes(), b"TRN\x1A");
        assert_eq!(DosTrailer::default().signature, DOS_SIGNATURE);
    }

    #[test]
    fn dos_trailer_field_offsets() {
        let mut trailer = DosTrailer {
            checksum: 0x1122_3344,
            ..DosTrailer::default()
        };
        trailer.registration_key[10] = 0xAABB_CCDD;
        trailer.player_secret = *b"SECRETWORD!";
        let raw = trailer.encode();
        assert_eq!(&raw[0..4], &[0x44, 0x33, 0x22, 0x11]);
        assert_eq!(&raw[44..48], &[0xDD, 0xCC, 0xBB, 0xAA]);
        assert_eq!(&raw[48..59], b"SECRETWORD!");
        assert_eq!(&raw[59..63], b"TRN\x1A");
        assert_eq!(DosTrailer::decode(&raw).unwrap(), trailer);
    }

    #[test]
    fn windows_trailer_layout() {
        let mut trailer = WindowsTrailer::new(7);
        trailer.vph_key = [0x0102_0304, 0x0A0B_0C0D];
        trailer.reg_strings[1].cipher[0] = 0x55;
        trailer.reg_strings[1].pad[0] = 0x0F;
        let raw = trailer.encode();
        assert_eq!(&raw[0..8], b"VER3.507");
        assert_eq!(&raw[8..12], &[4, 3, 2, 1]);
        assert_eq!(raw[16 + 40], 0x55);
        assert_eq!(raw[16 + 60], 0x0F);
        assert!(raw[176..].iter().all(|&b| b == 0));

        let decoded = WindowsTrailer::decode(&raw).unwrap();
        assert_eq!(decoded, trailer);
        assert_eq!(decoded.reg_strings[1].plain()[0], 0x5A);
    }

    #[test]
    fn windows_trailer_rejects_bad_version_digits() {
        let mut raw = WindowsTrailer::new(1).encode();
        raw[7] = b'x';
        let err = WindowsTrailer::decode(&raw).unwrap_err();
        assert_eq!(err, DecodeError::InvalidVersion { found: [b'0', b'x'] });
    }

    #[test]
    fn windows_trailer_rejects_missing_magic() {
        let raw = [0u8; WINDOWS_TRAILER_SIZE];
        assert!(!WindowsTrailer::probe(&raw));
        assert!(matches!(
            WindowsTrailer::decode(&raw),
            Err(DecodeError::InvalidMagic {
                record: Record::WindowsTrailer
            })
        ));
    }

    #[test]
    fn windows_trailer_keeps_padding() {
        let mut raw = WindowsTrailer::new(2).encode();
        for (i, b) in raw[176..].iter_mut().enumerate() {
            *b = i as u8 ^ 0xA5;
        }
        let decoded = WindowsTrailer::decode(&raw).unwrap();
        assert_eq!(decoded.padding[0][0], 0xA5);
        assert_eq!(decoded.padding[3][19], 79 ^ 0xA5);
        assert_eq!(decoded.encode(), raw);
    }

    #[test]
    fn windows_trailer_version_clamped() {
        let raw = WindowsTrailer::new(250).encode();
        assert_eq!(&raw[6..8], b"99");
    }
}
