//! Text encoding for registration strings and attachment names.

/// Converts between text and the game's single-byte character set.
pub trait Charset {
    /// Encodes text; characters without a mapping become `?`.
    fn encode(&self, text: &str) -> Vec<u8>;

    /// Decodes bytes to text.
    fn decode(&self, bytes: &[u8]) -> String;
}

/// ISO 8859-1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1Charset;

impl Charset for Latin1Charset {
    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}
