//! Taccom container: a turn body bundled with named attachments.

use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;

use wire::{
    Limits, TaccomHeader, TACCOM_HEADER_SIZE, TACCOM_MAGIC, TACCOM_MAX_FILES, TACCOM_NAME_SIZE,
};

use crate::error::{LimitKind, Region, TurnError, TurnResult};

/// Returns `true` if the stream starts with the Taccom magic.
///
/// The stream position is restored afterwards.
pub fn probe<S: Read + Seek>(stream: &mut S) -> io::Result<bool> {
    let start = stream.stream_position()?;
    let mut magic = [0u8; TACCOM_MAGIC.len()];
    let mut filled = 0;
    while filled < magic.len() {
        match stream.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    stream.seek(SeekFrom::Start(start))?;
    Ok(filled == magic.len() && magic == TACCOM_MAGIC)
}

/// Returns `true` if `bytes` starts with the Taccom magic.
#[must_use]
pub fn is_taccom(bytes: &[u8]) -> bool {
    TaccomHeader::probe(bytes)
}

/// A named attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    name: [u8; TACCOM_NAME_SIZE],
    data: Vec<u8>,
}

impl Attachment {
    /// Name bytes without NUL padding.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TACCOM_NAME_SIZE);
        &self.name[..end]
    }

    /// Attachment content.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Attachment table plus the placement written by the last rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaccomContainer {
    slots: Vec<Option<Attachment>>,
    header: TaccomHeader,
}

impl Default for TaccomContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl TaccomContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![None; TACCOM_MAX_FILES],
            header: TaccomHeader::default(),
        }
    }

    /// Parses a container, returning it with the byte range of the turn body.
    ///
    /// Every address/length pair must lie within `file`.
    pub fn parse(file: &[u8], limits: &Limits) -> TurnResult<(Self, Range<usize>)> {
        let header = TaccomHeader::decode(file)?;
        let turn = checked_range(
            Region::TurnBody,
            header.turn_address,
            header.turn_size,
            file.len(),
        )?;

        let mut container = Self {
            slots: vec![None; TACCOM_MAX_FILES],
            header,
        };
        for (index, slot) in header.slots.iter().enumerate() {
            if slot.is_empty() {
                continue;
            }
            let range = checked_range(
                Region::Attachment { slot: index },
                slot.address,
                slot.length,
                file.len(),
            )?;
            if range.len() > limits.max_attachment_bytes {
                return Err(TurnError::LimitsExceeded {
                    kind: LimitKind::AttachmentBytes,
                    limit: limits.max_attachment_bytes,
                    actual: range.len(),
                });
            }
            container.slots[index] = Some(Attachment {
                name: slot.name,
                data: file[range].to_vec(),
            });
        }
        Ok((container, turn))
    }

    /// Stores an attachment in the first free slot and returns its index.
    pub fn add_file(&mut self, data: &[u8], name: &[u8], limits: &Limits) -> TurnResult<usize> {
        if name.is_empty() || name.len() > TACCOM_NAME_SIZE || name.contains(&0) {
            return Err(TurnError::InvalidFileName);
        }
        if data.len() > limits.max_attachment_bytes {
            return Err(TurnError::LimitsExceeded {
                kind: LimitKind::AttachmentBytes,
                limit: limits.max_attachment_bytes,
                actual: data.len(),
            });
        }
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(TurnError::ContainerFull)?;
        let mut padded = [0u8; TACCOM_NAME_SIZE];
        padded[..name.len()].copy_from_slice(name);
        self.slots[index] = Some(Attachment {
            name: padded,
            data: data.to_vec(),
        });
        Ok(index)
    }

    /// Empties a slot. Space is reclaimed on the next rebuild.
    pub fn remove_file(&mut self, slot: usize) -> TurnResult<()> {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.is_some() => {
                *entry = None;
                Ok(())
            }
            _ => Err(TurnError::NoSuchFile { slot }),
        }
    }

    /// Number of attachments.
    #[must_use]
    pub fn num_files(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns the attachment in `slot`.
    #[must_use]
    pub fn file(&self, slot: usize) -> Option<&Attachment> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// 1-based address and size of the attachment in `slot`, as of the
    /// last parse or rebuild.
    #[must_use]
    pub fn placement(&self, slot: usize) -> Option<(u32, u32)> {
        let entry = self.header.slots.get(slot)?;
        (!entry.is_empty()).then_some((entry.address, entry.length))
    }

    /// 1-based address and size of the turn body.
    #[must_use]
    pub const fn locate_turn_body(&self) -> (u32, u32) {
        (self.header.turn_address, self.header.turn_size)
    }

    /// Recomputes placement for a turn body of `turn_len` bytes.
    pub fn relayout(&mut self, turn_len: usize) {
        self.header = self.layout(turn_len);
    }

    /// Assembles the container around `turn`.
    ///
    /// Layout: header, turn body, then attachments in slot order.
    #[must_use]
    pub fn assemble(&self, turn: &[u8]) -> Vec<u8> {
        let mut out = self.layout(turn.len()).encode();
        out.extend_from_slice(turn);
        for file in self.slots.iter().flatten() {
            out.extend_from_slice(&file.data);
        }
        out
    }

    fn layout(&self, turn_len: usize) -> TaccomHeader {
        let mut header = TaccomHeader {
            turn_address: (TACCOM_HEADER_SIZE + 1) as u32,
            turn_size: turn_len as u32,
            ..TaccomHeader::default()
        };
        let mut position = TACCOM_HEADER_SIZE + turn_len;
        for (entry, slot) in header.slots.iter_mut().zip(&self.slots) {
            if let Some(file) = slot {
                entry.name = file.name;
                entry.address = (position + 1) as u32;
                entry.length = file.data.len() as u32;
                position += file.data.len();
            }
        }
        header
    }
}

fn checked_range(
    region: Region,
    address: u32,
    length: u32,
    file_len: usize,
) -> TurnResult<Range<usize>> {
    let out_of_bounds = || TurnError::OutOfBounds {
        region,
        address: u64::from(address),
        length: u64::from(length),
        file_len,
    };
    let start = (address as usize).checked_sub(1).ok_or_else(out_of_bounds)?;
    let end = start
        .checked_add(length as usize)
        .filter(|&end| end <= file_len)
        .ok_or_else(out_of_bounds)?;
    Ok(start..end)
}
