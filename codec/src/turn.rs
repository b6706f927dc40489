//! The turn file facade.
//!
//! [`TurnFile`] owns the turn body buffer and the parallel table of command
//! offsets. Mutations only touch that buffer and mark the turn dirty;
//! [`TurnFile::update`] is the single point where a canonical buffer,
//! offset table, header and trailer checksum are rebuilt together.

use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, warn};
use wire::{
    read_u32, write_u16, DosTrailer, Limits, TaccomHeader, Timestamp, TurnHeader, WindowsTrailer,
    DOS_SIGNATURE, DOS_TRAILER_SIZE, PLAYER_SECRET_SIZE, TURN_HEADER_SIZE, WINDOWS_TRAILER_SIZE,
};

use crate::charset::Charset;
use crate::checksum::turn_checksum;
use crate::command::{
    compute_length, decode_code, decode_id, encode_command, expected_payload_len,
    COMMAND_HEADER_SIZE,
};
use crate::compare::sort_offsets;
use crate::error::{LimitKind, Region, TurnError, TurnResult};
use crate::registration::{encode_registration, try_recover_turn_number, RegistrationKey};
use crate::table::{command_name, command_type, other, CommandType};
use crate::taccom::TaccomContainer;
use crate::types::{ParseMode, TurnFeatures, TurnState};

/// Windows trailer sub-version used for new turns.
pub const DEFAULT_VERSION: u8 = 1;

/// A turn file: header, command stream, trailers and optional container.
#[derive(Debug, Clone)]
pub struct TurnFile {
    header: TurnHeader,
    /// Turn body: header image, address table, command records.
    data: Vec<u8>,
    /// Offsets of command records in `data`, in submission order.
    offsets: Vec<usize>,
    dos_trailer: DosTrailer,
    windows_trailer: Option<WindowsTrailer>,
    taccom: Option<TaccomContainer>,
    version: u8,
    state: TurnState,
    header_only: bool,
    limits: Limits,
}

impl TurnFile {
    /// Creates an empty turn for authoring.
    #[must_use]
    pub fn new(player_id: i16, timestamp: Timestamp) -> Self {
        Self::with_limits(player_id, timestamp, Limits::default())
    }

    /// Creates an empty turn that enforces the given limits on mutation.
    #[must_use]
    pub fn with_limits(player_id: i16, timestamp: Timestamp, limits: Limits) -> Self {
        let header = TurnHeader::new(player_id, timestamp, 0);
        Self {
            header,
            data: header.encode().to_vec(),
            offsets: Vec::new(),
            dos_trailer: DosTrailer::default(),
            windows_trailer: None,
            taccom: None,
            version: DEFAULT_VERSION,
            state: TurnState::Fresh,
            header_only: false,
            limits,
        }
    }

    /// Parses a turn file from the current stream position to its end.
    pub fn read<S: Read + Seek>(
        stream: &mut S,
        mode: ParseMode,
        limits: &Limits,
    ) -> TurnResult<Self> {
        let start = stream.stream_position()?;
        let end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(start))?;

        let size = usize::try_from(end.saturating_sub(start)).unwrap_or(usize::MAX);
        if size > limits.max_file_bytes {
            return Err(TurnError::LimitsExceeded {
                kind: LimitKind::FileBytes,
                limit: limits.max_file_bytes,
                actual: size,
            });
        }
        let mut file = vec![0u8; size];
        stream.read_exact(&mut file)?;
        Self::from_bytes(&file, mode, limits)
    }

    /// Parses a turn file held in memory.
    pub fn from_bytes(file: &[u8], mode: ParseMode, limits: &Limits) -> TurnResult<Self> {
        if file.len() > limits.max_file_bytes {
            return Err(TurnError::LimitsExceeded {
                kind: LimitKind::FileBytes,
                limit: limits.max_file_bytes,
                actual: file.len(),
            });
        }

        let (taccom, turn) = if TaccomHeader::probe(file) {
            let (container, range) = TaccomContainer::parse(file, limits)?;
            (Some(container), &file[range])
        } else {
            (None, file)
        };

        let header = TurnHeader::decode(turn)?;
        let count = header.num_commands as usize;
        if count > limits.max_commands {
            return Err(TurnError::LimitsExceeded {
                kind: LimitKind::Commands,
                limit: limits.max_commands,
                actual: count,
            });
        }

        let mut parsed = Self {
            header,
            data: header.encode().to_vec(),
            offsets: Vec::new(),
            dos_trailer: DosTrailer::default(),
            windows_trailer: None,
            taccom,
            version: DEFAULT_VERSION,
            state: TurnState::Clean,
            header_only: mode == ParseMode::HeaderOnly,
            limits: limits.clone(),
        };
        if parsed.header_only {
            debug!(
                player = header.player_id,
                commands = count,
                "parsed turn header"
            );
            return Ok(parsed);
        }

        let (offsets, body_end) = scan_commands(turn, count)?;
        let dos_trailer = DosTrailer::decode(&turn[body_end..])?;
        let rest = &turn[body_end + DOS_TRAILER_SIZE..];
        let windows_trailer = if WindowsTrailer::probe(rest) {
            Some(WindowsTrailer::decode(rest)?)
        } else {
            None
        };

        parsed.data = turn[..body_end].to_vec();
        parsed.offsets = offsets;
        parsed.dos_trailer = dos_trailer;
        if let Some(trailer) = &windows_trailer {
            parsed.version = trailer.version;
        }
        parsed.windows_trailer = windows_trailer;

        debug!(
            player = header.player_id,
            commands = count,
            body_bytes = body_end,
            winplan = parsed.windows_trailer.is_some(),
            taccom = parsed.taccom.is_some(),
            "parsed turn file"
        );
        Ok(parsed)
    }

    // Header and trailers

    /// Returns the turn header.
    ///
    /// The command count is only current after [`Self::update`].
    #[must_use]
    pub const fn header(&self) -> &TurnHeader {
        &self.header
    }

    /// Returns the player id.
    #[must_use]
    pub const fn player_id(&self) -> i16 {
        self.header.player_id
    }

    /// Returns the game timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> &Timestamp {
        &self.header.timestamp
    }

    /// Returns the DOS trailer.
    #[must_use]
    pub const fn dos_trailer(&self) -> &DosTrailer {
        &self.dos_trailer
    }

    /// Returns the Windows trailer, if the Winplan feature is set.
    #[must_use]
    pub const fn windows_trailer(&self) -> Option<&WindowsTrailer> {
        self.windows_trailer.as_ref()
    }

    /// Returns the active features.
    #[must_use]
    pub fn features(&self) -> TurnFeatures {
        let mut features = TurnFeatures::none();
        if self.windows_trailer.is_some() {
            features = features | TurnFeatures::winplan();
        }
        if self.taccom.is_some() {
            features = features | TurnFeatures::taccom();
        }
        features
    }

    /// Returns the Windows trailer sub-version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Returns the consistency state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Returns `true` if only the header was parsed.
    #[must_use]
    pub const fn is_header_only(&self) -> bool {
        self.header_only
    }

    /// Recovers the turn number from the Windows trailer; 0 if unknown.
    #[must_use]
    pub fn try_get_turn_nr(&self) -> u16 {
        self.windows_trailer
            .as_ref()
            .and_then(try_recover_turn_number)
            .unwrap_or(0)
    }

    /// Computes the checksum of the current turn body.
    #[must_use]
    pub fn compute_turn_checksum(&self) -> u32 {
        turn_checksum(&self.data, self.header.time_checksum)
    }

    // Commands

    /// Number of commands, including deleted ones not yet stripped.
    ///
    /// A header-only parse reports the header's count.
    #[must_use]
    pub fn num_commands(&self) -> usize {
        if self.header_only {
            self.header.num_commands as usize
        } else {
            self.offsets.len()
        }
    }

    /// Returns the code of command `index`.
    #[must_use]
    pub fn command_code(&self, index: usize) -> Option<u16> {
        self.offsets
            .get(index)
            .map(|&offset| decode_code(&self.data, offset))
    }

    /// Returns the object id of command `index`.
    #[must_use]
    pub fn command_id(&self, index: usize) -> Option<u16> {
        self.offsets
            .get(index)
            .map(|&offset| decode_id(&self.data, offset))
    }

    /// Returns the category of command `index`.
    #[must_use]
    pub fn command_type(&self, index: usize) -> Option<CommandType> {
        self.command_code(index).map(command_type)
    }

    /// Returns the symbolic name of command `index`.
    #[must_use]
    pub fn command_name(&self, index: usize) -> Option<&'static str> {
        self.command_code(index).map(command_name)
    }

    /// Returns the record length (header included) of command `index`.
    ///
    /// `None` for out-of-range indexes and commands of unknown length.
    #[must_use]
    pub fn command_length(&self, index: usize) -> Option<usize> {
        let offset = *self.offsets.get(index)?;
        compute_length(decode_code(&self.data, offset), &self.data, offset)
    }

    /// Returns the position of command `index` within the turn body.
    #[must_use]
    pub fn command_position(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Returns the payload of command `index`.
    #[must_use]
    pub fn command_data(&self, index: usize) -> Option<&[u8]> {
        let offset = *self.offsets.get(index)?;
        let length = self.command_length(index)?;
        Some(&self.data[offset + COMMAND_HEADER_SIZE..offset + length])
    }

    /// Number of consecutive commands starting at `index` that address the
    /// same object (same category and id).
    #[must_use]
    pub fn command_run_length(&self, index: usize) -> usize {
        let (Some(kind), Some(id)) = (self.command_type(index), self.command_id(index)) else {
            return 0;
        };
        (index..self.offsets.len())
            .take_while(|&i| self.command_type(i) == Some(kind) && self.command_id(i) == Some(id))
            .count()
    }

    /// Appends a command and returns its index.
    ///
    /// The payload must have the size the command code requires; for
    /// `SendMessage` the id is the payload length, for `SendBack` the
    /// second payload word is.
    pub fn add_command(&mut self, code: u16, id: u16, payload: &[u8]) -> TurnResult<usize> {
        self.ensure_full()?;
        let expected =
            expected_payload_len(code, id, payload).ok_or(TurnError::UnknownCommand { code })?;
        if expected != payload.len() {
            return Err(TurnError::PayloadSize {
                code,
                expected,
                actual: payload.len(),
            });
        }
        if self.offsets.len() >= self.limits.max_commands {
            return Err(TurnError::LimitsExceeded {
                kind: LimitKind::Commands,
                limit: self.limits.max_commands,
                actual: self.offsets.len() + 1,
            });
        }

        self.offsets.push(self.data.len());
        self.data.extend(encode_command(code, id, payload));
        self.state = TurnState::Dirty;
        Ok(self.offsets.len() - 1)
    }

    /// Deletes command `index`.
    ///
    /// The record stays in place with its code zeroed; it keeps its index
    /// until the next [`Self::update`] strips it.
    pub fn delete_command(&mut self, index: usize) -> TurnResult<()> {
        self.ensure_full()?;
        let offset = *self.offsets.get(index).ok_or(TurnError::NoSuchCommand {
            index,
            count: self.offsets.len(),
        })?;
        write_u16(&mut self.data, offset, 0);
        self.state = TurnState::Dirty;
        Ok(())
    }

    /// Stable-sorts the commands into canonical order.
    pub fn sort_commands(&mut self) -> TurnResult<()> {
        self.ensure_full()?;
        sort_offsets(&self.data, &mut self.offsets);
        self.state = TurnState::Dirty;
        Ok(())
    }

    // Setters

    /// Replaces the timestamp and its checksum.
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.header.timestamp = timestamp;
        self.header.time_checksum = timestamp.checksum();
        self.data[..TURN_HEADER_SIZE].copy_from_slice(&self.header.encode());
        self.state = TurnState::Dirty;
    }

    /// Sets the Windows trailer sub-version (0..=99).
    pub fn set_version(&mut self, version: u8) {
        self.version = version.min(99);
        if let Some(trailer) = &mut self.windows_trailer {
            trailer.version = self.version;
        }
        self.state = TurnState::Dirty;
    }

    /// Enables or disables the Windows trailer and the Taccom container.
    ///
    /// Disabling Taccom discards all attachments.
    pub fn set_features(&mut self, features: TurnFeatures) {
        match (features.has_winplan(), self.windows_trailer.is_some()) {
            (true, false) => self.windows_trailer = Some(WindowsTrailer::new(self.version)),
            (false, true) => self.windows_trailer = None,
            _ => {}
        }
        match (features.has_taccom(), self.taccom.is_some()) {
            (true, false) => self.taccom = Some(TaccomContainer::new()),
            (false, true) => self.taccom = None,
            _ => {}
        }
        self.state = TurnState::Dirty;
    }

    /// Sets the player secret stored in the DOS trailer.
    pub fn set_player_secret(&mut self, secret: [u8; PLAYER_SECRET_SIZE]) {
        self.dos_trailer.player_secret = secret;
        self.state = TurnState::Dirty;
    }

    /// Stores a registration key for the given turn number.
    ///
    /// The Windows trailer fields are only written while the Winplan
    /// feature is set; enable it first.
    pub fn set_registration_key(
        &mut self,
        key: &dyn RegistrationKey,
        charset: &dyn Charset,
        turn_nr: u16,
    ) {
        let encoded = encode_registration(
            key,
            charset,
            self.header.player_id,
            turn_nr,
            self.windows_trailer.is_some(),
        );
        self.dos_trailer.registration_key = encoded.key_words;
        if let (Some(trailer), Some(fields)) = (&mut self.windows_trailer, &encoded.windows) {
            fields.apply(trailer);
        }
        self.state = TurnState::Dirty;
    }

    // Attachments

    /// Returns `true` if the turn is wrapped in a Taccom container.
    #[must_use]
    pub const fn is_taccom(&self) -> bool {
        self.taccom.is_some()
    }

    /// Attaches a file, enabling the Taccom feature if needed.
    pub fn add_file(&mut self, data: &[u8], name: &[u8]) -> TurnResult<usize> {
        self.ensure_full()?;
        let limits = &self.limits;
        let slot = self
            .taccom
            .get_or_insert_with(TaccomContainer::new)
            .add_file(data, name, limits)?;
        self.state = TurnState::Dirty;
        Ok(slot)
    }

    /// Detaches the file in `slot`.
    pub fn remove_file(&mut self, slot: usize) -> TurnResult<()> {
        self.ensure_full()?;
        self.taccom
            .as_mut()
            .ok_or(TurnError::NoSuchFile { slot })?
            .remove_file(slot)?;
        self.state = TurnState::Dirty;
        Ok(())
    }

    /// Number of attachments.
    #[must_use]
    pub fn num_files(&self) -> usize {
        self.taccom.as_ref().map_or(0, TaccomContainer::num_files)
    }

    /// Name of the attachment in `slot`.
    #[must_use]
    pub fn file_name(&self, slot: usize) -> Option<&[u8]> {
        self.taccom.as_ref()?.file(slot).map(|file| file.name())
    }

    /// Content of the attachment in `slot`.
    #[must_use]
    pub fn file_data(&self, slot: usize) -> Option<&[u8]> {
        self.taccom.as_ref()?.file(slot).map(|file| file.data())
    }

    /// 1-based address and size of the attachment in `slot`, as of the
    /// last parse or update.
    #[must_use]
    pub fn file_placement(&self, slot: usize) -> Option<(u32, u32)> {
        self.taccom.as_ref()?.placement(slot)
    }

    /// 1-based address and size of the turn inside the container.
    #[must_use]
    pub fn turn_placement(&self) -> Option<(u32, u32)> {
        self.taccom.as_ref().map(TaccomContainer::locate_turn_body)
    }

    // Rebuild and output

    /// Rebuilds the turn body, offsets, header and checksum.
    ///
    /// Commands of undefined category, including deleted ones, are dropped.
    pub fn update(&mut self) -> TurnResult<()> {
        self.ensure_full()?;

        let records: Vec<&[u8]> = self
            .offsets
            .iter()
            .filter_map(|&offset| {
                let length = compute_length(decode_code(&self.data, offset), &self.data, offset)?;
                Some(&self.data[offset..offset + length])
            })
            .collect();
        let stripped = self.offsets.len() - records.len();
        if stripped > 0 {
            warn!(stripped, "dropping commands of undefined type");
        }

        let header = TurnHeader {
            num_commands: records.len() as u32,
            ..self.header
        };
        let table_end = TURN_HEADER_SIZE + 4 * records.len();
        let body_len = table_end + records.iter().map(|r| r.len()).sum::<usize>();

        let mut data = Vec::with_capacity(body_len);
        data.extend_from_slice(&header.encode());
        let mut offsets = Vec::with_capacity(records.len());
        let mut position = table_end;
        for record in &records {
            offsets.push(position);
            data.extend_from_slice(&((position + 1) as u32).to_le_bytes());
            position += record.len();
        }
        for record in &records {
            data.extend_from_slice(record);
        }

        self.header = header;
        self.data = data;
        self.offsets = offsets;
        self.dos_trailer.checksum = self.compute_turn_checksum();
        self.dos_trailer.signature = DOS_SIGNATURE;
        if let Some(trailer) = &mut self.windows_trailer {
            trailer.version = self.version;
        }
        let turn_len = self.turn_len();
        if let Some(container) = &mut self.taccom {
            container.relayout(turn_len);
        }
        self.state = TurnState::Clean;

        debug!(
            commands = self.offsets.len(),
            body_bytes = self.data.len(),
            checksum = self.dos_trailer.checksum,
            "rebuilt turn"
        );
        Ok(())
    }

    /// Writes the turn file. Only valid after [`Self::update`] or a parse.
    pub fn write<W: Write>(&self, stream: &mut W) -> TurnResult<()> {
        let bytes = self.to_bytes()?;
        stream.write_all(&bytes)?;
        Ok(())
    }

    /// Serializes the turn file.
    pub fn to_bytes(&self) -> TurnResult<Vec<u8>> {
        self.ensure_full()?;
        if self.state != TurnState::Clean {
            return Err(TurnError::WriteWhileDirty);
        }

        let mut turn = Vec::with_capacity(self.turn_len());
        turn.extend_from_slice(&self.data);
        turn.extend_from_slice(&self.dos_trailer.encode());
        if let Some(trailer) = &self.windows_trailer {
            turn.extend_from_slice(&trailer.encode());
        }
        Ok(match &self.taccom {
            Some(container) => container.assemble(&turn),
            None => turn,
        })
    }

    fn turn_len(&self) -> usize {
        let windows = if self.windows_trailer.is_some() {
            WINDOWS_TRAILER_SIZE
        } else {
            0
        };
        self.data.len() + DOS_TRAILER_SIZE + windows
    }

    const fn ensure_full(&self) -> TurnResult<()> {
        if self.header_only {
            return Err(TurnError::HeaderOnly);
        }
        Ok(())
    }
}

/// Validates the address table and every command record of `turn`.
///
/// Returns the 0-based record offsets in table order and the end of the
/// turn body.
fn scan_commands(turn: &[u8], count: usize) -> TurnResult<(Vec<usize>, usize)> {
    let table_end = TURN_HEADER_SIZE + 4 * count;
    if table_end > turn.len() {
        return Err(TurnError::Truncated {
            needed: table_end,
            available: turn.len(),
        });
    }

    let mut offsets = Vec::with_capacity(count);
    let mut extents = Vec::with_capacity(count);
    for index in 0..count {
        let address = read_u32(turn, TURN_HEADER_SIZE + 4 * index);
        let out_of_bounds = |length: usize| TurnError::OutOfBounds {
            region: Region::Command { index },
            address: u64::from(address),
            length: length as u64,
            file_len: turn.len(),
        };

        let offset = (address as usize)
            .checked_sub(1)
            .filter(|&offset| offset >= table_end)
            .ok_or_else(|| out_of_bounds(COMMAND_HEADER_SIZE))?;
        let min_len = if decode_min_code(turn, offset) == Some(other::SEND_BACK) {
            8
        } else {
            COMMAND_HEADER_SIZE
        };
        if offset + min_len > turn.len() {
            return Err(out_of_bounds(min_len));
        }
        let length = compute_length(decode_code(turn, offset), turn, offset)
            .unwrap_or(COMMAND_HEADER_SIZE);
        if offset + length > turn.len() {
            return Err(out_of_bounds(length));
        }
        offsets.push(offset);
        extents.push((offset, offset + length, index));
    }

    extents.sort_unstable();
    for pair in extents.windows(2) {
        let ((_, prev_end, first), (next_start, _, second)) = (pair[0], pair[1]);
        if next_start < prev_end {
            return Err(TurnError::OverlappingCommands {
                first: first.min(second),
                second: first.max(second),
            });
        }
    }

    let body_end = extents
        .iter()
        .map(|&(_, end, _)| end)
        .fold(table_end, usize::max);
    Ok((offsets, body_end))
}

fn decode_min_code(turn: &[u8], offset: usize) -> Option<u16> {
    (offset + 2 <= turn.len()).then(|| decode_code(turn, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Latin1Charset;
    use crate::registration::StaticRegistrationKey;
    use crate::table::{base, planet, ship};
    use std::io::Cursor;

    fn stamp() -> Timestamp {
        Timestamp::from_raw(*b"11-03-202508:15:00")
    }

    fn limits() -> Limits {
        Limits::for_testing()
    }

    fn roundtrip(turn: &TurnFile) -> TurnFile {
        TurnFile::from_bytes(&turn.to_bytes().unwrap(), ParseMode::Full, &limits()).unwrap()
    }

    #[test]
    fn fresh_turn_is_not_writable() {
        let turn = TurnFile::new(3, stamp());
        assert_eq!(turn.state(), TurnState::Fresh);
        assert_eq!(turn.to_bytes(), Err(TurnError::WriteWhileDirty));
    }

    #[test]
    fn empty_turn_layout() {
        let mut turn = TurnFile::new(3, stamp());
        turn.update().unwrap();
        let bytes = turn.to_bytes().unwrap();
        assert_eq!(bytes.len(), TURN_HEADER_SIZE + DOS_TRAILER_SIZE);
        let parsed = roundtrip(&turn);
        assert_eq!(parsed.num_commands(), 0);
        assert_eq!(parsed.player_id(), 3);
        assert_eq!(parsed.timestamp(), &stamp());
    }

    #[test]
    fn scenario_single_mission_command() {
        let mut turn = TurnFile::new(3, stamp());
        turn.add_command(ship::CHANGE_MISSION, 7, &[2, 0]).unwrap();
        turn.update().unwrap();
        let mut out = Vec::new();
        turn.write(&mut out).unwrap();

        let parsed = TurnFile::read(&mut Cursor::new(out), ParseMode::Full, &limits()).unwrap();
        assert_eq!(parsed.num_commands(), 1);
        assert_eq!(parsed.command_id(0), Some(7));
        assert_eq!(parsed.command_code(0), Some(4));
        assert_eq!(parsed.command_data(0), Some(&[2u8, 0][..]));
        assert_eq!(parsed.command_name(0), Some("ShipChangeMission"));
        assert_eq!(
            parsed.compute_turn_checksum(),
            parsed.dos_trailer().checksum
        );
    }

    #[test]
    fn address_table_is_one_based() {
        let mut turn = TurnFile::new(1, stamp());
        turn.add_command(ship::CHANGE_SPEED, 2, &[9, 0]).unwrap();
        turn.update().unwrap();
        let bytes = turn.to_bytes().unwrap();
        let address = read_u32(&bytes, TURN_HEADER_SIZE);
        assert_eq!(address as usize, TURN_HEADER_SIZE + 4 + 1);
        assert_eq!(turn.command_position(0), Some(TURN_HEADER_SIZE + 4));
    }

    #[test]
    fn add_command_validates_payload() {
        let mut turn = TurnFile::new(1, stamp());
        assert_eq!(
            turn.add_command(ship::CHANGE_MISSION, 1, &[1]),
            Err(TurnError::PayloadSize {
                code: ship::CHANGE_MISSION,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            turn.add_command(19, 1, &[]),
            Err(TurnError::UnknownCommand { code: 19 })
        );
        assert!(turn.add_command(other::SEND_MESSAGE, 3, b"abc").is_ok());
        assert!(turn.add_command(other::SEND_MESSAGE, 4, b"abc").is_err());
        assert!(turn.add_command(other::SEND_BACK, 1, &[1, 0, 6, 0, 0xAA, 0xBB]).is_ok());
        assert!(turn.add_command(other::SEND_BACK, 1, &[1, 0]).is_err());
        assert_eq!(turn.num_commands(), 2);
    }

    #[test]
    fn add_command_respects_limit() {
        let mut turn = TurnFile::with_limits(
            1,
            stamp(),
            Limits {
                max_commands: 1,
                ..Limits::for_testing()
            },
        );
        turn.add_command(ship::CHANGE_SPEED, 1, &[0, 0]).unwrap();
        assert!(matches!(
            turn.add_command(ship::CHANGE_SPEED, 2, &[0, 0]),
            Err(TurnError::LimitsExceeded {
                kind: LimitKind::Commands,
                ..
            })
        ));
    }

    #[test]
    fn delete_leaves_tombstone_until_update() {
        let mut turn = TurnFile::new(1, stamp());
        turn.add_command(ship::CHANGE_SPEED, 1, &[5, 0]).unwrap();
        turn.add_command(ship::CHANGE_SPEED, 2, &[6, 0]).unwrap();
        turn.delete_command(0).unwrap();
        assert_eq!(turn.num_commands(), 2);
        assert_eq!(turn.command_code(0), Some(0));
        assert_eq!(turn.command_type(0), Some(CommandType::Undefined));
        assert_eq!(turn.command_length(0), None);

        turn.update().unwrap();
        assert_eq!(turn.num_commands(), 1);
        assert_eq!(turn.command_id(0), Some(2));
        assert_eq!(turn.header().num_commands, 1);
    }

    #[test]
    fn delete_missing_command_is_rejected() {
        let mut turn = TurnFile::new(1, stamp());
        assert_eq!(
            turn.delete_command(0),
            Err(TurnError::NoSuchCommand { index: 0, count: 0 })
        );
    }

    #[test]
    fn mutation_makes_turn_dirty() {
        let mut turn = TurnFile::new(1, stamp());
        turn.update().unwrap();
        assert_eq!(turn.state(), TurnState::Clean);
        turn.set_timestamp(Timestamp::from_raw([b'1'; 18]));
        assert_eq!(turn.state(), TurnState::Dirty);
        assert_eq!(turn.to_bytes(), Err(TurnError::WriteWhileDirty));
        turn.update().unwrap();
        assert!(turn.to_bytes().is_ok());
    }

    #[test]
    fn set_timestamp_refreshes_checksum_input() {
        let mut turn = TurnFile::new(1, stamp());
        turn.add_command(ship::CHANGE_SPEED, 4, &[3, 0]).unwrap();
        turn.update().unwrap();
        let before = turn.compute_turn_checksum();

        turn.set_timestamp(Timestamp::from_raw(*b"11-04-202508:15:00"));
        let pending = turn.compute_turn_checksum();
        assert_ne!(pending, before);
        turn.update().unwrap();
        assert_eq!(turn.compute_turn_checksum(), pending);
        assert_eq!(turn.dos_trailer().checksum, pending);
        assert_eq!(&turn.to_bytes().unwrap()[..TURN_HEADER_SIZE], &turn.header().encode());
    }

    #[test]
    fn payload_byte_changes_checksum() {
        let build = |warp: u8| {
            let mut turn = TurnFile::new(1, stamp());
            turn.add_command(ship::CHANGE_SPEED, 4, &[warp, 0]).unwrap();
            turn.update().unwrap();
            turn
        };
        let slow = build(3);
        let fast = build(4);
        assert_eq!(slow.to_bytes().unwrap().len(), fast.to_bytes().unwrap().len());
        assert_eq!(fast.dos_trailer().checksum, slow.dos_trailer().checksum + 1);
        assert_eq!(roundtrip(&fast).dos_trailer().checksum, fast.compute_turn_checksum());
    }

    #[test]
    fn run_length_counts_same_object() {
        let mut turn = TurnFile::new(1, stamp());
        turn.add_command(ship::CHANGE_SPEED, 4, &[1, 0]).unwrap();
        turn.add_command(ship::CHANGE_MISSION, 4, &[1, 0]).unwrap();
        turn.add_command(planet::COLONIST_TAX, 4, &[1, 0]).unwrap();
        turn.add_command(planet::NATIVE_TAX, 4, &[1, 0]).unwrap();
        assert_eq!(turn.command_run_length(0), 2);
        assert_eq!(turn.command_run_length(1), 1);
        assert_eq!(turn.command_run_length(2), 2);
        assert_eq!(turn.command_run_length(9), 0);
    }

    #[test]
    fn sort_commands_orders_by_category_and_id() {
        let mut turn = TurnFile::new(1, stamp());
        turn.add_command(base::BUILD_FIGHTERS, 2, &[1, 0]).unwrap();
        turn.add_command(ship::CHANGE_SPEED, 7, &[1, 0]).unwrap();
        turn.add_command(ship::CHANGE_SPEED, 5, &[1, 0]).unwrap();
        turn.sort_commands().unwrap();
        assert_eq!(turn.state(), TurnState::Dirty);
        assert_eq!(turn.command_id(0), Some(5));
        assert_eq!(turn.command_id(1), Some(7));
        assert_eq!(turn.command_type(2), Some(CommandType::Base));
    }

    #[test]
    fn winplan_trailer_roundtrip() {
        let mut turn = TurnFile::new(3, stamp());
        turn.set_features(TurnFeatures::winplan());
        turn.set_version(12);
        turn.update().unwrap();
        let bytes = turn.to_bytes().unwrap();
        assert_eq!(
            bytes.len(),
            TURN_HEADER_SIZE + DOS_TRAILER_SIZE + WINDOWS_TRAILER_SIZE
        );
        let parsed = roundtrip(&turn);
        assert!(parsed.features().has_winplan());
        assert_eq!(parsed.version(), 12);
    }

    #[test]
    fn winplan_padding_survives_reemit() {
        let mut turn = TurnFile::new(3, stamp());
        turn.set_features(TurnFeatures::winplan());
        turn.update().unwrap();
        let mut bytes = turn.to_bytes().unwrap();
        let tail = bytes.len() - wire::WINDOWS_PADDING_SIZE;
        bytes[tail..].fill(0x5C);

        let mut parsed = TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()).unwrap();
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
        parsed.update().unwrap();
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
        assert_eq!(parsed.windows_trailer().unwrap().padding[3], [0x5C; 20]);
    }

    #[test]
    fn turn_number_needs_winplan() {
        let key = StaticRegistrationKey::unregistered();
        let mut turn = TurnFile::new(3, stamp());
        turn.set_registration_key(&key, &Latin1Charset, 42);
        assert_eq!(turn.try_get_turn_nr(), 0);

        turn.set_features(TurnFeatures::winplan());
        turn.set_registration_key(&key, &Latin1Charset, 42);
        assert_eq!(turn.try_get_turn_nr(), 42);
        turn.update().unwrap();
        assert_eq!(roundtrip(&turn).try_get_turn_nr(), 42);
    }

    #[test]
    fn player_secret_is_written() {
        let mut turn = TurnFile::new(3, stamp());
        turn.set_player_secret(*b"templock-01");
        turn.update().unwrap();
        assert_eq!(&roundtrip(&turn).dos_trailer().player_secret, b"templock-01");
    }

    #[test]
    fn header_only_parse_is_read_only() {
        let mut turn = TurnFile::new(3, stamp());
        turn.add_command(ship::CHANGE_SPEED, 1, &[1, 0]).unwrap();
        turn.update().unwrap();
        let bytes = turn.to_bytes().unwrap();

        let mut header_only =
            TurnFile::from_bytes(&bytes, ParseMode::HeaderOnly, &limits()).unwrap();
        assert!(header_only.is_header_only());
        assert_eq!(header_only.num_commands(), 1);
        assert_eq!(header_only.command_code(0), None);
        assert_eq!(header_only.update(), Err(TurnError::HeaderOnly));
        assert_eq!(header_only.to_bytes(), Err(TurnError::HeaderOnly));
        assert_eq!(
            header_only.add_command(ship::CHANGE_SPEED, 1, &[1, 0]),
            Err(TurnError::HeaderOnly)
        );
    }

    #[test]
    fn parse_rejects_truncated_trailer() {
        let mut turn = TurnFile::new(3, stamp());
        turn.update().unwrap();
        let bytes = turn.to_bytes().unwrap();
        let err = TurnFile::from_bytes(&bytes[..bytes.len() - 1], ParseMode::Full, &limits())
            .unwrap_err();
        assert!(matches!(
            err,
            TurnError::Wire(wire::DecodeError::Truncated {
                record: wire::Record::DosTrailer,
                ..
            })
        ));
    }

    #[test]
    fn parse_rejects_excessive_command_count() {
        let header = TurnHeader::new(1, stamp(), 100_000);
        let mut bytes = header.encode().to_vec();
        bytes.extend_from_slice(&DosTrailer::default().encode());
        let err = TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()).unwrap_err();
        assert!(matches!(
            err,
            TurnError::LimitsExceeded {
                kind: LimitKind::Commands,
                ..
            }
        ));
    }

    #[test]
    fn parse_rejects_missing_address_table() {
        let header = TurnHeader::new(1, stamp(), 5);
        let bytes = header.encode().to_vec();
        assert!(matches!(
            TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()),
            Err(TurnError::Truncated { needed: 50, .. })
        ));
    }

    #[test]
    fn parse_rejects_command_past_end() {
        let mut bytes = TurnHeader::new(1, stamp(), 1).encode().to_vec();
        bytes.extend_from_slice(&10_000u32.to_le_bytes());
        bytes.extend_from_slice(&DosTrailer::default().encode());
        assert!(matches!(
            TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()),
            Err(TurnError::OutOfBounds {
                region: Region::Command { index: 0 },
                ..
            })
        ));
    }

    #[test]
    fn parse_rejects_aliased_commands() {
        let table_end = TURN_HEADER_SIZE + 8;
        let mut bytes = TurnHeader::new(1, stamp(), 2).encode().to_vec();
        bytes.extend_from_slice(&((table_end + 1) as u32).to_le_bytes());
        bytes.extend_from_slice(&((table_end + 3) as u32).to_le_bytes());
        bytes.extend(encode_command(ship::CHANGE_SPEED, 1, &[1, 0]));
        bytes.extend_from_slice(&DosTrailer::default().encode());
        assert_eq!(
            TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()).unwrap_err(),
            TurnError::OverlappingCommands {
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn parse_keeps_undefined_commands_until_update() {
        let table_end = TURN_HEADER_SIZE + 4;
        let mut bytes = TurnHeader::new(1, stamp(), 1).encode().to_vec();
        bytes.extend_from_slice(&((table_end + 1) as u32).to_le_bytes());
        bytes.extend(encode_command(35, 1, &[]));
        bytes.extend_from_slice(&DosTrailer::default().encode());

        let mut parsed = TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()).unwrap();
        assert_eq!(parsed.num_commands(), 1);
        assert_eq!(parsed.command_type(0), Some(CommandType::Undefined));
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
        parsed.update().unwrap();
        assert_eq!(parsed.num_commands(), 0);
    }

    #[test]
    fn build_base_order_survives_update() {
        let table_end = TURN_HEADER_SIZE + 4;
        let mut bytes = TurnHeader::new(1, stamp(), 1).encode().to_vec();
        bytes.extend_from_slice(&((table_end + 1) as u32).to_le_bytes());
        bytes.extend(encode_command(planet::BUILD_BASE, 12, &[1, 0]));
        bytes.extend_from_slice(&DosTrailer::default().encode());

        let mut parsed = TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()).unwrap();
        assert_eq!(parsed.command_type(0), Some(CommandType::Planet));
        parsed.update().unwrap();
        assert_eq!(parsed.num_commands(), 1);
        assert_eq!(parsed.command_name(0), Some("PlanetBuildBase"));
        assert_eq!(parsed.command_id(0), Some(12));
    }

    #[test]
    fn parse_rejects_bad_windows_version() {
        let mut turn = TurnFile::new(3, stamp());
        turn.set_features(TurnFeatures::winplan());
        turn.update().unwrap();
        let mut bytes = turn.to_bytes().unwrap();
        let version_at = TURN_HEADER_SIZE + DOS_TRAILER_SIZE + 6;
        bytes[version_at] = b'?';
        assert!(matches!(
            TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()),
            Err(TurnError::Wire(wire::DecodeError::InvalidVersion { .. }))
        ));
    }

    #[test]
    fn parse_rejects_oversized_file() {
        let bytes = vec![0u8; limits().max_file_bytes + 1];
        assert!(matches!(
            TurnFile::from_bytes(&bytes, ParseMode::Full, &limits()),
            Err(TurnError::LimitsExceeded {
                kind: LimitKind::FileBytes,
                ..
            })
        ));
    }

    #[test]
    fn attachments_enable_taccom() {
        let mut turn = TurnFile::new(3, stamp());
        let slot = turn.add_file(b"alliance", b"ally.txt").unwrap();
        assert!(turn.is_taccom());
        turn.update().unwrap();

        let parsed = roundtrip(&turn);
        assert!(parsed.features().has_taccom());
        assert_eq!(parsed.num_files(), 1);
        assert_eq!(parsed.file_name(slot), Some(&b"ally.txt"[..]));
        assert_eq!(parsed.file_data(slot), Some(&b"alliance"[..]));
        assert_eq!(parsed.turn_placement(), turn.turn_placement());
        assert_eq!(parsed.file_placement(slot), turn.file_placement(slot));
    }

    #[test]
    fn disabling_taccom_drops_attachments() {
        let mut turn = TurnFile::new(3, stamp());
        turn.add_file(b"x", b"x").unwrap();
        turn.set_features(TurnFeatures::none());
        assert_eq!(turn.num_files(), 0);
        assert_eq!(turn.remove_file(0), Err(TurnError::NoSuchFile { slot: 0 }));
    }
}
